//! Duphlux Client Library
//!
//! Rust client for the Duphlux phone number verification service.
//! Verification is a two-step workflow:
//!
//! 1. **Initiate** - [`DuphluxClient::authenticate`] registers a transaction
//!    and yields a verification URL the subscriber must visit.
//! 2. **Poll** - [`DuphluxClient::check_status`] reports whether the
//!    transaction resolved to `verified`, is still `pending`, or `failed`.
//!
//! Every exchange is recorded on the client: the raw response, the unwrapped
//! `status`/`errors`/`data` payload and the request that produced them stay
//! readable until the next call.
//!
//! # Examples
//!
//! ## Async Usage
//!
//! ```no_run
//! use duphlux_client::{DuphluxClient, Environment, VerifyRequest, generate_reference};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = DuphluxClient::new("tok_live_secret", Environment::Live)?;
//!
//! let reference = generate_reference(10);
//! client
//!     .authenticate(VerifyRequest::new(
//!         "2348012345678",
//!         reference.as_str(),
//!         "https://example.com/verified",
//!     ))
//!     .await?;
//!
//! if let Some(url) = client.verification_url()? {
//!     println!("Redirect the subscriber to {url}");
//! }
//!
//! client.check_status(&reference).await?;
//! if client.is_verified()? {
//!     println!("Phone number confirmed");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Blocking Usage
//!
//! ```no_run
//! use duphlux_client::{DuphluxClient, VerifyRequest};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = DuphluxClient::from_env()?;
//!
//! client.authenticate_blocking(VerifyRequest::new(
//!     "2348012345678",
//!     "order-1042",
//!     "https://example.com/verified",
//! ))?;
//!
//! let outcome = client.check_status_blocking("order-1042")?;
//! println!("status: {}, errors: {}", outcome.status(), outcome.error());
//! # Ok(())
//! # }
//! ```

mod catalog;
mod client;
mod config;
mod engine;
mod error;
mod guard;
mod hooks;
mod outcome;
mod reference;
mod transport;

// Re-export public API
pub use catalog::{OperationCatalog, OperationDefinition};
pub use client::{
    DATA_EXPIRES_AT_KEY, DATA_TRANSACTION_REFERENCE_KEY, DATA_VERIFICATION_STATUS_KEY,
    DATA_VERIFICATION_URL_KEY, DuphluxClient, Operation, PARAM_PHONE_NUMBER, PARAM_REDIRECT_URL,
    PARAM_TRANSACTION_REFERENCE, PAYLOAD_ENVELOPE_KEY, PayloadAdapter, VERIFICATION_STATUS_FAILED,
    VERIFICATION_STATUS_PENDING, VERIFICATION_STATUS_VERIFIED, VerifyRequest,
};
pub use config::{ApiToken, Credentials, DEFAULT_BASE_URL, DuphluxConfig, Environment};
pub use engine::RequestEngine;
pub use error::{Error, ProtocolError, TransportError};
pub use guard::{OperationGuard, SessionState};
pub use hooks::{Hook, LifecycleHooks};
pub use outcome::{CallOutcome, ResponseAdapter, UnwrappedPayload};
pub use reference::{DEFAULT_REFERENCE_LENGTH, generate_reference};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport, TransportCall};

// Re-export commonly used types from dependencies
pub use http::{Method, StatusCode};
