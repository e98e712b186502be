use std::fmt;
use std::sync::Arc;

use http::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::{OperationCatalog, OperationDefinition};
use crate::config::{ApiToken, DuphluxConfig, Environment};
use crate::engine::RequestEngine;
use crate::error::{Error, ProtocolError};
use crate::guard::{OperationGuard, SessionState};
use crate::outcome::{CallOutcome, ResponseAdapter, UnwrappedPayload};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Envelope member wrapping every service response.
pub const PAYLOAD_ENVELOPE_KEY: &str = "PayLoad";

/// Status string for a successful phone number verification.
pub const VERIFICATION_STATUS_VERIFIED: &str = "verified";

/// Status string for a pending phone number verification.
pub const VERIFICATION_STATUS_PENDING: &str = "pending";

/// Status string for a failed phone number verification.
pub const VERIFICATION_STATUS_FAILED: &str = "failed";

/// Payload data key holding the verification URL.
pub const DATA_VERIFICATION_URL_KEY: &str = "verification_url";

/// Payload data key holding the expiry timestamp.
pub const DATA_EXPIRES_AT_KEY: &str = "expires_at";

/// Payload data key echoing the transaction reference.
pub const DATA_TRANSACTION_REFERENCE_KEY: &str = "transaction_reference";

/// Payload data key holding the verification status value.
pub const DATA_VERIFICATION_STATUS_KEY: &str = "verification_status";

/// Required parameter names for the verification operations.
pub const PARAM_PHONE_NUMBER: &str = "phone_number";
pub const PARAM_TRANSACTION_REFERENCE: &str = "transaction_reference";
pub const PARAM_REDIRECT_URL: &str = "redirect_url";

/// The two remote operations of the verification workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Initiate a verification transaction (`/verify.json`).
    InitializeVerification,
    /// Poll the status of an earlier transaction (`/status.json`).
    VerificationStatus,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::InitializeVerification => write!(f, "initialize_verification"),
            Operation::VerificationStatus => write!(f, "verification_status"),
        }
    }
}

/// Unwraps the service's `PayLoad` response envelope.
///
/// Absent `status`/`errors`/`data` members unwrap as `null`; a body without
/// the envelope itself is rejected and captured as a protocol failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadAdapter;

impl ResponseAdapter for PayloadAdapter {
    fn unwrap(&self, response: &Value) -> Result<UnwrappedPayload, ProtocolError> {
        let payload = response
            .get(PAYLOAD_ENVELOPE_KEY)
            .ok_or(ProtocolError::MissingMember(PAYLOAD_ENVELOPE_KEY))?;

        Ok(UnwrappedPayload::new(
            payload.get("status").cloned().unwrap_or(Value::Null),
            payload.get("errors").cloned().unwrap_or(Value::Null),
            payload.get("data").cloned().unwrap_or(Value::Null),
        ))
    }
}

/// Parameters of one verification initiation.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest {
    /// Phone number to verify, in international format.
    pub phone_number: String,
    /// Correlation reference tying this initiation to later status checks.
    pub transaction_reference: String,
    /// URL the subscriber is sent back to once verification completes.
    pub redirect_url: String,
}

impl VerifyRequest {
    pub fn new(
        phone_number: impl Into<String>,
        transaction_reference: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            transaction_reference: transaction_reference.into(),
            redirect_url: redirect_url.into(),
        }
    }

    fn into_options(self) -> Result<Map<String, Value>, Error> {
        match serde_json::to_value(&self)? {
            Value::Object(options) => Ok(options),
            _ => Err(Error::Serialization(
                "verification request did not serialize to a JSON object".to_string(),
            )),
        }
    }
}

/// Client for the Duphlux phone number verification workflow.
///
/// Wraps a [`RequestEngine`] configured with the verification operation
/// catalog, the fixed service headers, and the `PayLoad` adapter, and gates
/// outcome queries behind the session state machine: `is_verified` and
/// friends require a completed status check, `verification_url` requires a
/// completed initiation.
pub struct DuphluxClient {
    engine: RequestEngine<Operation>,
    guard: OperationGuard,
    environment: Environment,
}

impl DuphluxClient {
    /// Client with an explicit token for the given environment.
    pub fn new(token: impl Into<ApiToken>, environment: Environment) -> Result<Self, Error> {
        Self::from_config(DuphluxConfig::new(token, environment))
    }

    /// Client configured from `DUPHLUX_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_config(DuphluxConfig::from_env()?)
    }

    /// Client from an explicit configuration, using the default transport.
    pub fn from_config(config: DuphluxConfig) -> Result<Self, Error> {
        let transport = Arc::new(ReqwestTransport::new(config.verify_peer, config.timeout)?);
        Self::with_transport(config, transport)
    }

    /// Client with an injected transport. The configuration's `verify_peer`
    /// and `timeout` do not apply to injected transports.
    pub fn with_transport(
        config: DuphluxConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, Error> {
        let token = config.resolve_token()?.clone();
        let headers = build_headers(&token, &config.extra_headers)?;
        let engine = RequestEngine::new(
            operation_catalog(),
            config.base_url,
            headers,
            transport,
            Arc::new(PayloadAdapter),
        );

        Ok(Self {
            engine,
            guard: OperationGuard::new(),
            environment: config.environment,
        })
    }

    // -----------------------------------------------------------------------
    // Workflow operations
    // -----------------------------------------------------------------------

    /// Initiate verification for a phone number.
    ///
    /// Issues one POST to `/verify.json`. Returns a snapshot of the call
    /// outcome; on success `verification_url()` yields the redirect target.
    pub async fn authenticate(&mut self, request: VerifyRequest) -> Result<CallOutcome, Error> {
        self.authenticate_options(request.into_options()?).await
    }

    /// Initiation from a raw options map. Extra keys are passed through to
    /// the service; the required parameters are still validated.
    pub async fn authenticate_options(
        &mut self,
        options: Map<String, Value>,
    ) -> Result<CallOutcome, Error> {
        self.guard.begin_initiation();
        self.engine
            .send(Operation::InitializeVerification, Method::POST, options)
            .await?;
        self.guard.complete_initiation();

        Ok(self.engine.outcome().clone())
    }

    /// Poll the status of an earlier verification transaction.
    ///
    /// Issues one POST to `/status.json`. Afterwards `is_verified()`,
    /// `is_pending()` and `is_failed()` report the transaction state.
    pub async fn check_status(&mut self, reference: &str) -> Result<CallOutcome, Error> {
        let mut options = Map::new();
        options.insert(
            PARAM_TRANSACTION_REFERENCE.to_string(),
            Value::String(reference.to_string()),
        );
        self.check_status_options(options).await
    }

    /// Status check from a raw options map.
    pub async fn check_status_options(
        &mut self,
        options: Map<String, Value>,
    ) -> Result<CallOutcome, Error> {
        self.guard.begin_status_check();
        self.engine
            .send(Operation::VerificationStatus, Method::POST, options)
            .await?;
        self.guard.complete_status_check();

        Ok(self.engine.outcome().clone())
    }

    /// Blocking version of [`authenticate`](Self::authenticate) for sync
    /// contexts.
    ///
    /// Uses the current tokio runtime if one is available, or creates a
    /// temporary runtime otherwise.
    pub fn authenticate_blocking(&mut self, request: VerifyRequest) -> Result<CallOutcome, Error> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle.block_on(self.authenticate(request)),
            Err(_) => {
                // No runtime exists - create a temporary one
                tokio::runtime::Runtime::new()?.block_on(self.authenticate(request))
            }
        }
    }

    /// Blocking version of [`check_status`](Self::check_status).
    pub fn check_status_blocking(&mut self, reference: &str) -> Result<CallOutcome, Error> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle.block_on(self.check_status(reference)),
            Err(_) => tokio::runtime::Runtime::new()?.block_on(self.check_status(reference)),
        }
    }

    // -----------------------------------------------------------------------
    // Outcome queries (guarded)
    // -----------------------------------------------------------------------

    /// Whether the polled transaction resolved to `verified`.
    ///
    /// Requires a completed [`check_status`](Self::check_status) call.
    pub fn is_verified(&self) -> Result<bool, Error> {
        self.guard.require_status_checked()?;
        Ok(self.verification_status_is(VERIFICATION_STATUS_VERIFIED))
    }

    /// Whether the polled transaction is still `pending`.
    pub fn is_pending(&self) -> Result<bool, Error> {
        self.guard.require_status_checked()?;
        Ok(self.verification_status_is(VERIFICATION_STATUS_PENDING))
    }

    /// Whether the polled transaction resolved to `failed`.
    pub fn is_failed(&self) -> Result<bool, Error> {
        self.guard.require_status_checked()?;
        Ok(self.verification_status_is(VERIFICATION_STATUS_FAILED))
    }

    /// URL the subscriber must visit to complete verification.
    ///
    /// Requires a completed [`authenticate`](Self::authenticate) call; the
    /// embedding application performs the actual redirect.
    pub fn verification_url(&self) -> Result<Option<&str>, Error> {
        self.guard.require_initiated()?;
        Ok(self
            .engine
            .outcome()
            .data_field(DATA_VERIFICATION_URL_KEY)
            .and_then(Value::as_str))
    }

    fn verification_status_is(&self, expected: &str) -> bool {
        self.engine
            .outcome()
            .data_field(DATA_VERIFICATION_STATUS_KEY)
            .and_then(Value::as_str)
            .is_some_and(|status| status == expected)
    }

    // -----------------------------------------------------------------------
    // Lifecycle hooks
    // -----------------------------------------------------------------------

    pub fn set_before_send<F>(&mut self, hook: F)
    where
        F: Fn(&RequestEngine<Operation>) + Send + Sync + 'static,
    {
        self.engine.set_before_send(hook);
    }

    pub fn set_after_send<F>(&mut self, hook: F)
    where
        F: Fn(&RequestEngine<Operation>) + Send + Sync + 'static,
    {
        self.engine.set_after_send(hook);
    }

    pub fn clear_before_send(&mut self) {
        self.engine.clear_before_send();
    }

    pub fn clear_after_send(&mut self) {
        self.engine.clear_after_send();
    }

    // -----------------------------------------------------------------------
    // State accessors. Reads are idempotent until the next call.
    // -----------------------------------------------------------------------

    pub fn outcome(&self) -> &CallOutcome {
        self.engine.outcome()
    }

    /// Raw status slot from the last unwrapped response.
    pub fn status(&self) -> &Value {
        self.engine.outcome().status()
    }

    /// Error slot: the envelope's `errors`, or captured failure text.
    pub fn error(&self) -> &Value {
        self.engine.outcome().error()
    }

    /// Data slot from the last unwrapped response.
    pub fn data(&self) -> &Value {
        self.engine.outcome().data()
    }

    /// Single value out of the data slot.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.engine.outcome().data_field(key)
    }

    pub fn has_error(&self) -> bool {
        self.engine.outcome().has_error()
    }

    /// Raw decoded body of the last successful exchange.
    pub fn response(&self) -> Option<&Value> {
        self.engine.response()
    }

    pub fn response_field(&self, key: &str) -> Option<&Value> {
        self.engine.response_field(key)
    }

    /// Operation recorded by the most recent call.
    pub fn operation(&self) -> Option<Operation> {
        self.engine.operation()
    }

    pub fn request_method(&self) -> Option<&Method> {
        self.engine.request_method()
    }

    pub fn request_options(&self) -> &Map<String, Value> {
        self.engine.request_options()
    }

    pub fn operation_url(&self) -> Option<&str> {
        self.engine.operation_url()
    }

    pub fn session_state(&self) -> SessionState {
        self.guard.state()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &str {
        self.engine.base_url()
    }

    /// The underlying engine, for inspection.
    pub fn engine(&self) -> &RequestEngine<Operation> {
        &self.engine
    }
}

fn operation_catalog() -> OperationCatalog<Operation> {
    OperationCatalog::new()
        .register(
            Operation::InitializeVerification,
            OperationDefinition::new(
                "/verify.json",
                &[
                    PARAM_PHONE_NUMBER,
                    PARAM_TRANSACTION_REFERENCE,
                    PARAM_REDIRECT_URL,
                ],
            ),
        )
        .register(
            Operation::VerificationStatus,
            OperationDefinition::new("/status.json", &[PARAM_TRANSACTION_REFERENCE]),
        )
}

/// The three fixed service headers, with caller extras merged after them.
fn build_headers(token: &ApiToken, extra: &HeaderMap) -> Result<HeaderMap, Error> {
    let token_value = HeaderValue::from_str(token.as_str())
        .map_err(|e| Error::Configuration(format!("invalid token header value: {e}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static("token"), token_value);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    for (name, value) in extra {
        headers.insert(name.clone(), value.clone());
    }

    Ok(headers)
}
