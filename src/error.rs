use std::io;
use thiserror::Error;

/// Errors surfaced to callers of the client and engine APIs.
///
/// Transport and protocol failures are not listed here: they are captured
/// into the call outcome (`has_error` + `error`) so a completed call can be
/// inspected without error handling. Everything below aborts the call before
/// or during request construction.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{name} is required for this operation")]
    MissingParameter { name: String },

    #[error("Method cannot be used with the current operation")]
    OperationMismatch,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Shorthand for the validation failure raised for one parameter.
    pub(crate) fn missing_parameter(name: &str) -> Self {
        Error::MissingParameter {
            name: name.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Failure of a single wire exchange.
///
/// Returned by [`HttpTransport::dispatch`](crate::transport::HttpTransport)
/// and recorded into the call outcome by the engine; its display text is
/// exactly what callers later read back from `error()`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Why a response adapter refused to unwrap a decoded body.
///
/// Like [`TransportError`], this never propagates as an `Err`: the engine
/// captures the display text into the call outcome.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("response envelope missing member: {0}")]
    MissingMember(&'static str),

    #[error("{0}")]
    Malformed(String),
}
