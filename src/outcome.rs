use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Status, error, and data slots pulled out of one response body.
///
/// Produced by a [`ResponseAdapter`]; the engine folds it into the client's
/// [`CallOutcome`].
#[derive(Debug, Clone, Default)]
pub struct UnwrappedPayload {
    pub status: Value,
    pub errors: Value,
    pub data: Value,
}

impl UnwrappedPayload {
    pub fn new(status: Value, errors: Value, data: Value) -> Self {
        Self {
            status,
            errors,
            data,
        }
    }

    pub fn data_object(&self) -> Option<&Map<String, Value>> {
        self.data.as_object()
    }
}

/// Extracts the service's status/error/data triple from a decoded body.
///
/// The envelope shape belongs to the concrete workflow, not the engine: the
/// verification client installs its `PayLoad` adapter, other services plug
/// in their own.
pub trait ResponseAdapter: Send + Sync {
    fn unwrap(&self, response: &Value) -> Result<UnwrappedPayload, ProtocolError>;
}

/// Normalized result of the most recent call.
///
/// `status`, `error` and `data` hold whatever the adapter unwrapped last;
/// a captured transport or protocol failure overwrites only `error` (and
/// `has_error`), leaving the rest of the slots at their prior values so a
/// failed poll does not erase an earlier successful exchange.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    status: Value,
    error: Value,
    data: Value,
    has_error: bool,
}

impl CallOutcome {
    pub fn new() -> Self {
        Self {
            status: Value::Null,
            error: Value::Null,
            data: Value::Null,
            has_error: false,
        }
    }

    /// Raw status slot from the response envelope.
    pub fn status(&self) -> &Value {
        &self.status
    }

    /// Error slot: the envelope's `errors` member, or captured failure text.
    pub fn error(&self) -> &Value {
        &self.error
    }

    /// Data slot from the response envelope.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Single value out of the data slot, when data is an object.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// True when the last call failed: non-empty error slot, falsy status,
    /// or a captured transport/protocol failure.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Fold an unwrapped response into the outcome.
    pub(crate) fn apply(&mut self, unwrapped: UnwrappedPayload) {
        self.status = unwrapped.status;
        self.error = unwrapped.errors;
        self.data = unwrapped.data;
        self.has_error = !error_is_empty(&self.error) || status_is_falsy(&self.status);
    }

    /// Record a failed exchange. Only the error slots change; status and
    /// data keep whatever the previous call produced.
    pub(crate) fn capture(&mut self, message: String) {
        self.error = Value::String(message);
        self.has_error = true;
    }
}

impl Default for CallOutcome {
    fn default() -> Self {
        Self::new()
    }
}

/// The service treats `null`, `false`, and the empty string as "no status".
fn status_is_falsy(status: &Value) -> bool {
    match status {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// An error slot carries nothing when it is `null`, `false`, an empty
/// string, or an empty array.
fn error_is_empty(error: &Value) -> bool {
    match error {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
