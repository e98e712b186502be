use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method};
use serde_json::{Map, Value};

use crate::catalog::OperationCatalog;
use crate::error::Error;
use crate::hooks::LifecycleHooks;
use crate::outcome::{CallOutcome, ResponseAdapter};
use crate::transport::{HttpTransport, TransportCall};

/// Turns an abstract operation into one concrete network call and folds the
/// result into client state.
///
/// The engine is catalog-agnostic: which operations exist, which parameters
/// they require, and how responses unwrap are all injected by the concrete
/// client. One engine instance belongs to one client session; state is
/// mutated only through [`send`](RequestEngine::send).
pub struct RequestEngine<O> {
    catalog: OperationCatalog<O>,
    base_url: String,
    headers: HeaderMap,
    transport: Arc<dyn HttpTransport>,
    adapter: Arc<dyn ResponseAdapter>,
    hooks: LifecycleHooks<O>,

    // Per-session call state. Slots persist across calls until overwritten.
    operation: Option<O>,
    request_method: Option<Method>,
    request_options: Map<String, Value>,
    operation_url: Option<String>,
    response: Option<Value>,
    outcome: CallOutcome,
}

impl<O> RequestEngine<O>
where
    O: Copy + Eq + Hash + Display,
{
    pub fn new(
        catalog: OperationCatalog<O>,
        base_url: impl Into<String>,
        headers: HeaderMap,
        transport: Arc<dyn HttpTransport>,
        adapter: Arc<dyn ResponseAdapter>,
    ) -> Self {
        Self {
            catalog,
            base_url: base_url.into(),
            headers,
            transport,
            adapter,
            hooks: LifecycleHooks::new(),
            operation: None,
            request_method: None,
            request_options: Map::new(),
            operation_url: None,
            response: None,
            outcome: CallOutcome::new(),
        }
    }

    /// Execute one operation and return the updated outcome.
    ///
    /// Unknown operations, missing parameters, and body encoding failures
    /// abort the call with an `Err` before anything is dispatched; neither
    /// lifecycle hook runs for an aborted call. Transport
    /// and protocol failures complete the call instead: they are captured
    /// into the outcome (`has_error` plus the failure text) so the caller
    /// can inspect them without error handling, and the previously unwrapped
    /// status and data survive.
    pub async fn send(
        &mut self,
        operation: O,
        method: Method,
        options: Map<String, Value>,
    ) -> Result<&CallOutcome, Error> {
        let endpoint = {
            let definition = self.catalog.resolve(operation)?;
            definition.validate(&options)?;
            definition.endpoint().to_string()
        };
        let url = format!("{}{}", self.base_url, endpoint);

        // Merge the call's options into the session's: last merge wins per
        // key, keys from earlier calls persist otherwise.
        for (name, value) in options {
            self.request_options.insert(name, value);
        }
        self.operation = Some(operation);
        self.request_method = Some(method.clone());
        self.operation_url = Some(url.clone());

        let body = encode_body(&method, &self.request_options)?;

        if let Some(hook) = self.hooks.before_send() {
            hook(&*self);
        }

        tracing::debug!(operation = %operation, method = %method, url = %url, "dispatching request");
        let call = TransportCall {
            url,
            method,
            headers: self.headers.clone(),
            body,
        };

        let dispatched = self.transport.dispatch(call).await;
        match dispatched {
            Err(err) => {
                tracing::warn!(operation = %operation, error = %err, "transport failure captured");
                self.outcome.capture(err.to_string());
            }
            Ok(raw) => {
                tracing::debug!(status = %raw.status, bytes = raw.body.len(), "response received");
                match serde_json::from_slice::<Value>(&raw.body) {
                    Err(err) => {
                        tracing::warn!(operation = %operation, error = %err, "response body is not valid JSON");
                        self.outcome.capture(format!("invalid JSON response: {err}"));
                    }
                    Ok(decoded) => {
                        let unwrapped = self.adapter.unwrap(&decoded);
                        self.response = Some(decoded);
                        match unwrapped {
                            Ok(unwrapped) => self.outcome.apply(unwrapped),
                            Err(err) => {
                                tracing::warn!(operation = %operation, error = %err, "response envelope rejected");
                                self.outcome.capture(err.to_string());
                            }
                        }
                    }
                }
            }
        }

        if let Some(hook) = self.hooks.after_send() {
            hook(&*self);
        }

        Ok(&self.outcome)
    }

    // -----------------------------------------------------------------------
    // Lifecycle hooks
    // -----------------------------------------------------------------------

    pub fn set_before_send<F>(&mut self, hook: F)
    where
        F: Fn(&RequestEngine<O>) + Send + Sync + 'static,
    {
        self.hooks.set_before_send(hook);
    }

    pub fn set_after_send<F>(&mut self, hook: F)
    where
        F: Fn(&RequestEngine<O>) + Send + Sync + 'static,
    {
        self.hooks.set_after_send(hook);
    }

    pub fn clear_before_send(&mut self) {
        self.hooks.clear_before_send();
    }

    pub fn clear_after_send(&mut self) {
        self.hooks.clear_after_send();
    }

    pub fn hooks(&self) -> &LifecycleHooks<O> {
        &self.hooks
    }

    // -----------------------------------------------------------------------
    // State accessors. Reads are idempotent until the next send.
    // -----------------------------------------------------------------------

    /// Operation recorded by the most recent call.
    pub fn operation(&self) -> Option<O> {
        self.operation
    }

    pub fn request_method(&self) -> Option<&Method> {
        self.request_method.as_ref()
    }

    /// Accumulated request options after merging.
    pub fn request_options(&self) -> &Map<String, Value> {
        &self.request_options
    }

    /// Absolute URL of the most recent call.
    pub fn operation_url(&self) -> Option<&str> {
        self.operation_url.as_deref()
    }

    /// Raw decoded body of the last successful exchange.
    pub fn response(&self) -> Option<&Value> {
        self.response.as_ref()
    }

    pub fn response_field(&self, key: &str) -> Option<&Value> {
        self.response.as_ref().and_then(|r| r.get(key))
    }

    pub fn outcome(&self) -> &CallOutcome {
        &self.outcome
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn catalog(&self) -> &OperationCatalog<O> {
        &self.catalog
    }
}

/// Body encoding per method: GET carries none, POST carries the options as
/// JSON, PUT/DELETE carry them form-urlencoded.
fn encode_body(method: &Method, options: &Map<String, Value>) -> Result<Option<Bytes>, Error> {
    if *method == Method::GET {
        Ok(None)
    } else if *method == Method::POST {
        let body = serde_json::to_vec(options)?;
        Ok(Some(Bytes::from(body)))
    } else {
        let body = serde_urlencoded::to_string(options)?;
        Ok(Some(Bytes::from(body.into_bytes())))
    }
}
