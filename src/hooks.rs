use std::fmt;
use std::sync::Arc;

use crate::engine::RequestEngine;

/// Callback invoked around a dispatch with the engine as its argument.
pub type Hook<O> = Arc<dyn Fn(&RequestEngine<O>) + Send + Sync>;

/// Two optional callback slots fired around every request.
///
/// `before_send` runs after the call has been recorded into client state but
/// before the transport is invoked; `after_send` runs unconditionally once
/// the exchange has completed, including after a captured transport failure.
/// Hooks observe the engine read-only; a panic inside a hook propagates to
/// the caller of `send`.
pub struct LifecycleHooks<O> {
    before_send: Option<Hook<O>>,
    after_send: Option<Hook<O>>,
}

impl<O> LifecycleHooks<O> {
    pub fn new() -> Self {
        Self {
            before_send: None,
            after_send: None,
        }
    }

    pub fn set_before_send<F>(&mut self, hook: F)
    where
        F: Fn(&RequestEngine<O>) + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(hook));
    }

    pub fn set_after_send<F>(&mut self, hook: F)
    where
        F: Fn(&RequestEngine<O>) + Send + Sync + 'static,
    {
        self.after_send = Some(Arc::new(hook));
    }

    pub fn clear_before_send(&mut self) {
        self.before_send = None;
    }

    pub fn clear_after_send(&mut self) {
        self.after_send = None;
    }

    pub fn before_send(&self) -> Option<&(dyn Fn(&RequestEngine<O>) + Send + Sync)> {
        self.before_send.as_deref()
    }

    pub fn after_send(&self) -> Option<&(dyn Fn(&RequestEngine<O>) + Send + Sync)> {
        self.after_send.as_deref()
    }
}

impl<O> Default for LifecycleHooks<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> fmt::Debug for LifecycleHooks<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("before_send", &self.before_send.is_some())
            .field("after_send", &self.after_send.is_some())
            .finish()
    }
}
