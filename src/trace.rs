//! Observational callbacks for a single call.
//!
//! Hooks are passed explicitly to [`PushClient::execute_traced`], so two
//! concurrent calls on one client can carry independent hook sets.
//!
//! [`PushClient::execute_traced`]: crate::PushClient::execute_traced

use std::fmt;

/// Error a hook may return. Aborts the call without retrying.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

type BytesHook = Box<dyn Fn(&[u8]) -> Result<(), HookError> + Send + Sync>;
type StatusHook = Box<dyn Fn(u16) -> Result<(), HookError> + Send + Sync>;

/// Point in an attempt at which a hook fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceStage {
    RequestBody,
    ResponseStatus,
    ResponseBody,
}

impl fmt::Display for TraceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RequestBody => "request body",
            Self::ResponseStatus => "response status",
            Self::ResponseBody => "response body",
        };
        f.write_str(name)
    }
}

/// Optional set of per-attempt callbacks.
///
/// Every hook fires at most once per attempt:
/// - `on_request_body` right before the send, with the exact bytes on the wire
///   (empty when the request has no body);
/// - `on_response_status` once the response envelope arrives, before the body
///   is read;
/// - `on_response_body` after the body has been fully drained.
///
/// An unset hook is a no-op.
#[derive(Default)]
pub struct TraceHooks {
    request_body: Option<BytesHook>,
    response_status: Option<StatusHook>,
    response_body: Option<BytesHook>,
}

impl fmt::Debug for TraceHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceHooks")
            .field("on_request_body", &self.request_body.is_some())
            .field("on_response_status", &self.response_status.is_some())
            .field("on_response_body", &self.response_body.is_some())
            .finish()
    }
}

impl TraceHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_request_body<F>(mut self, hook: F) -> Self
    where
        F: Fn(&[u8]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.request_body = Some(Box::new(hook));
        self
    }

    pub fn on_response_status<F>(mut self, hook: F) -> Self
    where
        F: Fn(u16) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.response_status = Some(Box::new(hook));
        self
    }

    pub fn on_response_body<F>(mut self, hook: F) -> Self
    where
        F: Fn(&[u8]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.response_body = Some(Box::new(hook));
        self
    }

    pub(crate) fn request_body(&self, body: &[u8]) -> Result<(), (TraceStage, HookError)> {
        match &self.request_body {
            Some(hook) => hook(body).map_err(|err| (TraceStage::RequestBody, err)),
            None => Ok(()),
        }
    }

    pub(crate) fn response_status(&self, status: u16) -> Result<(), (TraceStage, HookError)> {
        match &self.response_status {
            Some(hook) => hook(status).map_err(|err| (TraceStage::ResponseStatus, err)),
            None => Ok(()),
        }
    }

    pub(crate) fn response_body(&self, body: &[u8]) -> Result<(), (TraceStage, HookError)> {
        match &self.response_body {
            Some(hook) => hook(body).map_err(|err| (TraceStage::ResponseBody, err)),
            None => Ok(()),
        }
    }
}
