//! Hosted function trait and error type.

use crate::context::FnContext;
use crate::graphql::GraphqlError;
use crate::http::{FnRequest, FnResponse};
use async_trait::async_trait;
use bytes::Bytes;

/// A user function served behind the request adapter.
///
/// Each inbound request is normalized into an [`FnRequest`] and handed to
/// [`handle`](HostedFunction::handle) along with a freshly built context.
/// Requests may be handled concurrently, so implementations must not rely on
/// exclusive access to `self`.
#[async_trait]
pub trait HostedFunction: Send + Sync {
    /// Handle one invocation.
    async fn handle(&self, request: FnRequest, ctx: &FnContext) -> Result<FnResponse, FnError>;

    /// Function name, used in logs.
    fn name(&self) -> &str;
}

/// Hosted function failure.
///
/// Always answered with a 500. The carried response still contributes its
/// headers and body to what the caller sees, so a function can fail and still
/// explain itself.
#[derive(Debug, Clone)]
pub struct FnError {
    /// Logged server-side, never written to the caller.
    pub message: String,
    /// Headers and body written alongside the 500.
    pub response: FnResponse,
}

impl FnError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: FnResponse::new(),
        }
    }

    /// Attach the partial response written with the 500. Its status is ignored.
    pub fn with_response(mut self, response: FnResponse) -> Self {
        self.response = response;
        self
    }

    /// Attach a body written with the 500.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.response.body = body.into();
        self
    }
}

impl std::fmt::Display for FnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FnError {}

impl From<std::io::Error> for FnError {
    fn from(err: std::io::Error) -> Self {
        FnError::new(err.to_string())
    }
}

impl From<serde_json::Error> for FnError {
    fn from(err: serde_json::Error) -> Self {
        FnError::new(err.to_string())
    }
}

impl From<GraphqlError> for FnError {
    fn from(err: GraphqlError) -> Self {
        FnError::new(err.to_string())
    }
}
