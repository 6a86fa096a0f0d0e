//! Normalized response produced by the hosted function.

use super::request::HeaderValues;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;

/// HTTP status code as declared by the function. Not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

/// Normalized HTTP response.
///
/// A missing or zero status means "use the default" (200).
#[derive(Debug, Clone, Default)]
pub struct FnResponse {
    /// Declared status code.
    pub status: Option<StatusCode>,
    /// Headers merged into the outbound response. Names are matched without
    /// regard to case and written title-cased (`x-trace` as `X-Trace`).
    pub headers: HeaderValues,
    /// Response body, written as-is.
    pub body: Bytes,
}

impl FnResponse {
    /// Create an empty response with no declared status.
    pub fn new() -> Self {
        Self {
            status: None,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create a plain-text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .body(content.into())
    }

    /// Create a response with a JSON body.
    pub fn json<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(data)?;
        Ok(Self::new()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(body))
    }

    /// Declare the status code.
    pub fn status(mut self, status: impl Into<StatusCode>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Append a header value.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Set the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Status to write when the function succeeded: the declared one, or 200
    /// when unset or zero.
    pub fn effective_status(&self) -> StatusCode {
        match self.status {
            None | Some(StatusCode(0)) => StatusCode::OK,
            Some(status) => status,
        }
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_status_defaults_to_ok() {
        assert_eq!(FnResponse::new().effective_status(), StatusCode::OK);
        assert_eq!(FnResponse::new().status(StatusCode(0)).effective_status(), StatusCode::OK);
        assert_eq!(
            FnResponse::new().status(StatusCode::CREATED).effective_status(),
            StatusCode::CREATED
        );
        // passed through verbatim, even when not a registered code
        assert_eq!(FnResponse::new().status(StatusCode(799)).effective_status(), StatusCode(799));
    }

    #[test]
    fn json_sets_content_type() {
        let response = FnResponse::json(&serde_json::json!({ "ok": true })).unwrap();
        assert_eq!(
            response.headers.get("Content-Type"),
            Some(&vec!["application/json".to_string()])
        );
        assert_eq!(response.text_body(), r#"{"ok":true}"#);
    }
}
