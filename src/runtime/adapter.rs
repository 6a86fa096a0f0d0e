//! Translates between HTTP and the hosted function's normalized values.

use crate::context::ContextBuilder;
use crate::function::HostedFunction;
use crate::http::{canonical_header_key, FnRequest, FnResponse, HeaderValues, StatusCode};
use bytes::{BufMut, Bytes, BytesMut};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::{Request, Response};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Runs the hosted function for each inbound HTTP request.
///
/// Handling never fails: every internal error becomes a 500 response.
pub struct RequestAdapter {
    function: Arc<dyn HostedFunction>,
    contexts: ContextBuilder,
    read_timeout: Option<Duration>,
}

impl RequestAdapter {
    pub fn new(function: Arc<dyn HostedFunction>, contexts: ContextBuilder) -> Self {
        Self {
            function,
            contexts,
            read_timeout: None,
        }
    }

    /// Bound the time spent reading a request body, counted from the start
    /// of [`handle`](Self::handle). Zero means no limit.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Handle one request: read the body, build the context, call the
    /// function, and translate its result.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body + Unpin,
        B::Error: Display,
    {
        let deadline = self.read_timeout.map(|limit| Instant::now() + limit);
        self.handle_until(req, deadline).await
    }

    /// Like [`handle`](Self::handle), with the body read bounded by an
    /// explicit deadline instead of the configured timeout. The server passes
    /// the deadline of the whole request read, which started before the head
    /// was parsed.
    pub async fn handle_until<B>(&self, req: Request<B>, read_deadline: Option<Instant>) -> Response<Full<Bytes>>
    where
        B: Body + Unpin,
        B::Error: Display,
    {
        let (parts, body) = req.into_parts();
        let input = read_body(body, read_deadline).await;

        let request = FnRequest::new(parts.method)
            .headers(normalize_headers(&parts.headers))
            .query_string(parts.uri.query().unwrap_or_default())
            .body(input);

        let ctx = self.contexts.build().await;

        debug!(
            "Invoking function '{}': {} {}",
            self.function.name(),
            request.method(),
            parts.uri.path()
        );

        match self.function.handle(request, &ctx).await {
            Ok(response) => {
                let status = response.effective_status();
                build_response(status, response)
            }
            Err(err) => {
                error!("Function '{}' error: {}", self.function.name(), err);
                build_response(StatusCode::INTERNAL_SERVER_ERROR, err.response)
            }
        }
    }
}

/// Read the whole body. A failed or timed out read is logged and whatever
/// arrived before it is kept. The body is dropped before returning.
async fn read_body<B>(mut body: B, deadline: Option<Instant>) -> Bytes
where
    B: Body + Unpin,
    B::Error: Display,
{
    let mut input = BytesMut::new();
    let read = collect_frames(&mut body, &mut input);

    let outcome = match deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, read).await {
            Ok(result) => result,
            Err(_) => Err("read deadline exceeded".to_string()),
        },
        None => read.await,
    };
    if let Err(err) = outcome {
        warn!("Error reading body from request: {}", err);
    }

    input.freeze()
}

async fn collect_frames<B>(body: &mut B, input: &mut BytesMut) -> Result<(), String>
where
    B: Body + Unpin,
    B::Error: Display,
{
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| e.to_string())?;
        // trailers are not part of the normalized request
        if let Ok(data) = frame.into_data() {
            input.put(data);
        }
    }
    Ok(())
}

fn normalize_headers(headers: &HeaderMap) -> HeaderValues {
    let mut normalized: HeaderValues = HashMap::new();
    for (name, value) in headers {
        normalized
            .entry(canonical_header_key(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    normalized
}

/// Write status, merged headers and body. The body is always written, even
/// when empty and even on a 500.
fn build_response(status: StatusCode, response: FnResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(status.0).unwrap_or_else(|_| {
        warn!(
            "Invalid status code {}, falling back to 500 Internal Server Error",
            status.0
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut http_response = Response::new(Full::new(response.body));
    *http_response.status_mut() = status;

    let headers = http_response.headers_mut();
    for (name, values) in response.headers {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                warn!("Skipping invalid response header name '{}'", name);
                continue;
            }
        };
        headers.remove(&name);
        for value in values {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    headers.append(name.clone(), value);
                }
                Err(_) => warn!("Skipping invalid value for response header '{}'", name),
            }
        }
    }

    http_response
}
