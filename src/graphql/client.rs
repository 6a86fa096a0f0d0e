//! Minimal GraphQL-over-HTTP client.

use super::transport::{Transport, TransportError};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::Request;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A GraphQL operation with its variables and extra per-request headers.
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    query: String,
    variables: Map<String, Value>,
    #[serde(skip)]
    headers: Vec<(String, String)>,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
            headers: Vec::new(),
        }
    }

    /// Set a variable.
    pub fn var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Add a header sent with this request only.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    message: String,
}

/// GraphQL client error.
#[derive(Debug)]
pub enum GraphqlError {
    /// The request could not be built.
    InvalidRequest(String),
    /// The transport failed to deliver the request.
    Transport(TransportError),
    /// Non-2xx status with a body that is not a GraphQL response.
    Status { status: u16, body: Bytes },
    /// The response body or its `data` did not decode.
    Decode(serde_json::Error),
    /// The server answered with a non-empty `errors` array.
    Graphql { messages: Vec<String> },
}

impl fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphqlError::InvalidRequest(msg) => write!(f, "graphql: invalid request: {}", msg),
            GraphqlError::Transport(err) => write!(f, "graphql: {}", err),
            GraphqlError::Status { status, .. } => {
                write!(f, "graphql: server returned a non-200 status code: {}", status)
            }
            GraphqlError::Decode(err) => write!(f, "graphql: decoding response: {}", err),
            GraphqlError::Graphql { messages } => {
                write!(f, "graphql: {}", messages.first().map(String::as_str).unwrap_or(""))
            }
        }
    }
}

impl std::error::Error for GraphqlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphqlError::Transport(err) => Some(err.as_ref()),
            GraphqlError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

/// GraphQL client bound to one endpoint, sending through a [`Transport`].
#[derive(Clone)]
pub struct GraphqlClient {
    endpoint: String,
    transport: Arc<dyn Transport>,
}

impl GraphqlClient {
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute an operation and decode its `data` into `T`.
    ///
    /// A `null` or missing `data` is decoded as JSON `null`, so `T` may be an
    /// `Option` or `()` for operations whose result is not needed.
    pub async fn run<T: DeserializeOwned>(&self, request: &GraphqlRequest) -> Result<T, GraphqlError> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| GraphqlError::InvalidRequest(e.to_string()))?;

        let mut builder = Request::post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .header(ACCEPT, "application/json; charset=utf-8");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let http_request = builder
            .body(Full::new(Bytes::from(payload)))
            .map_err(|e| GraphqlError::InvalidRequest(e.to_string()))?;

        let response = self
            .transport
            .send(http_request)
            .await
            .map_err(GraphqlError::Transport)?;
        let status = response.status();
        let body = response.into_body();

        let envelope: Envelope = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(GraphqlError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(e) => return Err(GraphqlError::Decode(e)),
        };

        if !envelope.errors.is_empty() {
            return Err(GraphqlError::Graphql {
                messages: envelope.errors.into_iter().map(|e| e.message).collect(),
            });
        }

        T::deserialize(envelope.data.unwrap_or(Value::Null)).map_err(GraphqlError::Decode)
    }
}

impl fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
