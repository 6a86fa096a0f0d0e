//! HTTP send capability and the header-injecting decorator around it.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::HeaderMap;
use hyper::{Request, Response};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;

/// Error produced while sending a request.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Sends one HTTP request and returns the fully read response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request<Full<Bytes>>) -> Result<Response<Bytes>, TransportError>;
}

/// HTTP/1 transport backed by a pooled hyper client. Speaks `http` and
/// `https`, trusting the webpki root certificates.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: Request<Full<Bytes>>) -> Result<Response<Bytes>, TransportError> {
        let response = self.client.request(request).await?;
        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(Response::from_parts(parts, body))
    }
}

/// Decorator that force-sets a fixed set of headers on every request before
/// delegating. A header already present on the request under the same name is
/// replaced, never appended to.
#[derive(Clone)]
pub struct HeaderInjectingTransport {
    inner: Arc<dyn Transport>,
    headers: HeaderMap,
}

impl HeaderInjectingTransport {
    pub fn new(inner: Arc<dyn Transport>, headers: HeaderMap) -> Self {
        Self { inner, headers }
    }

    /// Headers set on every outgoing request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[async_trait]
impl Transport for HeaderInjectingTransport {
    async fn send(&self, mut request: Request<Full<Bytes>>) -> Result<Response<Bytes>, TransportError> {
        let target = request.headers_mut();
        for name in self.headers.keys() {
            target.remove(name);
            for value in self.headers.get_all(name) {
                target.append(name.clone(), value.clone());
            }
        }

        self.inner.send(request).await
    }
}
