//! Normalized inbound request handed to the hosted function.

use bytes::Bytes;
use hyper::Method;
use std::collections::HashMap;

/// Header mapping: unique names, each with its values in arrival order.
pub type HeaderValues = HashMap<String, Vec<String>>;

/// Canonical form of a header name: the first letter and every letter after
/// a hyphen upper-cased, the rest lower-cased (`content-type` becomes
/// `Content-Type`).
pub fn canonical_header_key(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}

/// Normalized HTTP request.
///
/// Built once per inbound call by the request adapter and never changed
/// afterwards; the function only gets read access through the accessors.
/// Header names are stored in canonical form and looked up ignoring case.
#[derive(Debug, Clone)]
pub struct FnRequest {
    body: Bytes,
    headers: HeaderValues,
    method: Method,
    query_string: String,
}

impl FnRequest {
    /// Create an empty request with the given method.
    pub fn new(method: Method) -> Self {
        Self {
            body: Bytes::new(),
            headers: HashMap::new(),
            method,
            query_string: String::new(),
        }
    }

    /// Append a header value, keeping earlier values for the same name.
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .entry(canonical_header_key(key.as_ref()))
            .or_default()
            .push(value.into());
        self
    }

    /// Replace the header mapping. Names differing only in case are merged.
    pub fn headers(mut self, headers: HeaderValues) -> Self {
        self.headers = HashMap::with_capacity(headers.len());
        for (key, values) in headers {
            self.headers
                .entry(canonical_header_key(&key))
                .or_default()
                .extend(values);
        }
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the raw query string (without the leading `?`).
    pub fn query_string(mut self, query: impl Into<String>) -> Self {
        self.query_string = query.into();
        self
    }

    /// Raw body bytes. Empty when the request had no body.
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Full header mapping, keyed by canonical names.
    pub fn header_map(&self) -> &HeaderValues {
        &self.headers
    }

    /// First value of a header, ignoring the case of `key`.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.get_header_all(key).first().map(String::as_str)
    }

    /// All values of a header in order, ignoring the case of `key`.
    pub fn get_header_all(&self, key: &str) -> &[String] {
        self.headers
            .get(&canonical_header_key(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Raw query string, without the leading `?`.
    pub fn raw_query(&self) -> &str {
        &self.query_string
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl Default for FnRequest {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}
