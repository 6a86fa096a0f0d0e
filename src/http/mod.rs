//! Transport-agnostic request and response values exchanged with the hosted function.

mod request;
mod response;

pub use hyper::Method;
pub use request::{canonical_header_key, FnRequest, HeaderValues};
pub use response::{FnResponse, StatusCode};
