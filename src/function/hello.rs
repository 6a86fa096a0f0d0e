//! Hello-world function served by the default binary.

use crate::context::FnContext;
use crate::function::FnError;
use crate::http::{FnRequest, FnResponse, StatusCode};
use fnhost_macro::hosted_function;

/// Echo the request body back in a greeting.
#[hosted_function(name = "hello")]
pub async fn hello(req: FnRequest, _ctx: &FnContext) -> Result<FnResponse, FnError> {
    let message = format!("Hello world, input was: {}", req.text());

    Ok(FnResponse::new().status(StatusCode::OK).body(message))
}
