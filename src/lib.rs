//! # fnhost - single-function HTTP adapter
//!
//! fnhost exposes one user-defined function as an HTTP endpoint, for use as
//! the entrypoint of a function-as-a-service container.
//!
//! Every inbound request, whatever its method or path, is normalized into an
//! [`FnRequest`] and passed to the function together with an [`FnContext`]
//! carrying the ambient capabilities of the platform:
//!
//! - secrets, read from `/var/openfaas/secrets/<name>` with a fallback to
//!   `/run/secrets/<name>`
//! - environment lookup
//! - a GraphQL client, when `GRAPHQL_HOST` is set, whose every request carries
//!   the access key named by `HASURA_ACCESS_KEY_SECRET` in the
//!   `X-Hasura-Access-Key` header
//!
//! The function's [`FnResponse`] is written back with its status (200 when
//! unset), headers and body. A failing function produces a 500.
//!
//! ```text
//!   HTTP request ──► RequestAdapter ──► ContextBuilder (secret, transport, GraphQL)
//!                          │
//!                          ▼
//!                  HostedFunction::handle(FnRequest, &FnContext)
//!                          │
//!   HTTP response ◄────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fnhost::prelude::*;
//! use std::sync::Arc;
//!
//! #[hosted_function]
//! async fn echo(req: FnRequest, _ctx: &FnContext) -> Result<FnResponse, FnError> {
//!     Ok(FnResponse::new().body(req.body_bytes().clone()))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = ServerConfig::from_env(&ProcessEnv);
//!     Server::new(config, Arc::new(EchoFunction)).run().await
//! }
//! ```

// lets the generated code of `#[hosted_function]` name this crate from inside it
extern crate self as fnhost;

pub mod context;
pub mod function;
pub mod graphql;
pub mod http;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::context::{EnvLookup, FnContext, ProcessEnv};
    pub use crate::function::{FnError, HostedFunction};
    pub use crate::graphql::{GraphqlClient, GraphqlError, GraphqlRequest};
    pub use crate::http::{FnRequest, FnResponse, Method, StatusCode};
    pub use crate::runtime::{Server, ServerConfig};
    pub use async_trait::async_trait;
    pub use fnhost_macro::hosted_function;
}

// Re-export for convenience
pub use context::{ContextBuilder, FnContext};
pub use function::{FnError, HostedFunction};
pub use http::{FnRequest, FnResponse};
pub use runtime::{RequestAdapter, Server, ServerConfig};
