//! HTTP serving: configuration, the request adapter and the listening server.

mod adapter;
mod config;
mod server;

pub use adapter::RequestAdapter;
pub use config::{parse_int_or_duration, ServerConfig};
pub use server::Server;
