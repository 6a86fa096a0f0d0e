//! Outbound GraphQL access for hosted functions.

mod client;
pub(crate) mod transport;

pub use client::{GraphqlClient, GraphqlError, GraphqlRequest};
pub use transport::{HeaderInjectingTransport, HyperTransport, Transport, TransportError};
