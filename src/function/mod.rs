//! The hosted function seam.

pub mod handler;
pub mod hello;

pub use handler::{FnError, HostedFunction};
