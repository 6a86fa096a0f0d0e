//! fnhost server
//!
//! Serves the hello-world function on port 8082.

use fnhost::function::hello::HelloFunction;
use fnhost::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env(&ProcessEnv);

    tracing::info!("Starting function '{}'", HelloFunction.name());

    Server::new(config, Arc::new(HelloFunction)).run().await
}
