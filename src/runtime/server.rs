//! Listening HTTP server.

use crate::context::ContextBuilder;
use crate::function::HostedFunction;
use crate::runtime::config::MIN_MAX_HEADER_BYTES;
use crate::runtime::{RequestAdapter, ServerConfig};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Serves one hosted function on every method and path.
pub struct Server {
    /// Server configuration.
    config: ServerConfig,
    /// Shared by all connections.
    adapter: Arc<RequestAdapter>,
}

impl Server {
    /// Create a server whose contexts come from the process environment.
    pub fn new(config: ServerConfig, function: Arc<dyn HostedFunction>) -> Self {
        Self::with_contexts(config, function, ContextBuilder::from_process_env())
    }

    /// Create a server with a custom context builder.
    pub fn with_contexts(
        config: ServerConfig,
        function: Arc<dyn HostedFunction>,
        contexts: ContextBuilder,
    ) -> Self {
        let adapter = RequestAdapter::new(function, contexts).read_timeout(config.read_timeout);
        Self {
            config,
            adapter: Arc::new(adapter),
        }
    }

    /// Bind the configured address and serve until the process exits.
    ///
    /// Only a failure to bind is returned.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "Server listening on {} (read timeout {:?}, write timeout {:?})",
            listener.local_addr()?,
            self.config.read_timeout,
            self.config.write_timeout
        );

        loop {
            let (stream, remote_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    warn!("Error accepting connection: {}", err);
                    continue;
                }
            };
            let io = TokioIo::new(stream);

            let adapter = self.adapter.clone();
            let config = self.config.clone();

            tokio::task::spawn(async move {
                let read_timeout = nonzero(config.read_timeout);
                let write_timeout = nonzero(config.write_timeout);
                // start of the current request read; the head and the body
                // share one read deadline measured from here
                let read_started = Arc::new(Mutex::new(Instant::now()));

                let service = service_fn(move |req: Request<Incoming>| {
                    let adapter = adapter.clone();
                    let read_started = read_started.clone();
                    async move {
                        debug!("Handling request: {} {} from {}", req.method(), req.uri(), remote_addr);

                        let read_deadline = read_timeout.map(|limit| *lock(&read_started) + limit);
                        let handling = adapter.handle_until(req, read_deadline);

                        let result = match write_timeout {
                            // on expiry the connection is dropped without a response
                            Some(limit) => tokio::time::timeout(limit, handling).await.map_err(|_| {
                                warn!("Response to {} not ready within {:?}", remote_addr, limit);
                                io::Error::new(io::ErrorKind::TimedOut, "write timeout")
                            }),
                            None => Ok(handling.await),
                        };
                        *lock(&read_started) = Instant::now();
                        result
                    }
                });

                let mut builder = http1::Builder::new();
                builder
                    .timer(TokioTimer::new())
                    .title_case_headers(true)
                    .max_buf_size(config.max_header_bytes.max(MIN_MAX_HEADER_BYTES));
                if let Some(limit) = read_timeout {
                    builder.header_read_timeout(limit);
                }

                if let Err(err) = builder.serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Zero disables a timeout.
fn nonzero(timeout: Duration) -> Option<Duration> {
    (!timeout.is_zero()).then_some(timeout)
}

fn lock(started: &Mutex<Instant>) -> MutexGuard<'_, Instant> {
    // an Instant cannot be left half-written, so a poisoned lock is still usable
    started.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
