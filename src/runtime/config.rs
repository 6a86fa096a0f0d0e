//! Server configuration.

use crate::context::EnvLookup;
use std::time::Duration;

/// Port the adapter listens on.
pub const DEFAULT_PORT: u16 = 8082;
/// Read and write timeout used when the environment does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound on request head size.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 1 << 20;
// hyper refuses read buffers smaller than this
pub(crate) const MIN_MAX_HEADER_BYTES: usize = 8192;

/// Configuration for the listening server. Fixed at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Time allowed to read a request, head and body. Zero means no limit.
    pub read_timeout: Duration,
    /// Time allowed from the end of the request head to the response. Zero
    /// means no limit.
    pub write_timeout: Duration,
    /// Maximum size of a request head in bytes.
    pub max_header_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with `read_timeout` and `write_timeout` taken from the
    /// environment when they parse.
    pub fn from_env(env: &dyn EnvLookup) -> Self {
        let timeout = |name: &str| {
            parse_int_or_duration(&env.lookup(name).unwrap_or_default(), DEFAULT_TIMEOUT)
        };

        Self {
            read_timeout: timeout("read_timeout"),
            write_timeout: timeout("write_timeout"),
            ..Self::default()
        }
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the request head limit. Values below 8 KiB are raised to 8 KiB.
    pub fn max_header_bytes(mut self, bytes: usize) -> Self {
        self.max_header_bytes = bytes.max(MIN_MAX_HEADER_BYTES);
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a timeout setting.
///
/// A non-negative integer is a number of seconds. Anything else is tried as
/// a duration expression such as `2s`, `1500ms` or `1m 30s`. When neither
/// parses, `fallback` is returned.
pub fn parse_int_or_duration(value: &str, fallback: Duration) -> Duration {
    if let Ok(seconds) = value.parse::<u64>() {
        return Duration::from_secs(seconds);
    }

    humantime::parse_duration(value).unwrap_or(fallback)
}
