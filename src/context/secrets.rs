//! Secret loading from the function platform's secret mounts.

use bytes::Bytes;
use std::io;
use std::path::PathBuf;

/// Where secrets are mounted.
pub const SECRETS_DIR: &str = "/var/openfaas/secrets";
/// Mount point used by older platform releases (0.8.2 and earlier).
pub const LEGACY_SECRETS_DIR: &str = "/run/secrets";

/// Reads secrets from a primary directory, falling back to a legacy one.
#[derive(Debug, Clone)]
pub struct SecretStore {
    primary: PathBuf,
    fallback: PathBuf,
}

impl SecretStore {
    /// Create a store over custom directories.
    pub fn new(primary: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    /// Read a secret by name.
    ///
    /// Any failure reading `<primary>/<name>` (missing, unreadable, not a file)
    /// moves on to `<fallback>/<name>`. If both fail, the fallback's error is
    /// returned.
    pub async fn get(&self, name: &str) -> io::Result<Bytes> {
        // names are appended to the directory, never allowed to replace it
        let name = name.trim_start_matches('/');

        match tokio::fs::read(self.primary.join(name)).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(_) => tokio::fs::read(self.fallback.join(name))
                .await
                .map(Bytes::from),
        }
    }
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new(SECRETS_DIR, LEGACY_SECRETS_DIR)
    }
}
