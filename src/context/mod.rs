//! Per-request invocation context and the builder that assembles it.

mod builder;
mod env;
mod secrets;

pub use builder::{ContextBuilder, ACCESS_KEY_HEADER, ACCESS_KEY_SECRET_ENV, GRAPHQL_HOST_ENV};
pub use env::{EnvLookup, ProcessEnv};
pub use secrets::{SecretStore, LEGACY_SECRETS_DIR, SECRETS_DIR};

use crate::graphql::GraphqlClient;
use bytes::Bytes;
use std::fmt;
use std::io;
use std::sync::Arc;

/// Capabilities handed to the hosted function for one invocation.
///
/// Built fresh for every request and never shared between requests.
pub struct FnContext {
    secrets: SecretStore,
    env: Arc<dyn EnvLookup>,
    graphql: Option<GraphqlClient>,
}

impl FnContext {
    pub fn new(secrets: SecretStore, env: Arc<dyn EnvLookup>, graphql: Option<GraphqlClient>) -> Self {
        Self {
            secrets,
            env,
            graphql,
        }
    }

    /// Read a secret, trying the primary mount before the legacy one.
    pub async fn get_secret(&self, name: &str) -> io::Result<Bytes> {
        self.secrets.get(name).await
    }

    /// Look up an environment variable.
    pub fn get_env(&self, name: &str) -> Option<String> {
        self.env.lookup(name)
    }

    /// GraphQL client, present only when a GraphQL host is configured.
    pub fn graphql(&self) -> Option<&GraphqlClient> {
        self.graphql.as_ref()
    }
}

impl fmt::Debug for FnContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnContext")
            .field("secrets", &self.secrets)
            .field("graphql", &self.graphql)
            .finish_non_exhaustive()
    }
}
