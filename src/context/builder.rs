//! Assembles an [`FnContext`] from the current environment.

use super::{EnvLookup, FnContext, ProcessEnv, SecretStore};
use crate::graphql::{GraphqlClient, HeaderInjectingTransport, HyperTransport, Transport};
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use tracing::{debug, warn};

/// Names the secret holding the GraphQL access key.
pub const ACCESS_KEY_SECRET_ENV: &str = "HASURA_ACCESS_KEY_SECRET";
/// GraphQL endpoint; the client is only built when this is set and non-empty.
pub const GRAPHQL_HOST_ENV: &str = "GRAPHQL_HOST";
/// Header carrying the access key on outbound GraphQL calls.
pub const ACCESS_KEY_HEADER: HeaderName = HeaderName::from_static("x-hasura-access-key");

/// Builds a fresh [`FnContext`] per request.
///
/// Nothing is cached: the secret is re-read and the header-injecting
/// transport rebuilt on every call. The underlying transport (and its
/// connection pool) is shared.
#[derive(Clone)]
pub struct ContextBuilder {
    env: Arc<dyn EnvLookup>,
    secrets: SecretStore,
    transport: Arc<dyn Transport>,
}

impl ContextBuilder {
    pub fn new(env: Arc<dyn EnvLookup>, secrets: SecretStore, transport: Arc<dyn Transport>) -> Self {
        Self {
            env,
            secrets,
            transport,
        }
    }

    /// Process environment, the standard secret mounts, and a hyper transport.
    pub fn from_process_env() -> Self {
        Self::new(
            Arc::new(ProcessEnv),
            SecretStore::default(),
            Arc::new(HyperTransport::new()),
        )
    }

    pub async fn build(&self) -> FnContext {
        let secret_name = self.env.lookup(ACCESS_KEY_SECRET_ENV).unwrap_or_default();

        // a missing secret degrades to an empty access key
        let access_key = match self.secrets.get(&secret_name).await {
            Ok(bytes) => bytes,
            Err(err) => {
                if secret_name.is_empty() {
                    debug!("No access key secret configured");
                } else {
                    warn!("Could not read secret '{}': {}", secret_name, err);
                }
                Default::default()
            }
        };
        let access_key = HeaderValue::from_bytes(&access_key).unwrap_or_else(|_| {
            warn!(
                "Secret '{}' is not a valid header value, sending an empty access key",
                secret_name
            );
            HeaderValue::from_static("")
        });

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_KEY_HEADER, access_key);
        let transport = HeaderInjectingTransport::new(self.transport.clone(), headers);

        let graphql = match self.env.lookup(GRAPHQL_HOST_ENV) {
            Some(host) if !host.is_empty() => Some(GraphqlClient::new(host, Arc::new(transport))),
            _ => None,
        };

        FnContext::new(self.secrets.clone(), self.env.clone(), graphql)
    }
}
