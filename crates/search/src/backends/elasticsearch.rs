//! Elasticsearch engine.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::{Elasticsearch, SearchParts};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::SearchEngine;
use crate::error::BackendError;

const BACKEND_NAME: &str = "elasticsearch";

/// Authentication configuration for Elasticsearch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ElasticsearchAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Configuration for the Elasticsearch engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Elasticsearch node URLs (e.g., `["http://localhost:9200"]`).
    /// Currently uses the first node (single-node connection pool).
    pub nodes: Vec<String>,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticsearchAuth>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
        }
    }
}

/// Executes compiled queries against an Elasticsearch cluster.
pub struct ElasticsearchEngine {
    client: Elasticsearch,
    config: ElasticsearchConfig,
}

impl Debug for ElasticsearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchEngine")
            .field("nodes", &self.config.nodes)
            .field("request_timeout_ms", &self.config.request_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: ElasticsearchConfig) -> Result<Self, BackendError> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn build_client(config: &ElasticsearchConfig) -> Result<Elasticsearch, BackendError> {
        let url = config
            .nodes
            .first()
            .cloned()
            .unwrap_or_else(|| "http://localhost:9200".to_string());

        let parsed_url: elasticsearch::http::Url =
            url.parse().map_err(|e| BackendError::Unavailable {
                backend_name: BACKEND_NAME.to_string(),
                message: format!("Invalid URL: {}", e),
            })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ElasticsearchAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ElasticsearchAuth::Bearer { token } => {
                    builder.auth(Credentials::Bearer(token.clone()))
                }
            };
        }

        let transport = builder.build().map_err(|e| BackendError::Unavailable {
            backend_name: BACKEND_NAME.to_string(),
            message: format!("Failed to build transport: {}", e),
        })?;

        Ok(Elasticsearch::new(transport))
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchEngine {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, BackendError> {
        debug!(index, "Sending search request");

        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout {
                        backend_name: BACKEND_NAME.to_string(),
                        timeout_ms: self.config.request_timeout_ms,
                    }
                } else {
                    BackendError::Unavailable {
                        backend_name: BACKEND_NAME.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status_code();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(index, status = status.as_u16(), "Search request rejected");
            return Err(BackendError::BadResponse {
                backend_name: BACKEND_NAME.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| BackendError::BadResponse {
                backend_name: BACKEND_NAME.to_string(),
                status: status.as_u16(),
                message: format!("Failed to parse search response: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ElasticsearchConfig::default();
        assert_eq!(config.nodes, vec!["http://localhost:9200".to_string()]);
        assert_eq!(config.request_timeout_ms, 30000);
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_engine_builds_without_connecting() {
        let engine = ElasticsearchEngine::new(ElasticsearchConfig::default()).unwrap();
        assert_eq!(engine.name(), "elasticsearch");
    }

    #[test]
    fn test_invalid_node_url() {
        let config = ElasticsearchConfig {
            nodes: vec!["not a url".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            ElasticsearchEngine::new(config),
            Err(BackendError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ElasticsearchConfig =
            serde_json::from_str(r#"{ "nodes": ["http://es:9200"] }"#).unwrap();
        assert_eq!(config.request_timeout_ms, 30000);
        assert!(!config.disable_certificate_validation);
    }
}
