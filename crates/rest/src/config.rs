//! Server configuration for the search API.
//!
//! Every option can be given on the command line or through an environment
//! variable.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SCHOLAR_SERVER_PORT` | 8080 | Server port |
//! | `SCHOLAR_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `SCHOLAR_LOG_LEVEL` | info | Log level |
//! | `SCHOLAR_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `SCHOLAR_ENABLE_CORS` | true | Enable CORS |
//! | `SCHOLAR_CORS_ORIGINS` | * | Allowed origins |
//! | `SCHOLAR_CORS_HEADERS` | Accept,Authorization,Content-Type,X-Organization-Id | Allowed headers |
//! | `SCHOLAR_BASE_URL` | http://localhost:8080 | Public base URL of result links |
//! | `SCHOLAR_API_HOST` | https://api.scholar-search.org | Host identifier fragments expand against |
//! | `SCHOLAR_INDEX_PREFIX` | (empty) | Prefix of every engine index name |
//! | `SCHOLAR_DEFAULT_PAGE_SIZE` | (per document type) | Page size when `size` is absent |
//! | `SCHOLAR_MAX_PAGE_SIZE` | 1000 | Largest accepted page size |
//! | `SCHOLAR_PROMOTION_TIMEOUT_MS` | 500 | Promotion lookup budget |
//! | `SCHOLAR_PROMOTIONS_FILE` | (none) | JSON file of promoted results |
//! | `SCHOLAR_ES_NODES` | http://localhost:9200 | Elasticsearch nodes (comma separated) |
//! | `SCHOLAR_ES_USERNAME` | (none) | Elasticsearch basic auth user |
//! | `SCHOLAR_ES_PASSWORD` | (none) | Elasticsearch basic auth password |
//!
//! # Example
//!
//! ```rust
//! use scholar_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     index_prefix: "test-".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use scholar_search::{DocumentType, ValidationLimits};
use url::Url;

/// Server configuration for the search API.
#[derive(Debug, Clone, Parser)]
#[command(name = "scholar")]
#[command(about = "Faceted search API over Elasticsearch")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "SCHOLAR_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "SCHOLAR_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "SCHOLAR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "SCHOLAR_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "SCHOLAR_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "SCHOLAR_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "SCHOLAR_CORS_HEADERS",
        default_value = "Accept,Authorization,Content-Type,X-Organization-Id"
    )]
    pub cors_headers: String,

    /// Public base URL of result links.
    #[arg(long, env = "SCHOLAR_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Host that identifier fragments in parameter values expand against.
    #[arg(
        long,
        env = "SCHOLAR_API_HOST",
        default_value = "https://api.scholar-search.org"
    )]
    pub api_host: String,

    /// Prefix of every engine index name.
    #[arg(long, env = "SCHOLAR_INDEX_PREFIX", default_value = "")]
    pub index_prefix: String,

    /// Page size when `size` is absent; each document type has its own
    /// default otherwise.
    #[arg(long, env = "SCHOLAR_DEFAULT_PAGE_SIZE")]
    pub default_page_size: Option<u64>,

    /// Largest accepted page size.
    #[arg(long, env = "SCHOLAR_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: u64,

    /// Time budget of the promotion lookup in milliseconds.
    #[arg(long, env = "SCHOLAR_PROMOTION_TIMEOUT_MS", default_value = "500")]
    pub promotion_timeout_ms: u64,

    /// JSON file mapping contributors to promoted publication identifiers.
    #[arg(long, env = "SCHOLAR_PROMOTIONS_FILE")]
    pub promotions_file: Option<PathBuf>,

    /// Elasticsearch node URLs (comma-separated).
    #[arg(long, env = "SCHOLAR_ES_NODES", default_value = "http://localhost:9200")]
    pub elasticsearch_nodes: String,

    /// Elasticsearch username for basic auth.
    #[arg(long, env = "SCHOLAR_ES_USERNAME")]
    pub elasticsearch_username: Option<String>,

    /// Elasticsearch password for basic auth.
    #[arg(long, env = "SCHOLAR_ES_PASSWORD")]
    pub elasticsearch_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_headers: "Accept,Authorization,Content-Type,X-Organization-Id".to_string(),
            base_url: "http://localhost:8080".to_string(),
            api_host: "https://api.scholar-search.org".to_string(),
            index_prefix: String::new(),
            default_page_size: None,
            max_page_size: 1000,
            promotion_timeout_ms: 500,
            promotions_file: None,
            elasticsearch_nodes: "http://localhost:9200".to_string(),
            elasticsearch_username: None,
            elasticsearch_password: None,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the engine index holding documents of `document_type`.
    pub fn index_name(&self, document_type: DocumentType) -> String {
        format!("{}{}", self.index_prefix, document_type.default_index())
    }

    /// Returns the absolute URL of an endpoint below the base URL.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    /// Returns the page limits enforced by the validator.
    pub fn limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_size: self.max_page_size,
            ..ValidationLimits::default()
        }
    }

    /// Returns the promotion lookup budget.
    pub fn promotion_timeout(&self) -> Duration {
        Duration::from_millis(self.promotion_timeout_ms)
    }

    /// Returns the configured Elasticsearch nodes.
    pub fn elasticsearch_node_list(&self) -> Vec<String> {
        self.elasticsearch_nodes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.max_page_size == 0 {
            errors.push("Max page size cannot be 0".to_string());
        }

        match self.default_page_size {
            Some(0) => errors.push("Default page size cannot be 0".to_string()),
            Some(size) if size > self.max_page_size => {
                errors.push("Default page size cannot exceed max page size".to_string())
            }
            _ => {}
        }

        if Url::parse(&self.base_url).is_err() {
            errors.push(format!("Base URL '{}' is not a valid URL", self.base_url));
        }

        if Url::parse(&self.api_host).is_err() {
            errors.push(format!("API host '{}' is not a valid URL", self.api_host));
        }

        if self.elasticsearch_node_list().is_empty() {
            errors.push("At least one Elasticsearch node is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0, a fixed link host and short timeouts.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_headers: "*".to_string(),
            base_url: "https://api.test".to_string(),
            api_host: "https://api.test".to_string(),
            index_prefix: "test-".to_string(),
            default_page_size: None,
            max_page_size: 100,
            promotion_timeout_ms: 100,
            promotions_file: None,
            elasticsearch_nodes: "http://localhost:9200".to_string(),
            elasticsearch_username: None,
            elasticsearch_password: None,
        }
    }
}
