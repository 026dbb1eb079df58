//! Scholar Search API server
//!
//! Faceted search over publications, tickets and import candidates.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use scholar_rest::{AppState, ServerConfig, create_app, init_logging};
use scholar_search::{PromotionSource, StaticPromotions};
use tracing::info;

/// Loads the promotion table, a JSON object mapping each subject to its
/// promoted identifiers in rank order.
fn load_promotions(path: &Path) -> anyhow::Result<StaticPromotions> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read promotions file {}: {}", path.display(), e))?;
    let entries: HashMap<String, Vec<String>> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid promotions file {}: {}", path.display(), e))?;
    Ok(entries.into_iter().collect())
}

/// Builds the promotion source from the server configuration.
fn create_promotions(config: &ServerConfig) -> anyhow::Result<Option<Arc<dyn PromotionSource>>> {
    let Some(path) = &config.promotions_file else {
        return Ok(None);
    };

    let promotions = load_promotions(path)?;
    info!(
        file = %path.display(),
        subjects = promotions.len(),
        "Loaded promoted results"
    );
    Ok(Some(Arc::new(promotions)))
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        base_url = %config.base_url,
        index_prefix = %config.index_prefix,
        "Starting Scholar Search API"
    );

    start_elasticsearch(config).await
}

/// Starts the server on an Elasticsearch cluster.
#[cfg(feature = "elasticsearch")]
async fn start_elasticsearch(config: ServerConfig) -> anyhow::Result<()> {
    use scholar_search::backends::{ElasticsearchAuth, ElasticsearchConfig, ElasticsearchEngine};

    let es_nodes = config.elasticsearch_node_list();
    let es_auth = match (
        &config.elasticsearch_username,
        &config.elasticsearch_password,
    ) {
        (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    };

    let es_config = ElasticsearchConfig {
        nodes: es_nodes.clone(),
        auth: es_auth,
        ..Default::default()
    };

    info!(nodes = ?es_nodes, "Initializing Elasticsearch engine");
    let engine = ElasticsearchEngine::new(es_config)?;

    let mut state = AppState::new(Arc::new(engine), config.clone())?;
    if let Some(promotions) = create_promotions(&config)? {
        state = state.with_promotions(promotions);
    }

    let app = create_app(state);
    serve(app, &config).await
}

/// Fallback when the elasticsearch feature is not enabled.
#[cfg(not(feature = "elasticsearch"))]
async fn start_elasticsearch(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The search API requires the 'elasticsearch' feature. \
         Build with: cargo build -p scholar-server --features elasticsearch"
    )
}
