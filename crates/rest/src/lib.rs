//! # scholar-rest - Faceted search HTTP API
//!
//! This crate exposes the [`scholar_search`] query compiler over HTTP. Each
//! document type gets a `GET` search endpoint that validates the query
//! string, compiles it into engine query DSL with cross-filtered facets,
//! runs it on a [`SearchEngine`](scholar_search::SearchEngine) and returns a
//! paginated page as JSON or CSV.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scholar_rest::{AppState, ServerConfig, create_app};
//! use scholar_search::backends::{ElasticsearchConfig, ElasticsearchEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = ElasticsearchEngine::new(ElasticsearchConfig::default())?;
//!     let config = ServerConfig::default();
//!     let state = AppState::new(Arc::new(engine), config.clone())?;
//!
//!     let app = create_app(state);
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Document type | HTTP Method | URL Pattern |
//! |---------------|-------------|-------------|
//! | publications | GET | `/search/resources?params` |
//! | tickets | GET | `/search/tickets?params` |
//! | import candidates | GET | `/search/import-candidates?params` |
//! | health | GET | `/health` |
//!
//! ## HTTP Headers
//!
//! - `Accept` - `application/json` (default) or `text/csv`
//! - `X-Organization-Id` - Organizations the caller may curate, set by the
//!   gateway; required for tickets and import candidates
//!
//! ## Error Handling
//!
//! Errors are returned as problem documents:
//!
//! | HTTP Status | Cause |
//! |-------------|-------|
//! | 400 | Unknown parameter, invalid value, invalid sort, missing parameter |
//! | 406 | No acceptable response format |
//! | 408 | Request deadline exceeded |
//! | 502 | Search engine failure |
//! | 500 | Internal server error |
//!
//! ## Architecture
//!
//! - [`error`] - Error types and problem documents
//! - [`config`] - Server configuration
//! - [`state`] - Application state (engine, catalogues, promotions, configuration)
//! - [`access`] - Access filters per document type
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Content negotiation
//! - [`extractors`] - Query string and organization scope extractors
//! - [`responses`] - JSON and CSV rendering
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod access;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::{AppState, Catalogues};

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use scholar_search::{SearchEngine, TaxonomyError};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application over prepared state.
///
/// Adds tracing, the request deadline and, when enabled, CORS.
pub fn create_app<E>(state: AppState<E>) -> Router
where
    E: SearchEngine + 'static,
{
    info!(engine = state.engine().name(), "Creating search API");

    let config = state.config().clone();
    let router = routing::create_routes(state);
    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.request_timeout),
            )),
    )
}

/// Creates the Axum application without promoted results.
///
/// Use [`AppState::with_promotions`] and [`create_app`] to add a promotion
/// source.
pub fn create_app_with_config<E>(engine: E, config: ServerConfig) -> Result<Router, TaxonomyError>
where
    E: SearchEngine + 'static,
{
    let state = AppState::new(Arc::new(engine), config)?;
    Ok(create_app(state))
}

/// The search API is read-only, so only `GET` and preflight requests are
/// allowed across origins.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([Method::GET, Method::OPTIONS]);

    let cors = if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(parse_list::<HeaderValue>(&config.cors_origins))
    };

    if config.cors_headers == "*" {
        cors.allow_headers(Any)
    } else {
        cors.allow_headers(parse_list::<HeaderName>(&config.cors_headers))
    }
}

fn parse_list<T: FromStr>(list: &str) -> Vec<T> {
    list.split(',').filter_map(|item| item.trim().parse().ok()).collect()
}

/// Initializes the tracing subscriber.
///
/// Call once at startup. `RUST_LOG` overrides `level` when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "scholar={level},scholar_rest={level},scholar_search={level},tower_http=info"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
