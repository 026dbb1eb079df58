//! Health check endpoint handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scholar_search::SearchEngine;
use tracing::debug;

use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// Reports the process as healthy together with the configured engine. The
/// engine itself is not contacted.
///
/// # HTTP Request
///
/// `GET [base]/health`
pub async fn health_handler<E>(State(state): State<AppState<E>>) -> Response
where
    E: SearchEngine + 'static,
{
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "backend": state.engine().name(),
        "version": scholar_search::VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (StatusCode::OK, Json(health_response)).into_response()
}
