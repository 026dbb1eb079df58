//! Search route configuration.

use axum::{Router, routing::get};
use scholar_search::{DocumentType, SearchEngine};

use crate::handlers;
use crate::state::AppState;

/// Path of the publication search endpoint.
pub const RESOURCES_PATH: &str = "/search/resources";
/// Path of the ticket search endpoint.
pub const TICKETS_PATH: &str = "/search/tickets";
/// Path of the import candidate search endpoint.
pub const IMPORT_CANDIDATES_PATH: &str = "/search/import-candidates";
/// Path of the health check.
pub const HEALTH_PATH: &str = "/health";

/// Returns the search endpoint path of `document_type`.
pub fn endpoint_path(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::Publication => RESOURCES_PATH,
        DocumentType::Ticket => TICKETS_PATH,
        DocumentType::ImportCandidate => IMPORT_CANDIDATES_PATH,
    }
}

/// Creates all API routes.
///
/// # Routes
///
/// - `GET /search/resources` - Publication search
/// - `GET /search/tickets` - Ticket search
/// - `GET /search/import-candidates` - Import candidate search
/// - `GET /health` - Health check
pub fn create_routes<E>(state: AppState<E>) -> Router
where
    E: SearchEngine + 'static,
{
    Router::new()
        .route(RESOURCES_PATH, get(handlers::search_resources_handler::<E>))
        .route(TICKETS_PATH, get(handlers::search_tickets_handler::<E>))
        .route(
            IMPORT_CANDIDATES_PATH,
            get(handlers::search_import_candidates_handler::<E>),
        )
        .route(HEALTH_PATH, get(handlers::health_handler::<E>))
        .with_state(state)
}
