//! Search handlers.
//!
//! One handler per document type, all running the same pipeline:
//!
//! 1. negotiate the response format
//! 2. validate the query string against the document type's catalogue
//! 3. resolve promoted results (bounded, failures degrade to none)
//! 4. compile and authorize the query
//! 5. run it on the engine
//! 6. assemble and render the page
//!
//! Caller errors are raised before the engine is contacted.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
};
use scholar_search::{
    DocumentType, Pager, QueryCompiler, ResponseAssembler, SearchEngine, Validator,
    resolve_promotions,
};
use tracing::{debug, info};

use crate::access::access_filter;
use crate::error::RestResult;
use crate::extractors::{OrganizationScope, QueryPairs};
use crate::middleware::negotiate_format;
use crate::responses::render_page;
use crate::routing::endpoint_path;
use crate::state::AppState;

/// Handler for publication search.
///
/// # HTTP Request
///
/// `GET [base]/search/resources?params`
pub async fn search_resources_handler<E>(
    State(state): State<AppState<E>>,
    scope: OrganizationScope,
    headers: HeaderMap,
    pairs: QueryPairs,
) -> RestResult<Response>
where
    E: SearchEngine + 'static,
{
    search(&state, DocumentType::Publication, &scope, &headers, &pairs).await
}

/// Handler for ticket search.
///
/// # HTTP Request
///
/// `GET [base]/search/tickets?params`
///
/// Requires the `X-Organization-Id` header; without it nothing matches.
pub async fn search_tickets_handler<E>(
    State(state): State<AppState<E>>,
    scope: OrganizationScope,
    headers: HeaderMap,
    pairs: QueryPairs,
) -> RestResult<Response>
where
    E: SearchEngine + 'static,
{
    search(&state, DocumentType::Ticket, &scope, &headers, &pairs).await
}

/// Handler for import candidate search.
///
/// # HTTP Request
///
/// `GET [base]/search/import-candidates?params`
///
/// Requires the `X-Organization-Id` header; without it nothing matches.
pub async fn search_import_candidates_handler<E>(
    State(state): State<AppState<E>>,
    scope: OrganizationScope,
    headers: HeaderMap,
    pairs: QueryPairs,
) -> RestResult<Response>
where
    E: SearchEngine + 'static,
{
    search(&state, DocumentType::ImportCandidate, &scope, &headers, &pairs).await
}

/// Runs one search request for `document_type`.
pub async fn search<E: SearchEngine>(
    state: &AppState<E>,
    document_type: DocumentType,
    scope: &OrganizationScope,
    headers: &HeaderMap,
    pairs: &QueryPairs,
) -> RestResult<Response> {
    let format = negotiate_format(headers)?;
    let catalogue = state.catalogue(document_type);
    let config = state.config();

    debug!(
        document_type = %document_type,
        parameters = pairs.len(),
        format = ?format,
        "Processing search request"
    );

    let store = Validator::new(catalogue)
        .with_limits(config.limits())
        .validate(pairs.iter())?;

    let promoted = resolve_promotions(
        catalogue,
        &store,
        state.promotions(),
        config.promotion_timeout(),
    )
    .await;

    let query = QueryCompiler::new(catalogue).compile(&store, &promoted);
    let query = match access_filter(catalogue, scope) {
        Some(filter) => query.authorize(filter),
        None => {
            debug!(document_type = %document_type, "No organization scope, query matches nothing");
            query
        }
    };

    let index = config.index_name(document_type);
    let response = state
        .engine()
        .search(&index, &query.to_request_body())
        .await?;

    let pager = Pager::new(config.endpoint_url(endpoint_path(document_type))?, &store);
    let page = ResponseAssembler::new(catalogue, &pager).assemble(
        state.engine().name(),
        &query,
        response,
    )?;

    info!(
        document_type = %document_type,
        index = %index,
        total_hits = page.total_hits,
        hits = page.hits.len(),
        promoted = promoted.len(),
        "Search completed"
    );

    render_page(format, document_type, page)
}
