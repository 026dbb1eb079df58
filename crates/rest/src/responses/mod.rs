//! Response rendering.
//!
//! Result pages are rendered as JSON (the serialized [`PagedSearch`]) or as
//! a CSV export of their hits.

pub mod csv;

use axum::{
    Json,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use scholar_search::{DocumentType, PagedSearch};

use crate::error::RestResult;
use crate::middleware::ResponseFormat;

/// Renders `page` in the negotiated format.
pub fn render_page(
    format: ResponseFormat,
    document_type: DocumentType,
    page: PagedSearch,
) -> RestResult<Response> {
    let mut response = match format {
        ResponseFormat::Json => Json(page).into_response(),
        ResponseFormat::Csv => csv::render(document_type, &page)?.into_response(),
    };
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.mime_type()),
    );
    Ok(response)
}
