//! Content negotiation.
//!
//! Search results are served as JSON or as CSV. The Accept header is scanned
//! in order and the first media type we can produce wins; a missing or empty
//! header means JSON.

use axum::http::{HeaderMap, header};

use crate::error::RestError;

/// Supported response formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// JSON (application/json)
    Json,
    /// Semicolon separated values (text/csv)
    Csv,
}

impl ResponseFormat {
    /// Returns the Content-Type header value for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    /// Parses a single media range, ignoring its parameters.
    pub fn parse(media_range: &str) -> Option<Self> {
        let media_type = media_range
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            "application/json" | "application/ld+json" | "application/*" | "*/*" => {
                Some(ResponseFormat::Json)
            }
            "text/csv" | "text/*" => Some(ResponseFormat::Csv),
            _ => None,
        }
    }
}

/// Determines the response format from the Accept header.
///
/// Returns [`RestError::NotAcceptable`] when the header names only media
/// types we cannot produce.
pub fn negotiate_format(headers: &HeaderMap) -> Result<ResponseFormat, RestError> {
    let Some(accept) = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    else {
        return Ok(ResponseFormat::Json);
    };

    accept
        .split(',')
        .find_map(ResponseFormat::parse)
        .ok_or_else(|| RestError::NotAcceptable {
            accept: accept.to_string(),
        })
}
