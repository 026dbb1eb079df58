//! Error types for the search API.
//!
//! Every error is rendered as a problem document (`application/problem+json`).
//!
//! # Error Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | NotAcceptable | 406 |
//! | Backend | 502 |
//! | InternalError | 500 |
//!
//! Validation problems carry `invalidParameters` and `validParameters`
//! arrays so that a client can correct every mistake in one round trip.

use std::fmt;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use scholar_search::{BackendError, SearchError, TaxonomyError, ValidationError};
use serde::Serialize;
use tracing::{error, warn};

/// Media type of problem documents.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// Request parameters were rejected (HTTP 400).
    Validation(ValidationError),

    /// None of the accepted media types can be produced (HTTP 406).
    NotAcceptable {
        /// The Accept header as received.
        accept: String,
    },

    /// The search engine failed (HTTP 502).
    Backend(BackendError),

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::Validation(err) => write!(f, "Bad request: {}", err),
            RestError::NotAcceptable { accept } => {
                write!(f, "Not acceptable: {}", accept)
            }
            RestError::Backend(err) => write!(f, "Bad gateway: {}", err),
            RestError::InternalError { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RestError {}

/// Result type for REST operations.
pub type RestResult<T> = Result<T, RestError>;

/// A problem document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Problem type URI.
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short summary of the status.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Human readable explanation.
    pub detail: String,
    /// Failure class of a validation problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    /// Parameters the request got wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_parameters: Option<Vec<String>>,
    /// Parameters that would have been accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_parameters: Option<Vec<String>>,
}

impl Problem {
    fn new(status: StatusCode, detail: String) -> Self {
        Self {
            problem_type: "about:blank".to_string(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status: status.as_u16(),
            detail,
            kind: None,
            invalid_parameters: None,
            valid_parameters: None,
        }
    }
}

impl RestError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::Validation(_) => StatusCode::BAD_REQUEST,
            RestError::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            RestError::Backend(_) => StatusCode::BAD_GATEWAY,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the problem document of this error.
    pub fn problem(&self) -> Problem {
        let status = self.status_code();
        match self {
            RestError::Validation(err) => Problem {
                kind: Some(err.kind()),
                invalid_parameters: Some(err.invalid_parameters()),
                valid_parameters: Some(err.valid_parameters().to_vec()),
                ..Problem::new(status, err.to_string())
            },
            RestError::NotAcceptable { accept } => Problem::new(
                status,
                format!(
                    "Cannot produce any of '{}'; supported: application/json, text/csv",
                    accept
                ),
            ),
            // Engine details stay in the logs.
            RestError::Backend(_) => {
                Problem::new(status, "The search engine could not answer the request".to_string())
            }
            RestError::InternalError { .. } => {
                Problem::new(status, "An internal error occurred".to_string())
            }
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        match &self {
            RestError::Backend(err) => error!(error = %err, "Search engine request failed"),
            RestError::InternalError { message } => error!(%message, "Internal error"),
            _ => warn!(error = %self, "Request rejected"),
        }

        let status = self.status_code();
        let mut response = (status, Json(self.problem())).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        response
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::Validation(err)
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        RestError::Backend(err)
    }
}

impl From<TaxonomyError> for RestError {
    fn from(err: TaxonomyError) -> Self {
        RestError::InternalError {
            message: err.to_string(),
        }
    }
}

impl From<SearchError> for RestError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation(e) => e.into(),
            SearchError::Backend(e) => e.into(),
            SearchError::Taxonomy(e) => e.into(),
        }
    }
}

impl From<url::ParseError> for RestError {
    fn from(err: url::ParseError) -> Self {
        RestError::InternalError {
            message: format!("Invalid link base: {}", err),
        }
    }
}

impl From<csv::Error> for RestError {
    fn from(err: csv::Error) -> Self {
        RestError::InternalError {
            message: format!("CSV serialization failed: {}", err),
        }
    }
}
