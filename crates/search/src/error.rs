//! Error types for the search core.
//!
//! Caller errors ([`ValidationError`]) are always raised before any engine
//! call and carry every offending item, so a client can fix a request in one
//! round trip. Engine failures are reported as [`BackendError`]; broken static
//! tables surface as [`TaxonomyError`] at startup.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

/// The primary error type for all search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Request parameter errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Engine errors
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Static table errors
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}

/// Errors in the request parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// One or more parameter names matched no taxonomy entry.
    #[error("unknown parameter(s): {}", .names.join(", "))]
    UnknownParameter {
        names: Vec<String>,
        valid: Vec<String>,
    },

    /// One or more values failed their pattern or a bounds check.
    #[error("invalid value(s): {}", join_issues(.issues))]
    InvalidValue { issues: Vec<ValueIssue> },

    /// Required parameters are absent and have no default.
    #[error("missing required parameter(s): {}", .names.join(", "))]
    MissingRequired { names: Vec<String> },

    /// One or more sort tokens could not be resolved.
    #[error("invalid sort: {}", .tokens.join(", "))]
    InvalidSort {
        tokens: Vec<String>,
        valid: Vec<String>,
    },
}

impl ValidationError {
    /// Stable machine readable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::UnknownParameter { .. } => "UnknownParameter",
            ValidationError::InvalidValue { .. } => "InvalidValue",
            ValidationError::MissingRequired { .. } => "MissingRequired",
            ValidationError::InvalidSort { .. } => "InvalidSort",
        }
    }

    /// Names or tokens the request got wrong.
    pub fn invalid_parameters(&self) -> Vec<String> {
        match self {
            ValidationError::UnknownParameter { names, .. } => names.clone(),
            ValidationError::InvalidValue { issues } => {
                issues.iter().map(ToString::to_string).collect()
            }
            ValidationError::MissingRequired { names } => names.clone(),
            ValidationError::InvalidSort { tokens, .. } => tokens.clone(),
        }
    }

    /// Names that would have been accepted, when the failure class has them.
    pub fn valid_parameters(&self) -> &[String] {
        match self {
            ValidationError::UnknownParameter { valid, .. }
            | ValidationError::InvalidSort { valid, .. } => valid,
            _ => &[],
        }
    }
}

/// A single rejected parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueIssue {
    /// Canonical parameter name.
    pub parameter: String,
    /// The value as received (after decoding).
    pub value: String,
    /// What was expected.
    pub message: String,
}

impl ValueIssue {
    /// Creates a new issue.
    pub fn new(
        parameter: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValueIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}' {}", self.parameter, self.value, self.message)
    }
}

fn join_issues(issues: &[ValueIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors talking to the search engine.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The engine could not be reached.
    #[error("search engine unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// The engine answered with an error status or an unreadable body.
    #[error("bad response from {backend_name} (status {status}): {message}")]
    BadResponse {
        backend_name: String,
        status: u16,
        message: String,
    },

    /// The engine did not answer in time.
    #[error("{backend_name} timed out after {timeout_ms}ms")]
    Timeout {
        backend_name: String,
        timeout_ms: u64,
    },
}

/// Errors in the static taxonomy tables.
#[derive(Error, Debug)]
pub enum TaxonomyError {
    /// A name or value pattern does not compile.
    #[error("invalid pattern for '{key}': {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },

    /// A rule or facet refers to a key the table does not define.
    #[error("{document_type} catalogue refers to undefined key '{key}'")]
    UndefinedKey { document_type: String, key: String },
}

/// Result alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;
