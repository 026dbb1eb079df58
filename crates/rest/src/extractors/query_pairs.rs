//! Raw query-string extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

/// The decoded `(name, value)` pairs of the request query string.
///
/// Unlike [`axum::extract::Query`], order and repeated names are kept: the
/// validator merges repeats and the pager rebuilds links from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs(pub Vec<(String, String)>);

impl QueryPairs {
    /// Parses a raw (still percent-encoded) query string.
    pub fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// Returns the pairs as string slices.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the query string was empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.uri.query().map(Self::parse).unwrap_or_default())
    }
}
