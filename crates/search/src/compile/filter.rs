//! Access filters.
//!
//! Access restrictions are resolved outside the compiler (gateway headers,
//! document type policy) and embedded as unscored `filter` clauses. A query
//! that was never authorized matches nothing.

use serde_json::{Value, json};

/// Access restrictions resolved for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessFilter {
    clauses: Vec<Value>,
}

impl AccessFilter {
    /// No restriction beyond what the query selects.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Requires `field` to equal `value`.
    pub fn require_term(mut self, field: &str, value: &str) -> Self {
        self.clauses.push(json!({ "term": { field: value } }));
        self
    }

    /// Requires `field` to equal any of `values`.
    ///
    /// An empty set leaves nothing to match.
    pub fn require_any<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        if values.is_empty() {
            self.clauses.push(json!({ "match_none": {} }));
        } else {
            self.clauses.push(json!({ "terms": { field: values } }));
        }
        self
    }

    /// Adds a prebuilt clause.
    pub fn with_clause(mut self, clause: Value) -> Self {
        self.clauses.push(clause);
        self
    }

    /// The clauses, all of which must match.
    pub fn clauses(&self) -> &[Value] {
        &self.clauses
    }
}

/// Access state of a compiled query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FilterState {
    /// Not authorized; matches nothing.
    #[default]
    Deny,
    /// Authorized with the given clauses.
    Allow(Vec<Value>),
}

impl FilterState {
    /// The `filter` clauses of the engine query.
    pub fn render(&self) -> Vec<Value> {
        match self {
            FilterState::Deny => vec![json!({ "match_none": {} })],
            FilterState::Allow(clauses) => clauses.clone(),
        }
    }

    /// Returns true unless the query was authorized.
    pub fn is_denied(&self) -> bool {
        matches!(self, FilterState::Deny)
    }
}

impl From<AccessFilter> for FilterState {
    fn from(filter: AccessFilter) -> Self {
        FilterState::Allow(filter.clauses)
    }
}
