//! Sort keys and sort expression parsing.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TaxonomyError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    /// Ascending order (A-Z, oldest first).
    Ascending,
    /// Descending order (Z-A, newest first).
    #[default]
    Descending,
}

impl SortDirection {
    /// The engine's spelling of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// Parses `asc` or `desc`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Ascending)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Descending)
        } else {
            None
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sortable dimension of a document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// Canonical name.
    pub name: &'static str,
    /// Regex fragment matched against the normalised token name.
    pub name_pattern: &'static str,
    /// Index fields sorted on, in order.
    pub fields: &'static [&'static str],
    /// Direction used when the token carries none.
    pub default_direction: SortDirection,
}

impl SortKey {
    /// Creates a sort key.
    pub const fn new(
        name: &'static str,
        name_pattern: &'static str,
        fields: &'static [&'static str],
        default_direction: SortDirection,
    ) -> Self {
        Self {
            name,
            name_pattern,
            fields,
            default_direction,
        }
    }
}

/// Relevance ordering, shared by every document type.
pub const RELEVANCE: SortKey = SortKey::new(
    "relevance",
    "relevance|score",
    &["_score"],
    SortDirection::Descending,
);

/// One resolved sort token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    /// The resolved sort key.
    pub key: &'static SortKey,
    /// Requested direction.
    pub direction: SortDirection,
}

impl fmt::Display for SortDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key.name, self.direction)
    }
}

/// Compiled sort key table of one document type.
#[derive(Debug)]
pub struct SortTaxonomy {
    keys: Vec<(Regex, &'static SortKey)>,
}

impl SortTaxonomy {
    /// Compiles the name patterns of `keys`.
    pub fn new(keys: &'static [SortKey]) -> Result<Self, TaxonomyError> {
        let keys = keys
            .iter()
            .map(|key| {
                let regex = anchored(key.name_pattern).map_err(|source| {
                    TaxonomyError::InvalidPattern {
                        key: key.name.to_string(),
                        source,
                    }
                })?;
                Ok((regex, key))
            })
            .collect::<Result<Vec<_>, TaxonomyError>>()?;
        Ok(Self { keys })
    }

    /// Resolves a token name, ignoring case, `_` and `-`.
    pub fn resolve(&self, name: &str) -> Option<&'static SortKey> {
        let normalized = normalize_name(name);
        self.keys
            .iter()
            .find(|(regex, _)| regex.is_match(&normalized))
            .map(|(_, key)| *key)
    }

    /// Canonical names of every sort key.
    pub fn valid_names(&self) -> Vec<&'static str> {
        self.keys.iter().map(|(_, key)| key.name).collect()
    }

    /// Parses a comma separated sort expression.
    ///
    /// Each token is `name[:direction]`. `fallback` is applied to tokens
    /// without a direction before the key default. On failure every offending
    /// token is returned.
    pub fn parse(
        &self,
        expression: &str,
        fallback: Option<SortDirection>,
    ) -> Result<Vec<SortDirective>, Vec<String>> {
        let mut directives = Vec::new();
        let mut invalid = Vec::new();

        for token in expression.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match self.parse_token(token, fallback) {
                Some(directive) => directives.push(directive),
                None => invalid.push(token.to_string()),
            }
        }

        if invalid.is_empty() {
            Ok(directives)
        } else {
            Err(invalid)
        }
    }

    fn parse_token(&self, token: &str, fallback: Option<SortDirection>) -> Option<SortDirective> {
        let mut parts = token.split(':');
        let name = parts.next()?.trim();
        let direction = match parts.next() {
            Some(direction) => Some(SortDirection::parse(direction.trim())?),
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }

        let key = self.resolve(name)?;
        Some(SortDirective {
            key,
            direction: direction
                .or(fallback)
                .unwrap_or(key.default_direction),
        })
    }
}

/// Strips `_` and `-` so that `sort_order`, `sort-order` and `sortOrder`
/// resolve alike.
pub(crate) fn normalize_name(name: &str) -> String {
    name.chars().filter(|c| *c != '_' && *c != '-').collect()
}

pub(crate) fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i)^(?:{})$", pattern))
}
