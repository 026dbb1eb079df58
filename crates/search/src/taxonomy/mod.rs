//! Field taxonomies.
//!
//! A taxonomy maps free-form request parameter names onto [`QueryKey`]
//! descriptors and carries the per document type rules the validator and
//! compiler need: required keys and their defaults, sort keys, facets, the
//! identifier field and the promotion key.
//!
//! Every document type is described by a static [`CatalogueDefinition`]
//! table and served through one generic [`Catalogue`], so the validator,
//! compiler and planner are written once against the [`Taxonomy`] trait.
//!
//! # Example
//!
//! ```
//! use scholar_search::taxonomy::{Catalogue, Taxonomy, publication::PUBLICATIONS};
//!
//! let catalogue = Catalogue::new(&PUBLICATIONS, "https://api.example.org").unwrap();
//! assert_eq!(catalogue.resolve("CONTRIBUTOR_NAME").name, "contributorName");
//! assert!(catalogue.resolve("foo").is_invalid());
//! ```

mod catalogue;
pub mod control;
mod facet;
pub mod import_candidate;
mod key;
pub mod publication;
mod sort;
pub mod ticket;

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use catalogue::{Catalogue, CatalogueDefinition};
pub use facet::FacetDimension;
pub use key::{
    CustomClause, INVALID, KeyScope, QueryKey, SearchOperator, ValueEncoding, ValueKind,
    WeightedField,
};
pub use sort::{RELEVANCE, SortDirection, SortDirective, SortKey, SortTaxonomy};

pub(crate) use sort::normalize_name;

/// The document types served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    /// Bibliographic records.
    Publication,
    /// Curation workflow tickets.
    Ticket,
    /// Records harvested from external sources awaiting import.
    ImportCandidate,
}

impl DocumentType {
    /// Returns the canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Publication => "publication",
            DocumentType::Ticket => "ticket",
            DocumentType::ImportCandidate => "importCandidate",
        }
    }

    /// Index holding documents of this type.
    pub fn default_index(&self) -> &'static str {
        match self {
            DocumentType::Publication => "resources",
            DocumentType::Ticket => "tickets",
            DocumentType::ImportCandidate => "import-candidates",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per document type rules.
#[derive(Debug, Clone)]
pub struct TaxonomyRules {
    /// Keys every validated store contains.
    pub required: Vec<&'static str>,
    /// Page size used when `size` is absent.
    pub default_size: u64,
    /// Sort expression used when `sort` is absent.
    pub default_sort: &'static str,
    /// Key whose single value triggers promoted results.
    pub promotion_key: Option<&'static str>,
    /// Unique document identifier; sort tie-breaker and promotion target.
    pub identifier_field: &'static str,
    /// `_source` paths excluded unless explicitly requested.
    pub source_excludes: &'static [&'static str],
    /// Host identifier fragments are expanded against.
    pub api_host: String,
}

impl TaxonomyRules {
    /// Default value of a required key.
    ///
    /// Only the pagination, sort and aggregation keys have one; every other
    /// required key must be supplied by the caller.
    pub fn default_value(&self, name: &str) -> Option<String> {
        match name {
            control::FROM => Some("0".to_string()),
            control::SIZE => Some(self.default_size.to_string()),
            control::SORT => Some(self.default_sort.to_string()),
            control::AGGREGATION => Some(control::AGGREGATION_ALL.to_string()),
            _ => None,
        }
    }

    /// Expands an identifier fragment to a full URI below `prefix`.
    ///
    /// Values that already are URIs are returned unchanged.
    pub fn expand_uri(&self, prefix: &str, value: &str) -> String {
        if value.starts_with("http://") || value.starts_with("https://") {
            value.to_string()
        } else {
            format!(
                "{}/{}/{}",
                self.api_host.trim_end_matches('/'),
                prefix.trim_matches('/'),
                value.trim_start_matches('/')
            )
        }
    }
}

/// The interface the validator, compiler and planner are written against.
pub trait Taxonomy: Send + Sync {
    /// The document type described.
    fn document_type(&self) -> DocumentType;

    /// Resolves a request parameter name, ignoring case, `_` and `-`.
    ///
    /// Search keys are tried before the shared control keys and the first
    /// match wins. Unmatched names resolve to [`INVALID`].
    fn resolve(&self, name: &str) -> &'static QueryKey;

    /// Looks up a key by its canonical name.
    fn key(&self, canonical: &str) -> Option<&'static QueryKey>;

    /// Index fields targeted by a key.
    fn search_fields(&self, key: &QueryKey) -> &'static [&'static str] {
        key.fields
    }

    /// Compiled value pattern of a key.
    fn value_pattern(&self, key: &QueryKey) -> &Regex;

    /// Operator of a key.
    fn operator(&self, key: &QueryKey) -> SearchOperator {
        key.operator
    }

    /// Message describing the accepted value format of a key.
    fn error_message(&self, key: &QueryKey) -> String {
        format!("{} {}", key.name, key.kind.error_message())
    }

    /// The sort keys.
    fn sort_taxonomy(&self) -> &SortTaxonomy;

    /// The aggregation dimensions.
    fn facets(&self) -> &'static [FacetDimension];

    /// The document type rules.
    fn rules(&self) -> &TaxonomyRules;

    /// Canonical names of every resolvable key.
    fn valid_names(&self) -> Vec<&'static str>;

    /// Looks up a facet by name, ignoring case.
    fn facet(&self, name: &str) -> Option<&'static FacetDimension> {
        self.facets()
            .iter()
            .find(|facet| facet.name.eq_ignore_ascii_case(name))
    }
}
