//! Scholar Search query compilation core
//!
//! This crate turns the free-form query strings of a faceted search API into
//! Elasticsearch query DSL and turns engine responses back into paginated
//! result pages. It performs no I/O of its own: the engine and the promotion
//! lookup are collaborators behind the [`SearchEngine`] and
//! [`PromotionSource`] traits.
//!
//! # Pipeline
//!
//! 1. [`taxonomy`] - static key tables per document type, resolved through
//!    a generic [`Catalogue`]
//! 2. [`validate`] - raw `(name, value)` pairs to a typed [`ParameterStore`]
//!    or a [`ValidationError`]
//! 3. [`compile`] - the store to a [`CompiledQuery`] with cross-filtered
//!    [`aggregation`]s and optional promoted results
//! 4. [`response`] - the engine response to a [`PagedSearch`] page with
//!    [`pagination`] links and facet buckets
//!
//! # Backend Features
//!
//! - `elasticsearch` - [`backends::ElasticsearchEngine`] using the official
//!   client crate
//!
//! # Quick Start
//!
//! ```
//! use scholar_search::taxonomy::publication::PUBLICATIONS;
//! use scholar_search::{AccessFilter, Catalogue, QueryCompiler, Validator};
//!
//! let catalogue = Catalogue::new(&PUBLICATIONS, "https://api.example.org").unwrap();
//! let store = Validator::new(&catalogue)
//!     .validate([("title", "ocean"), ("type", "AcademicArticle"), ("size", "10")])
//!     .unwrap();
//!
//! let query = QueryCompiler::new(&catalogue)
//!     .compile(&store, &[])
//!     .authorize(AccessFilter::unrestricted().require_term("status.keyword", "PUBLISHED"));
//!
//! let body = query.to_request_body();
//! assert_eq!(body["size"], 10);
//! assert!(body["post_filter"].is_object());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod aggregation;
pub mod backends;
pub mod compile;
pub mod engine;
pub mod error;
pub mod pagination;
pub mod params;
pub mod response;
pub mod taxonomy;
pub mod validate;

// Re-export commonly used types at crate root
pub use aggregation::{AggregationPlanner, AggregationSelection, FacetFilter};
pub use compile::{AccessFilter, CompiledQuery, FilterState, QueryCompiler, resolve_promotions};
pub use engine::{NoPromotions, PromotionSource, SearchEngine, StaticPromotions};
pub use error::{BackendError, SearchError, SearchResult, TaxonomyError, ValidationError};
pub use pagination::{PageLinks, PageWindow, Pager, SearchAfterCursor};
pub use params::ParameterStore;
pub use response::{FacetBucket, PagedSearch, ResponseAssembler};
pub use taxonomy::{Catalogue, DocumentType, Taxonomy};
pub use validate::{ValidationLimits, Validator};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
