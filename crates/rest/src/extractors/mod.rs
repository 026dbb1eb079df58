//! Axum extractors for search requests.
//!
//! - [`QueryPairs`] - Ordered query-string pairs, repeats kept
//! - [`OrganizationScope`] - Organizations forwarded by the gateway

mod organization;
mod query_pairs;

pub use organization::{OrganizationScope, X_ORGANIZATION_ID};
pub use query_pairs::QueryPairs;
