//! HTTP request handlers.
//!
//! - [`search`] - Faceted search per document type
//! - [`health`] - Health check endpoint

pub mod health;
pub mod search;

// Re-export handlers for convenience
pub use health::health_handler;
pub use search::{search_import_candidates_handler, search_resources_handler, search_tickets_handler};
