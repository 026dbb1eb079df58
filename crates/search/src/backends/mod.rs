//! Search engine implementations.

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;

#[cfg(feature = "elasticsearch")]
pub use elasticsearch::{ElasticsearchAuth, ElasticsearchConfig, ElasticsearchEngine};
