//! Collaborator traits.
//!
//! The core never performs I/O itself. Searches go through a [`SearchEngine`]
//! and promoted identifiers come from a [`PromotionSource`]; both are built
//! once at startup and shared across requests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;

/// A search engine accepting query DSL request bodies.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Executes `body` against `index` and returns the raw response.
    async fn search(&self, index: &str, body: &Value) -> Result<Value, BackendError>;
}

/// Supplies curated identifiers to boost for a promotion subject.
#[async_trait]
pub trait PromotionSource: Send + Sync {
    /// Identifiers promoted for `subject`, most important first.
    async fn promoted(&self, subject: &str) -> Result<Vec<String>, BackendError>;
}

/// A promotion source that never promotes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPromotions;

#[async_trait]
impl PromotionSource for NoPromotions {
    async fn promoted(&self, _subject: &str) -> Result<Vec<String>, BackendError> {
        Ok(Vec::new())
    }
}

/// A fixed promotion table, loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticPromotions {
    entries: HashMap<String, Vec<String>>,
}

impl StaticPromotions {
    /// Adds the promoted identifiers of one subject.
    pub fn with(mut self, subject: impl Into<String>, promoted: Vec<String>) -> Self {
        self.entries.insert(subject.into(), promoted);
        self
    }

    /// Number of subjects with promotions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no subject has promotions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for StaticPromotions {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PromotionSource for StaticPromotions {
    async fn promoted(&self, subject: &str) -> Result<Vec<String>, BackendError> {
        Ok(self.entries.get(subject).cloned().unwrap_or_default())
    }
}
