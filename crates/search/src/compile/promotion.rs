//! Promoted results.
//!
//! When a request filters on exactly one value of the taxonomy's promotion
//! key, identifiers curated for that value are boosted to the top of the
//! result list. The lookup happens before compilation and never fails the
//! request.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::engine::PromotionSource;
use crate::params::ParameterStore;
use crate::taxonomy::Taxonomy;

/// Boost difference between consecutive promoted identifiers.
pub const PROMOTION_STEP: f32 = 3.0;

/// The promotion key value of a request, if exactly one is active.
pub fn promotion_subject<'s, T: Taxonomy + ?Sized>(
    taxonomy: &T,
    store: &'s ParameterStore,
) -> Option<&'s str> {
    let name = taxonomy.rules().promotion_key?;
    let values: Vec<&str> = store
        .values(name)
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect();

    match values.as_slice() {
        [single] => Some(single),
        _ => None,
    }
}

/// Looks up promoted identifiers for the request.
///
/// Returns an empty list when the request has no promotion subject, and
/// degrades to an empty list when the source fails or exceeds `timeout`.
pub async fn resolve_promotions<T: Taxonomy + ?Sized>(
    taxonomy: &T,
    store: &ParameterStore,
    source: &dyn PromotionSource,
    timeout: Duration,
) -> Vec<String> {
    let Some(subject) = promotion_subject(taxonomy, store) else {
        return Vec::new();
    };

    match tokio::time::timeout(timeout, source.promoted(subject)).await {
        Ok(Ok(promoted)) => {
            debug!(subject, count = promoted.len(), "Resolved promoted results");
            promoted
        }
        Ok(Err(e)) => {
            warn!(subject, error = %e, "Promotion lookup failed, continuing without promotions");
            Vec::new()
        }
        Err(_) => {
            warn!(
                subject,
                timeout_ms = timeout.as_millis() as u64,
                "Promotion lookup timed out, continuing without promotions"
            );
            Vec::new()
        }
    }
}

/// Boosted identifier clauses, strictly decreasing in list order.
pub fn promotion_clauses(identifier_field: &str, promoted: &[String]) -> Vec<Value> {
    let count = promoted.len();
    promoted
        .iter()
        .enumerate()
        .map(|(index, id)| {
            json!({
                "term": {
                    identifier_field: {
                        "value": id,
                        "boost": (count - index) as f32 * PROMOTION_STEP
                    }
                }
            })
        })
        .collect()
}
