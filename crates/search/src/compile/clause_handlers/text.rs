//! Analysed text clauses.

use serde_json::{Value, json};

/// Matches every term of `value` in `field`.
pub fn match_clause(field: &str, value: &str) -> Value {
    json!({
        "match": {
            field: {
                "query": value,
                "operator": "and"
            }
        }
    })
}

/// Matches every term of `value` in `field`, tolerating typos.
pub fn fuzzy_clause(field: &str, value: &str) -> Value {
    json!({
        "match": {
            field: {
                "query": value,
                "operator": "and",
                "fuzziness": "AUTO"
            }
        }
    })
}
