//! Range clauses for numbers and dates.

use serde_json::{Map, Value, json};

use super::any_of;

/// Inclusive range from a `lower:upper` pair.
///
/// Either side may be empty. A value without a delimiter matches exactly.
pub fn between(fields: &[&str], value: &str) -> Option<Value> {
    let (lower, upper) = match value.split_once(':') {
        Some((lower, upper)) => (lower.trim(), upper.trim()),
        None => (value.trim(), value.trim()),
    };

    let mut bounds = Map::new();
    if !lower.is_empty() {
        bounds.insert("gte".to_string(), json!(lower));
    }
    if !upper.is_empty() {
        bounds.insert("lte".to_string(), json!(upper));
    }
    if bounds.is_empty() {
        return None;
    }
    over_fields(fields, bounds)
}

/// Open range with a single bound (`gte`, `lt`, ...).
pub fn bound(fields: &[&str], operator: &str, value: &str) -> Option<Value> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let mut bounds = Map::new();
    bounds.insert(operator.to_string(), json!(value));
    over_fields(fields, bounds)
}

fn over_fields(fields: &[&str], bounds: Map<String, Value>) -> Option<Value> {
    any_of(
        fields
            .iter()
            .map(|field| json!({ "range": { *field: bounds.clone() } }))
            .collect(),
    )
}
