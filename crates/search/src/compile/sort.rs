//! Sort clause building.

use serde_json::{Value, json};

use crate::taxonomy::SortDirective;

const SCORE: &str = "_score";

/// Builds the sort clause for resolved directives.
///
/// Every field of every directive is emitted in order. Field sorts place
/// documents lacking the field last. The identifier is always appended in
/// ascending order as tie-breaker so that search-after cursors are stable.
pub fn build_sort(directives: &[SortDirective], identifier_field: &str) -> Value {
    let mut sort_clauses: Vec<Value> = Vec::new();

    for directive in directives {
        let order = directive.direction.as_str();
        for field in directive.key.fields {
            if *field == SCORE {
                sort_clauses.push(json!({ SCORE: { "order": order } }));
            } else {
                sort_clauses.push(json!({ *field: { "order": order, "missing": "_last" } }));
            }
        }
    }

    let has_tie_breaker = directives
        .iter()
        .any(|directive| directive.key.fields.contains(&identifier_field));
    if !has_tie_breaker {
        sort_clauses.push(json!({ identifier_field: { "order": "asc" } }));
    }

    Value::Array(sort_clauses)
}

/// Relevance ordering used when promoted hits must stay on top.
pub fn relevance_sort(identifier_field: &str) -> Value {
    json!([
        { SCORE: { "order": "desc" } },
        { identifier_field: { "order": "asc" } }
    ])
}
