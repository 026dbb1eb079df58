//! Per-key clause builders.
//!
//! [`build_key_clause`] is the single dispatch point: bespoke keys go to
//! [`custom`], everything else dispatches on operator, then on value kind.

pub mod custom;
pub mod exists;
pub mod keyword;
pub mod range;
pub mod text;

use serde_json::{Value, json};

use crate::params::ParameterStore;
use crate::taxonomy::{QueryKey, SearchOperator, Taxonomy, ValueKind};

/// Builds the clause of one stored key.
///
/// Returns `None` for keys that produce no clause of their own (flags, keys
/// with the `None` operator, values that reduce to nothing).
pub fn build_key_clause<T: Taxonomy + ?Sized>(
    taxonomy: &T,
    key: &QueryKey,
    value: &str,
    store: &ParameterStore,
) -> Option<Value> {
    if let Some(shape) = key.custom {
        return custom::build_clause(shape, key, value, store);
    }

    let fields = taxonomy.search_fields(key);
    let clause = match taxonomy.operator(key) {
        operator @ (SearchOperator::AllOf
        | SearchOperator::AnyOf
        | SearchOperator::NotAllOf
        | SearchOperator::NotAnyOf) => {
            let clauses = key
                .elements(value)
                .into_iter()
                .filter(|element| !element.is_empty())
                .filter_map(|element| value_clause(key, fields, element))
                .map(|clause| wrap_nested(key, clause))
                .collect();
            combine(operator, clauses)?
        }
        SearchOperator::Between => wrap_nested(key, range::between(fields, value)?),
        SearchOperator::GreaterOrEqual => wrap_nested(key, range::bound(fields, "gte", value)?),
        SearchOperator::LessThan => wrap_nested(key, range::bound(fields, "lt", value)?),
        SearchOperator::Exists => exists::build_clause(key, fields, value)?,
        SearchOperator::None => return None,
    };

    Some(apply_boost(key, clause))
}

/// Builds the clause matching one value element over every target field.
fn value_clause(key: &QueryKey, fields: &[&str], value: &str) -> Option<Value> {
    let per_field: Vec<Value> = fields
        .iter()
        .filter_map(|field| match key.kind {
            ValueKind::Text => Some(text::match_clause(field, value)),
            ValueKind::FuzzyText => Some(text::fuzzy_clause(field, value)),
            ValueKind::Keyword | ValueKind::Number | ValueKind::Date => {
                Some(keyword::term_clause(field, value))
            }
            ValueKind::Boolean => Some(keyword::term_clause(field, &value.to_lowercase())),
            ValueKind::FuzzyKeyword => Some(keyword::fuzzy_keyword_clause(field, value)),
            ValueKind::Flag
            | ValueKind::Exists
            | ValueKind::Sort
            | ValueKind::Custom
            | ValueKind::Invalid => None,
        })
        .collect();

    any_of(per_field)
}

/// Combines per-value clauses with a set operator.
pub fn combine(operator: SearchOperator, clauses: Vec<Value>) -> Option<Value> {
    if clauses.is_empty() {
        return None;
    }

    match operator {
        SearchOperator::AnyOf => any_of(clauses),
        SearchOperator::NotAllOf => Some(json!({
            "bool": { "must_not": [ { "bool": { "must": clauses } } ] }
        })),
        SearchOperator::NotAnyOf => Some(json!({
            "bool": { "must_not": clauses }
        })),
        _ => all_of(clauses),
    }
}

/// Clauses that must all match.
pub fn all_of(mut clauses: Vec<Value>) -> Option<Value> {
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(json!({ "bool": { "must": clauses } })),
    }
}

/// Clauses of which at least one must match.
pub fn any_of(mut clauses: Vec<Value>) -> Option<Value> {
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(json!({
            "bool": {
                "should": clauses,
                "minimum_should_match": 1
            }
        })),
    }
}

/// Wraps a clause in a nested query when the key lives in a nested object.
pub fn wrap_nested(key: &QueryKey, clause: Value) -> Value {
    match key.nested {
        Some(path) => json!({
            "nested": {
                "path": path,
                "query": clause
            }
        }),
        None => clause,
    }
}

fn apply_boost(key: &QueryKey, clause: Value) -> Value {
    if (key.boost - 1.0).abs() < f32::EPSILON {
        clause
    } else {
        json!({
            "bool": {
                "must": [clause],
                "boost": key.boost
            }
        })
    }
}
