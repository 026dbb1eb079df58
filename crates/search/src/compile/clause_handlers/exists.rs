//! Field presence clauses.

use serde_json::{Value, json};

use super::{any_of, wrap_nested};
use crate::taxonomy::QueryKey;

/// Matches documents where any target field is present, or, for the value
/// `false`, where none is.
pub fn build_clause(key: &QueryKey, fields: &[&str], value: &str) -> Option<Value> {
    let present = !value.trim().eq_ignore_ascii_case("false");
    let exists = any_of(
        fields
            .iter()
            .map(|field| json!({ "exists": { "field": field } }))
            .collect(),
    )?;
    let exists = wrap_nested(key, exists);

    if present {
        Some(exists)
    } else {
        Some(json!({ "bool": { "must_not": [exists] } }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{SearchOperator, ValueKind};

    static HAS_FILES: QueryKey = QueryKey::new(
        "hasFiles",
        "hasfiles",
        ValueKind::Exists,
        SearchOperator::Exists,
        &["files.id"],
    );

    #[test]
    fn test_exists_true() {
        let clause = build_clause(&HAS_FILES, HAS_FILES.fields, "true").unwrap();
        assert_eq!(clause, json!({ "exists": { "field": "files.id" } }));
    }

    #[test]
    fn test_exists_false_is_negated() {
        let clause = build_clause(&HAS_FILES, HAS_FILES.fields, "FALSE").unwrap();
        assert_eq!(
            clause,
            json!({ "bool": { "must_not": [ { "exists": { "field": "files.id" } } ] } })
        );
    }
}
