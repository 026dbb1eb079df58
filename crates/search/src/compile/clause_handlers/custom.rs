//! Bespoke clause shapes.

use serde_json::{Value, json};

use super::{combine, wrap_nested};
use crate::params::ParameterStore;
use crate::taxonomy::{CustomClause, QueryKey, WeightedField};

/// Terms of a free-text value driving the cross-field match.
const CROSS_FIELD_TERMS: usize = 5;
/// Terms of a free-text value driving the phrase boosts.
const PHRASE_TERMS: usize = 10;
/// Fields receiving a phrase boost.
const PHRASE_FIELDS: usize = 2;

/// Builds the clause of a key with a bespoke shape.
pub fn build_clause(
    shape: CustomClause,
    key: &QueryKey,
    value: &str,
    store: &ParameterStore,
) -> Option<Value> {
    match shape {
        CustomClause::WeightedFreeText { fields } => {
            free_text(fields, value, &store.searched_fields())
        }
        CustomClause::NestedPair => {
            let clauses = per_element(key, value, |element| nested_pair(key, element));
            combine(key.operator, clauses)
        }
        CustomClause::TypedIdentifier {
            type_field,
            type_value,
        } => {
            let field = key.fields.first()?;
            let clauses = per_element(key, value, |element| {
                Some(json!({
                    "bool": {
                        "must": [
                            { "term": { type_field: type_value } },
                            { "term": { *field: element } }
                        ]
                    }
                }))
            });
            combine(key.operator, clauses)
        }
        CustomClause::Membership {
            exact_field,
            ancestor_field,
            toggle,
        } => {
            let field = if store.flag(toggle) {
                exact_field
            } else {
                ancestor_field
            };
            let clauses = per_element(key, value, |element| {
                Some(json!({ "term": { field: element } }))
            });
            combine(key.operator, clauses)
        }
    }
}

/// Applies `build` to every non-empty element and wraps each result in the
/// key's nested path.
fn per_element<F>(key: &QueryKey, value: &str, build: F) -> Vec<Value>
where
    F: Fn(&str) -> Option<Value>,
{
    key.elements(value)
        .into_iter()
        .filter(|element| !element.is_empty())
        .filter_map(build)
        .map(|clause| wrap_nested(key, clause))
        .collect()
}

fn nested_pair(key: &QueryKey, element: &str) -> Option<Value> {
    let (first, second) = element.split_once(':')?;
    let first_field = key.fields.first()?;

    let mut must = vec![json!({ "term": { *first_field: first.trim() } })];
    if let Some(sub_key) = key.sub_key {
        if !second.trim().is_empty() {
            must.push(json!({ "term": { sub_key: second.trim() } }));
        }
    }
    Some(json!({ "bool": { "must": must } }))
}

/// Free text across weighted fields.
///
/// The first five terms must all appear across the searched fields; the first
/// ten, as a phrase, boost documents where they appear in the two strongest
/// fields. `*` matches everything.
fn free_text(fields: &[WeightedField], value: &str, restrict_to: &[&str]) -> Option<Value> {
    let value = value.trim();
    if value == "*" {
        return Some(json!({ "match_all": {} }));
    }

    let terms: Vec<&str> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .collect();
    if terms.is_empty() {
        return None;
    }

    let selected = select_fields(fields, restrict_to);

    let cross_fields = json!({
        "multi_match": {
            "query": terms.iter().take(CROSS_FIELD_TERMS).copied().collect::<Vec<_>>().join(" "),
            "fields": selected
                .iter()
                .map(|field| format!("{}^{}", field.path, field.boost))
                .collect::<Vec<_>>(),
            "type": "cross_fields",
            "operator": "and"
        }
    });

    let mut strongest = selected.clone();
    strongest.sort_by(|a, b| b.boost.total_cmp(&a.boost));
    let phrase = terms.iter().take(PHRASE_TERMS).copied().collect::<Vec<_>>().join(" ");
    let phrase_boosts: Vec<Value> = strongest
        .iter()
        .take(PHRASE_FIELDS)
        .map(|field| {
            json!({
                "match_phrase": {
                    field.path: {
                        "query": phrase,
                        "boost": field.boost
                    }
                }
            })
        })
        .collect();

    Some(json!({
        "bool": {
            "must": [cross_fields],
            "should": phrase_boosts
        }
    }))
}

/// The weighted fields named by the `fields` control key, or all of them.
fn select_fields(fields: &[WeightedField], restrict_to: &[&str]) -> Vec<WeightedField> {
    let restricted: Vec<WeightedField> = fields
        .iter()
        .filter(|field| {
            restrict_to.iter().any(|wanted| {
                let wanted = wanted.to_ascii_lowercase();
                let path = field.path.to_ascii_lowercase();
                path == wanted
                    || path.starts_with(&format!("{}.", wanted))
                    || path.ends_with(&format!(".{}", wanted))
            })
        })
        .copied()
        .collect();

    if restricted.is_empty() || restrict_to.iter().any(|f| f.eq_ignore_ascii_case("all")) {
        fields.to_vec()
    } else {
        restricted
    }
}
