//! Shared helpers for the search core integration tests.

#![allow(dead_code)]

use scholar_search::taxonomy::import_candidate::IMPORT_CANDIDATES;
use scholar_search::taxonomy::publication::PUBLICATIONS;
use scholar_search::taxonomy::ticket::TICKETS;
use scholar_search::{Catalogue, ParameterStore, ValidationError, Validator};
use serde_json::{Value, json};

pub const API_HOST: &str = "https://api.test";
pub const RESOURCES_URL: &str = "https://api.test/search/resources";

pub fn publications() -> Catalogue {
    Catalogue::new(&PUBLICATIONS, API_HOST).expect("publication catalogue")
}

pub fn tickets() -> Catalogue {
    Catalogue::new(&TICKETS, API_HOST).expect("ticket catalogue")
}

pub fn import_candidates() -> Catalogue {
    Catalogue::new(&IMPORT_CANDIDATES, API_HOST).expect("import candidate catalogue")
}

/// Validates `pairs` against `catalogue`.
pub fn validate(
    catalogue: &Catalogue,
    pairs: &[(&str, &str)],
) -> Result<ParameterStore, ValidationError> {
    Validator::new(catalogue).validate(pairs.iter().copied())
}

/// An engine response with `count` hits out of `total`.
pub fn engine_response(total: u64, count: usize) -> Value {
    let hits: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "_id": format!("doc-{i}"),
                "_source": { "identifier": format!("doc-{i}") },
                "sort": [1.0, format!("doc-{i}")]
            })
        })
        .collect();

    json!({
        "took": 3,
        "hits": {
            "total": { "value": total, "relation": "eq" },
            "hits": hits
        }
    })
}

/// Query parameter `name` of a link, if present.
pub fn query_value(link: &str, name: &str) -> Option<String> {
    let url = url::Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.into_owned())
}
