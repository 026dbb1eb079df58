//! End-to-end query compilation.

mod common;

use common::*;
use scholar_search::{AccessFilter, QueryCompiler, StaticPromotions, resolve_promotions};
use serde_json::json;
use std::time::Duration;

#[test]
fn test_worked_example_request_body() {
    let catalogue = publications();
    let store = validate(
        &catalogue,
        &[("size", "2"), ("from", "0"), ("title", "ocean"), ("sort", "publishedDate:desc")],
    )
    .unwrap();

    let body = QueryCompiler::new(&catalogue)
        .compile(&store, &[])
        .authorize(AccessFilter::unrestricted().require_term("status.keyword", "PUBLISHED"))
        .to_request_body();

    assert_eq!(body["size"], 2);
    assert_eq!(body["from"], 0);
    assert_eq!(
        body["sort"],
        json!([
            { "publishedDate": { "order": "desc", "missing": "_last" } },
            { "identifier.keyword": { "order": "asc" } }
        ])
    );
    let must = body["query"]["bool"]["must"].as_array().unwrap();
    assert_eq!(must.len(), 1);
    assert_eq!(
        must[0]["bool"]["must"][0]["match"]["entityDescription.mainTitle"]["query"],
        "ocean"
    );
    assert_eq!(
        body["query"]["bool"]["filter"],
        json!([{ "term": { "status.keyword": "PUBLISHED" } }])
    );
}

#[test]
fn test_ticket_membership_follows_toggle() {
    let catalogue = tickets();
    let compiler = QueryCompiler::new(&catalogue);

    let store = validate(&catalogue, &[("organizationId", "1.0.0.0")]).unwrap();
    let query = compiler.compile(&store, &[]);
    assert_eq!(
        query.must()[0]["term"]["organizationIds.keyword"],
        "https://api.test/cristin/organization/1.0.0.0"
    );

    let store = validate(
        &catalogue,
        &[("organizationId", "1.0.0.0"), ("excludeSubunits", "true")],
    )
    .unwrap();
    let query = compiler.compile(&store, &[]);
    assert_eq!(query.must().len(), 1);
    assert!(query.must()[0]["term"].get("organization.id.keyword").is_some());
}

#[test]
fn test_import_candidate_typed_identifier() {
    let catalogue = import_candidates();
    let store = validate(&catalogue, &[("scopusIdentifier", "2-s2.0-1")]).unwrap();
    let query = QueryCompiler::new(&catalogue).compile(&store, &[]);

    let nested = &query.must()[0]["nested"];
    assert_eq!(nested["path"], "additionalIdentifiers");
    assert_eq!(
        nested["query"]["bool"]["must"][0]["term"]["additionalIdentifiers.sourceName.keyword"],
        "Scopus"
    );
}

#[test]
fn test_cross_filtered_aggregations() {
    let catalogue = publications();
    let store = validate(&catalogue, &[("type", "Book"), ("license", "CC-BY")]).unwrap();
    let query = QueryCompiler::new(&catalogue).compile(&store, &[]);
    let aggs = query.aggregations().unwrap();

    let type_filter = aggs["type"]["filter"]["bool"]["must"].as_array().unwrap();
    assert_eq!(type_filter.len(), 1);
    assert!(type_filter[0].to_string().contains("CC-BY"));

    let license_filter = aggs["license"]["filter"]["bool"]["must"].as_array().unwrap();
    assert_eq!(license_filter.len(), 1);
    assert!(license_filter[0].to_string().contains("Book"));

    let scientific = aggs["scientificValue"]["filter"]["bool"]["must"].as_array().unwrap();
    assert_eq!(scientific.len(), 2);
}

#[tokio::test]
async fn test_promotions_end_to_end() {
    let catalogue = publications();
    let store = validate(&catalogue, &[("contributor", "1234")]).unwrap();
    let source = StaticPromotions::default().with(
        "https://api.test/cristin/person/1234",
        vec!["first".to_string(), "second".to_string(), "third".to_string()],
    );

    let promoted =
        resolve_promotions(&catalogue, &store, &source, Duration::from_millis(100)).await;
    let body = QueryCompiler::new(&catalogue)
        .compile(&store, &promoted)
        .to_request_body();

    let should = body["query"]["bool"]["should"].as_array().unwrap();
    let boosts: Vec<f64> = should
        .iter()
        .map(|clause| clause["term"]["identifier.keyword"]["boost"].as_f64().unwrap())
        .collect();
    assert_eq!(boosts.len(), 3);
    assert!(boosts[0] > boosts[1] && boosts[1] > boosts[2]);
    assert_eq!(body["sort"][0]["_score"]["order"], "desc");
}

#[tokio::test]
async fn test_no_promotions_for_multiple_contributors() {
    let catalogue = publications();
    let store = validate(&catalogue, &[("contributor", "1"), ("contributor", "2")]).unwrap();
    let source = StaticPromotions::default().with("https://api.test/cristin/person/1", vec![
        "first".to_string(),
    ]);

    let promoted =
        resolve_promotions(&catalogue, &store, &source, Duration::from_millis(100)).await;
    assert!(promoted.is_empty());
    let query = QueryCompiler::new(&catalogue).compile(&store, &promoted);
    assert!(query.should().is_empty());
}
