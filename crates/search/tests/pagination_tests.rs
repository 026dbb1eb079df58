//! Links and cursors of assembled pages.

mod common;

use common::*;
use scholar_search::{Pager, QueryCompiler, ResponseAssembler, SearchAfterCursor};
use serde_json::json;
use url::Url;

fn page(pairs: &[(&str, &str)], total: u64, count: usize) -> scholar_search::PagedSearch {
    let catalogue = publications();
    let store = validate(&catalogue, pairs).unwrap();
    let query = QueryCompiler::new(&catalogue).compile(&store, &[]);
    let pager = Pager::new(Url::parse(RESOURCES_URL).unwrap(), &store);
    ResponseAssembler::new(&catalogue, &pager)
        .assemble("test", &query, engine_response(total, count))
        .unwrap()
}

#[test]
fn test_worked_example_links() {
    let page = page(
        &[("size", "2"), ("from", "0"), ("title", "ocean"), ("sort", "publishedDate:desc")],
        5,
        2,
    );

    assert_eq!(page.total_hits, 5);
    let next = page.next_results.as_deref().unwrap();
    assert_eq!(query_value(next, "from").as_deref(), Some("2"));
    assert_eq!(query_value(next, "title").as_deref(), Some("ocean"));
    assert!(page.previous_results.is_none());
}

/// Re-validates the query of `link` the way a following request would.
fn follow(link: &str) -> scholar_search::ParameterStore {
    let pairs: Vec<(String, String)> = Url::parse(link)
        .unwrap()
        .query_pairs()
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    let borrowed: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    validate(&publications(), &borrowed).unwrap()
}

fn assert_self_link_round_trips(pairs: &[(&str, &str)]) {
    let original = validate(&publications(), pairs).unwrap();
    let first = page(pairs, 100, 5);
    assert_eq!(
        original.to_query_pairs(),
        follow(&first.id).to_query_pairs(),
        "{pairs:?}"
    );
}

#[test]
fn test_self_link_round_trips() {
    assert_self_link_round_trips(&[("title", "ocean"), ("type", "Book"), ("size", "5")]);
}

#[test]
fn test_self_link_round_trips_normalized_values() {
    assert_self_link_round_trips(&[("publishedSince", "2020"), ("size", "5")]);
    assert_self_link_round_trips(&[("publishedBetween", "2019:2020-02")]);
    assert_self_link_round_trips(&[("contributor", "1234"), ("size", "5")]);
    assert_self_link_round_trips(&[("page", "2"), ("size", "5")]);
    assert_self_link_round_trips(&[("sort", "title"), ("sortOrder", "asc")]);
}

#[test]
fn test_self_link_carries_normalized_values() {
    let first = page(
        &[
            ("publishedSince", "2020"),
            ("contributor", "1234"),
            ("page", "2"),
            ("size", "5"),
            ("sort", "title"),
            ("sortOrder", "asc"),
        ],
        100,
        5,
    );
    assert_eq!(query_value(&first.id, "publishedSince").as_deref(), Some("2020-01-01"));
    assert_eq!(
        query_value(&first.id, "contributor").as_deref(),
        Some("https://api.test/cristin/person/1234")
    );
    assert_eq!(query_value(&first.id, "from").as_deref(), Some("10"));
    assert!(query_value(&first.id, "page").is_none());
    assert_eq!(query_value(&first.id, "sort").as_deref(), Some("title:asc"));
    assert!(query_value(&first.id, "sortOrder").is_none());
}

#[test]
fn test_boundaries() {
    let middle = page(&[("size", "10"), ("from", "10")], 30, 10);
    assert!(middle.previous_results.is_some());
    assert!(middle.next_results.is_some());

    let last = page(&[("size", "10"), ("from", "20")], 30, 10);
    assert!(last.next_results.is_none());
    assert!(last.next_search_after_results.is_none());

    let partial = page(&[("size", "10"), ("from", "5")], 30, 10);
    assert!(partial.previous_results.is_none());
}

#[test]
fn test_search_after_link_carries_cursor() {
    let page = page(&[("size", "2")], 10, 2);
    let link = page.next_search_after_results.unwrap();
    assert!(query_value(&link, "from").is_none());

    let cursor = query_value(&link, "searchAfter").unwrap();
    let decoded = SearchAfterCursor::decode(&cursor).unwrap();
    assert_eq!(decoded.sort_values()[1], "doc-1");
}

#[test]
fn test_search_after_page_continues_only_through_cursor() {
    let cursor = SearchAfterCursor::new(vec![json!(1.0), json!("doc-1")]).encode();
    let second = page(&[("size", "2"), ("searchAfter", cursor.as_str())], 10, 2);

    assert!(second.next_results.is_none());
    assert!(second.previous_results.is_none());
    assert!(query_value(&second.id, "from").is_none());
    assert_eq!(query_value(&second.id, "searchAfter").as_deref(), Some(cursor.as_str()));

    let catalogue = publications();
    let link = second.next_search_after_results.unwrap();
    let query = QueryCompiler::new(&catalogue).compile(&follow(&link), &[]);
    let body = query.to_request_body();
    assert!(body.get("from").is_none());
    assert_eq!(body["search_after"], json!([1.0, "doc-1"]));
}

#[test]
fn test_search_after_self_link_round_trips() {
    let cursor = SearchAfterCursor::new(vec![json!(2.5), json!("doc-7")]).encode();
    let pairs = [("size", "5"), ("searchAfter", cursor.as_str())];
    let original = validate(&publications(), &pairs).unwrap();
    let current = page(&pairs, 100, 5);
    let reparsed = follow(&current.id);
    assert_eq!(reparsed.get("searchAfter"), original.get("searchAfter"));
    assert_eq!(reparsed.size(), original.size());
}
