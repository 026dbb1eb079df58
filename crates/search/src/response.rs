//! Response assembly.
//!
//! Converts a raw engine response into a [`PagedSearch`] page: total hit
//! count, source documents, navigation links and facet buckets with
//! refinement links.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::compile::CompiledQuery;
use crate::error::BackendError;
use crate::pagination::{PageWindow, Pager};
use crate::taxonomy::{FacetDimension, Taxonomy};

/// JSON-LD context of search result pages.
pub const SEARCH_CONTEXT: &str = "https://api.scholar-search.org/context/search-result.json";

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedSearch {
    /// JSON-LD context.
    #[serde(rename = "@context")]
    pub context: String,
    /// Link to this page.
    pub id: String,
    /// Number of matching documents.
    pub total_hits: u64,
    /// Source documents of the page.
    pub hits: Vec<Value>,
    /// Link to the next offset page.
    pub next_results: Option<String>,
    /// Link to the previous offset page.
    pub previous_results: Option<String>,
    /// Link to the next page through a search-after cursor.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_search_after_results: Option<String>,
    /// Buckets per aggregation dimension.
    pub aggregations: BTreeMap<String, Vec<FacetBucket>>,
    /// Engine processing time in milliseconds.
    pub processing_time: u64,
}

/// A value of an aggregation dimension with its document count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetBucket {
    /// Link refining the current search to this value.
    pub id: Option<String>,
    /// The bucket value.
    pub key: String,
    /// Number of matching documents.
    pub count: u64,
    /// Display labels by language.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct EngineResponse {
    #[serde(default)]
    took: u64,
    hits: EngineHits,
    #[serde(default)]
    aggregations: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EngineHits {
    #[serde(default)]
    total: Option<EngineTotal>,
    #[serde(default)]
    hits: Vec<EngineHit>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EngineTotal {
    Object { value: u64 },
    Count(u64),
}

#[derive(Debug, Deserialize)]
struct EngineHit {
    #[serde(rename = "_source", default)]
    source: Value,
    #[serde(default)]
    sort: Option<Vec<Value>>,
}

/// Assembles result pages for one taxonomy.
pub struct ResponseAssembler<'a, T: Taxonomy + ?Sized> {
    taxonomy: &'a T,
    pager: &'a Pager,
    context: String,
}

impl<'a, T: Taxonomy + ?Sized> ResponseAssembler<'a, T> {
    /// Creates an assembler building links with `pager`.
    pub fn new(taxonomy: &'a T, pager: &'a Pager) -> Self {
        Self {
            taxonomy,
            pager,
            context: SEARCH_CONTEXT.to_string(),
        }
    }

    /// Overrides the JSON-LD context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Assembles the page answering `query` from the raw `response` of the
    /// engine named `backend_name`.
    pub fn assemble(
        &self,
        backend_name: &str,
        query: &CompiledQuery,
        response: Value,
    ) -> Result<PagedSearch, BackendError> {
        let response: EngineResponse =
            serde_json::from_value(response).map_err(|e| BackendError::BadResponse {
                backend_name: backend_name.to_string(),
                status: 200,
                message: format!("Unexpected response shape: {}", e),
            })?;

        let total = match response.hits.total {
            Some(EngineTotal::Object { value }) | Some(EngineTotal::Count(value)) => value,
            None => response.hits.hits.len() as u64,
        };

        let window = PageWindow {
            offset: if query.search_after().is_some() { 0 } else { query.from() },
            size: query.size(),
            total,
        };
        let last_sort = response
            .hits
            .hits
            .last()
            .and_then(|hit| hit.sort.as_deref());
        let links = self
            .pager
            .links(window, response.hits.hits.len(), last_sort);

        let aggregations = response
            .aggregations
            .as_ref()
            .map(|aggregations| self.facets(aggregations))
            .unwrap_or_default();

        debug!(
            document_type = %self.taxonomy.document_type(),
            total,
            hits = response.hits.hits.len(),
            took_ms = response.took,
            "Assembled search page"
        );

        Ok(PagedSearch {
            context: self.context.clone(),
            id: links.self_link.to_string(),
            total_hits: total,
            hits: response.hits.hits.into_iter().map(|hit| hit.source).collect(),
            next_results: links.next.map(String::from),
            previous_results: links.previous.map(String::from),
            next_search_after_results: links.next_search_after.map(String::from),
            aggregations,
            processing_time: response.took,
        })
    }

    fn facets(&self, aggregations: &Value) -> BTreeMap<String, Vec<FacetBucket>> {
        self.taxonomy
            .facets()
            .iter()
            .filter_map(|facet| {
                let buckets = facet_node(facet, aggregations)?.get("buckets")?.as_array()?;
                let buckets = buckets
                    .iter()
                    .filter_map(|bucket| self.bucket(facet, bucket))
                    .collect();
                Some((facet.name.to_string(), buckets))
            })
            .collect()
    }

    fn bucket(&self, facet: &FacetDimension, bucket: &Value) -> Option<FacetBucket> {
        let key = match bucket.get("key")? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        let count = bucket
            .pointer("/parent/documents/value")
            .or_else(|| bucket.pointer("/parent/doc_count"))
            .or_else(|| bucket.get("doc_count"))
            .and_then(Value::as_u64)
            .unwrap_or_default();

        let labels = facet.labels.and_then(|path| labels(bucket, path));

        Some(FacetBucket {
            id: Some(self.pager.refine(facet.key, &key).to_string()),
            key,
            count,
            labels,
        })
    }
}

/// The terms aggregation of a facet inside the filter wrapper.
fn facet_node<'v>(facet: &FacetDimension, aggregations: &'v Value) -> Option<&'v Value> {
    let node = aggregations.get(facet.name)?.get(facet.name)?;
    match facet.nested {
        Some(_) => node.get("values"),
        None => Some(node),
    }
}

/// Reads the label map at `path` of a bucket's first top hit.
fn labels(bucket: &Value, path: &str) -> Option<BTreeMap<String, String>> {
    let mut node = bucket.pointer("/labels/hits/hits/0/_source")?;
    for segment in path.split('.') {
        node = node.get(segment)?;
    }

    let labels: BTreeMap<String, String> = node
        .as_object()?
        .iter()
        .filter_map(|(language, label)| Some((language.clone(), label.as_str()?.to_string())))
        .collect();

    (!labels.is_empty()).then_some(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;

    use crate::compile::QueryCompiler;
    use crate::taxonomy::Catalogue;
    use crate::taxonomy::publication::PUBLICATIONS;
    use crate::validate::Validator;

    fn assemble(pairs: &[(&str, &str)], response: Value) -> PagedSearch {
        let catalogue = Catalogue::new(&PUBLICATIONS, "https://api.test").unwrap();
        let store = Validator::new(&catalogue)
            .validate(pairs.iter().copied())
            .unwrap();
        let query = QueryCompiler::new(&catalogue).compile(&store, &[]);
        let pager = Pager::new(Url::parse("https://api.test/search/resources").unwrap(), &store);
        ResponseAssembler::new(&catalogue, &pager)
            .assemble("test", &query, response)
            .unwrap()
    }

    fn hits(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({ "_source": { "identifier": i }, "sort": [1.5, format!("id{i}")] }))
            .collect()
    }

    #[test]
    fn test_page_links_and_hits() {
        let page = assemble(
            &[("size", "2"), ("from", "0"), ("title", "ocean")],
            json!({
                "took": 7,
                "hits": { "total": { "value": 5, "relation": "eq" }, "hits": hits(2) }
            }),
        );

        assert_eq!(page.total_hits, 5);
        assert_eq!(page.hits.len(), 2);
        assert_eq!(page.processing_time, 7);
        assert!(page.id.contains("from=0"));
        assert!(page.next_results.as_deref().unwrap().contains("from=2"));
        assert!(page.previous_results.is_none());
        assert!(
            page.next_search_after_results
                .as_deref()
                .unwrap()
                .contains("searchAfter=")
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = assemble(
            &[("size", "2"), ("from", "4")],
            json!({ "hits": { "total": { "value": 5 }, "hits": hits(1) } }),
        );
        assert!(page.next_results.is_none());
        assert!(page.next_search_after_results.is_none());
        assert!(page.previous_results.as_deref().unwrap().contains("from=2"));
    }

    #[test]
    fn test_facet_buckets() {
        let page = assemble(
            &[("type", "Book")],
            json!({
                "hits": { "total": 3, "hits": [] },
                "aggregations": {
                    "type": {
                        "doc_count": 3,
                        "type": { "buckets": [ { "key": "Book", "doc_count": 3 } ] }
                    },
                    "topLevelOrganization": {
                        "doc_count": 3,
                        "topLevelOrganization": {
                            "doc_count": 4,
                            "values": {
                                "buckets": [{
                                    "key": "https://api.test/cristin/organization/1",
                                    "doc_count": 4,
                                    "parent": { "doc_count": 3, "documents": { "value": 2 } },
                                    "labels": { "hits": { "hits": [ {
                                        "_source": { "labels": { "en": "University", "nb": "Universitet" } }
                                    } ] } }
                                }]
                            }
                        }
                    }
                }
            }),
        );

        let types = &page.aggregations["type"];
        assert_eq!(types[0].key, "Book");
        assert_eq!(types[0].count, 3);
        assert!(types[0].labels.is_none());
        assert!(types[0].id.as_deref().unwrap().contains("type=Book"));

        let organizations = &page.aggregations["topLevelOrganization"];
        assert_eq!(organizations[0].count, 2);
        let labels = organizations[0].labels.as_ref().unwrap();
        assert_eq!(labels["en"], "University");
    }

    #[test]
    fn test_serialized_shape() {
        let page = assemble(&[], json!({ "hits": { "total": { "value": 0 }, "hits": [] } }));
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["@context"], SEARCH_CONTEXT);
        assert_eq!(value["totalHits"], 0);
        assert!(value["nextResults"].is_null());
        assert!(value.get("nextSearchAfterResults").is_none());
        assert!(value["aggregations"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_bad_response_is_backend_error() {
        let catalogue = Catalogue::new(&PUBLICATIONS, "https://api.test").unwrap();
        let store = Validator::new(&catalogue).validate(Vec::<(&str, &str)>::new()).unwrap();
        let query = QueryCompiler::new(&catalogue).compile(&store, &[]);
        let pager = Pager::new(Url::parse("https://api.test/search/resources").unwrap(), &store);

        let err = ResponseAssembler::new(&catalogue, &pager)
            .assemble("test", &query, json!({ "error": "boom" }))
            .unwrap_err();
        assert!(matches!(err, BackendError::BadResponse { .. }));
    }
}
