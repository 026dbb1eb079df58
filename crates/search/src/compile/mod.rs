//! Query compilation.
//!
//! Translates a validated [`ParameterStore`] into engine query DSL.
//!
//! Each search key compiles to at most one clause through
//! [`clause_handlers::build_key_clause`]. Clauses of keys bound to an
//! aggregation dimension go to `post_filter` so that the planner can
//! cross-filter facets; all others are scored `must` clauses. Access
//! restrictions live in a separate unscored `filter` context that matches
//! nothing until [`CompiledQuery::authorize`] is called.

pub mod clause_handlers;
pub mod filter;
pub mod promotion;
pub mod sort;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::aggregation::{AggregationPlanner, FacetFilter};
use crate::pagination::SearchAfterCursor;
use crate::params::ParameterStore;
use crate::taxonomy::{DocumentType, SortDirective, Taxonomy};

pub use filter::{AccessFilter, FilterState};
pub use promotion::{PROMOTION_STEP, promotion_clauses, promotion_subject, resolve_promotions};

/// A compiled, engine-ready query.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    document_type: DocumentType,
    must: Vec<Value>,
    should: Vec<Value>,
    post_filter: Vec<Value>,
    facet_filters: Vec<FacetFilter>,
    filter: FilterState,
    aggregations: Option<Value>,
    sort: Value,
    from: u64,
    size: u64,
    search_after: Option<Vec<Value>>,
    source_includes: Vec<String>,
    source_excludes: Vec<String>,
}

impl CompiledQuery {
    /// Replaces the access filter with the resolved restrictions.
    pub fn authorize(mut self, access: AccessFilter) -> Self {
        self.filter = FilterState::from(access);
        self
    }

    /// The document type the query targets.
    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// Scored clauses.
    pub fn must(&self) -> &[Value] {
        &self.must
    }

    /// Promotion clauses.
    pub fn should(&self) -> &[Value] {
        &self.should
    }

    /// Clauses of facet-bound keys.
    pub fn post_filter(&self) -> &[Value] {
        &self.post_filter
    }

    /// Facet-bound clauses keyed by dimension.
    pub fn facet_filters(&self) -> &[FacetFilter] {
        &self.facet_filters
    }

    /// The access filter state.
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// The aggregation tree, if any facet was requested.
    pub fn aggregations(&self) -> Option<&Value> {
        self.aggregations.as_ref()
    }

    /// The ordered sort list.
    pub fn sort(&self) -> &Value {
        &self.sort
    }

    /// Offset of the first hit.
    pub fn from(&self) -> u64 {
        self.from
    }

    /// Page size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Sort values to continue after.
    pub fn search_after(&self) -> Option<&[Value]> {
        self.search_after.as_deref()
    }

    /// Renders the engine request body.
    pub fn to_request_body(&self) -> Value {
        let mut bool_query = Map::new();
        bool_query.insert("filter".to_string(), json!(self.filter.render()));
        if !self.must.is_empty() {
            bool_query.insert("must".to_string(), json!(self.must));
        }
        if !self.should.is_empty() {
            bool_query.insert("should".to_string(), json!(self.should));
            bool_query.insert("minimum_should_match".to_string(), json!(0));
        }

        let mut body = json!({
            "query": { "bool": Value::Object(bool_query) },
            "sort": self.sort,
            "size": self.size,
            "track_total_hits": true,
        });

        match &self.search_after {
            Some(values) => body["search_after"] = json!(values),
            None => body["from"] = json!(self.from),
        }

        if !self.post_filter.is_empty() {
            body["post_filter"] = json!({ "bool": { "must": self.post_filter } });
        }

        if let Some(aggregations) = &self.aggregations {
            body["aggs"] = aggregations.clone();
        }

        if !self.source_includes.is_empty() || !self.source_excludes.is_empty() {
            let mut source = Map::new();
            if !self.source_includes.is_empty() {
                source.insert("includes".to_string(), json!(self.source_includes));
            }
            if !self.source_excludes.is_empty() {
                source.insert("excludes".to_string(), json!(self.source_excludes));
            }
            body["_source"] = Value::Object(source);
        }

        body
    }
}

/// Compiles validated stores for one taxonomy.
pub struct QueryCompiler<'t, T: Taxonomy + ?Sized> {
    taxonomy: &'t T,
}

impl<'t, T: Taxonomy + ?Sized> QueryCompiler<'t, T> {
    /// Creates a compiler.
    pub fn new(taxonomy: &'t T) -> Self {
        Self { taxonomy }
    }

    /// Compiles a validated store.
    ///
    /// `promoted` lists identifiers resolved through
    /// [`resolve_promotions`]; they only take effect when the store still
    /// holds exactly one value of the promotion key.
    pub fn compile(&self, store: &ParameterStore, promoted: &[String]) -> CompiledQuery {
        let rules = self.taxonomy.rules();
        let mut must = Vec::new();
        let mut post_filter = Vec::new();
        let mut facet_filters = Vec::new();

        for entry in store.search_entries() {
            let Some(clause) =
                clause_handlers::build_key_clause(self.taxonomy, entry.key, &entry.value, store)
            else {
                continue;
            };

            match entry.key.facet.filter(|name| self.taxonomy.facet(name).is_some()) {
                Some(facet) => {
                    post_filter.push(clause.clone());
                    facet_filters.push(FacetFilter { facet, clause });
                }
                None => must.push(clause),
            }
        }

        let aggregations = AggregationPlanner::new(self.taxonomy.facets(), rules.identifier_field)
            .plan(&store.aggregation(), &facet_filters);

        let promotions = match promotion_subject(self.taxonomy, store) {
            Some(_) => promotion_clauses(rules.identifier_field, promoted),
            None => Vec::new(),
        };

        let sort = if promotions.is_empty() {
            sort::build_sort(&self.directives(store), rules.identifier_field)
        } else {
            sort::relevance_sort(rules.identifier_field)
        };

        let search_after = store
            .search_after()
            .and_then(|cursor| SearchAfterCursor::decode(cursor).ok())
            .map(|cursor| cursor.sort_values().to_vec());

        let source_includes: Vec<String> = store
            .included_nodes()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut source_excludes: Vec<String> = store
            .excluded_nodes()
            .into_iter()
            .map(str::to_string)
            .collect();
        for path in rules.source_excludes {
            let requested = source_includes.iter().any(|include| include == path);
            if !requested && !source_excludes.iter().any(|exclude| exclude == path) {
                source_excludes.push(path.to_string());
            }
        }

        debug!(
            document_type = %self.taxonomy.document_type(),
            must = must.len(),
            post_filter = post_filter.len(),
            promoted = promotions.len(),
            "Compiled query"
        );

        CompiledQuery {
            document_type: self.taxonomy.document_type(),
            must,
            should: promotions,
            post_filter,
            facet_filters,
            filter: FilterState::Deny,
            aggregations,
            sort,
            from: store.from(),
            size: store.size(),
            search_after,
            source_includes,
            source_excludes,
        }
    }

    /// Resolves the stored sort expression, falling back to the default.
    fn directives(&self, store: &ParameterStore) -> Vec<SortDirective> {
        let sort_taxonomy = self.taxonomy.sort_taxonomy();
        store
            .sort()
            .and_then(|expression| sort_taxonomy.parse(expression, None).ok())
            .or_else(|| {
                sort_taxonomy
                    .parse(self.taxonomy.rules().default_sort, None)
                    .ok()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Catalogue;
    use crate::taxonomy::publication::PUBLICATIONS;
    use crate::validate::Validator;

    fn catalogue() -> Catalogue {
        Catalogue::new(&PUBLICATIONS, "https://api.test").unwrap()
    }

    fn compile(pairs: &[(&str, &str)], promoted: &[String]) -> CompiledQuery {
        let catalogue = catalogue();
        let store = Validator::new(&catalogue)
            .validate(pairs.iter().copied())
            .unwrap();
        QueryCompiler::new(&catalogue).compile(&store, promoted)
    }

    #[test]
    fn test_unauthorized_query_matches_nothing() {
        let body = compile(&[("title", "ocean")], &[]).to_request_body();
        assert_eq!(body["query"]["bool"]["filter"], json!([{ "match_none": {} }]));
    }

    #[test]
    fn test_authorize_replaces_filter() {
        let query = compile(&[("title", "ocean")], &[])
            .authorize(AccessFilter::unrestricted().require_term("status.keyword", "PUBLISHED"));
        let body = query.to_request_body();
        assert_eq!(
            body["query"]["bool"]["filter"],
            json!([{ "term": { "status.keyword": "PUBLISHED" } }])
        );
    }

    #[test]
    fn test_facet_bound_keys_go_to_post_filter() {
        let query = compile(&[("type", "Book"), ("title", "ocean")], &[]);
        assert_eq!(query.must().len(), 1);
        assert_eq!(query.post_filter().len(), 1);
        assert_eq!(query.facet_filters()[0].facet, "type");

        let aggs = query.aggregations().unwrap();
        assert_eq!(aggs["type"]["filter"], json!({ "match_all": {} }));
        assert_eq!(aggs["license"]["filter"]["bool"]["must"][0], query.post_filter()[0]);
    }

    #[test]
    fn test_pagination_and_defaults() {
        let body = compile(&[("size", "2"), ("from", "4")], &[]).to_request_body();
        assert_eq!(body["size"], 2);
        assert_eq!(body["from"], 4);
        assert_eq!(body["track_total_hits"], true);
        assert_eq!(body["sort"][0]["_score"]["order"], "desc");
        assert_eq!(body["sort"][1]["publishedDate"]["order"], "desc");
        assert_eq!(body["sort"][2]["identifier.keyword"]["order"], "asc");
        assert!(body.get("search_after").is_none());
    }

    #[test]
    fn test_search_after_omits_from() {
        let cursor = SearchAfterCursor::new(vec![json!(1), json!("abc")]).encode();
        let body = compile(&[("searchAfter", cursor.as_str())], &[]).to_request_body();
        assert_eq!(body["search_after"], json!([1, "abc"]));
        assert!(body.get("from").is_none());
    }

    #[test]
    fn test_source_filtering() {
        let body = compile(&[("nodesIncluded", "joinField,identifier")], &[]).to_request_body();
        assert_eq!(body["_source"]["includes"], json!(["joinField", "identifier"]));
        assert_eq!(
            body["_source"]["excludes"],
            json!(["entityDescription.contributors.affiliations.ancestors"])
        );
    }

    #[test]
    fn test_aggregation_none() {
        let body = compile(&[("aggregation", "none")], &[]).to_request_body();
        assert!(body.get("aggs").is_none());
    }

    #[test]
    fn test_promotions_with_single_contributor() {
        let promoted = vec!["a".to_string(), "b".to_string()];
        let query = compile(&[("contributor", "p1"), ("sort", "title")], &promoted);
        let body = query.to_request_body();

        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 2);
        assert_eq!(body["query"]["bool"]["minimum_should_match"], 0);
        assert_eq!(
            should[0]["term"]["identifier.keyword"]["boost"].as_f64().unwrap(),
            f64::from(2.0 * PROMOTION_STEP)
        );
        assert_eq!(body["sort"][0]["_score"]["order"], "desc");
    }

    #[test]
    fn test_promotions_ignored_with_two_contributors() {
        let promoted = vec!["a".to_string()];
        let query = compile(&[("contributor", "p1,p2")], &promoted);
        assert!(query.should().is_empty());
        assert!(query.to_request_body()["query"]["bool"].get("should").is_none());
    }
}
