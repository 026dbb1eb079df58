//! Cross-filtered facet aggregations.
//!
//! Every requested [`FacetDimension`] becomes one subtree wrapped in a
//! `filter` aggregation. The wrapper holds the clauses of every *other*
//! active facet-bound key, so a facet's counts reflect all applied
//! refinements except its own. Selecting a value in one facet therefore
//! never collapses that facet to a single bucket.

use serde_json::{Map, Value, json};

use crate::taxonomy::FacetDimension;
use crate::taxonomy::control::{AGGREGATION_ALL, AGGREGATION_NONE};

/// Which facets a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationSelection {
    /// No aggregations.
    None,
    /// Every facet of the document type.
    All,
    /// The named facets.
    Only(Vec<String>),
}

impl AggregationSelection {
    /// Parses the `aggregation` control value.
    pub fn parse(value: &str) -> Self {
        let names: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case(AGGREGATION_NONE)) {
            AggregationSelection::None
        } else if names.iter().any(|n| n.eq_ignore_ascii_case(AGGREGATION_ALL)) {
            AggregationSelection::All
        } else {
            AggregationSelection::Only(names.into_iter().map(str::to_string).collect())
        }
    }

    /// Returns true if `facet` is selected.
    pub fn includes(&self, facet: &FacetDimension) -> bool {
        match self {
            AggregationSelection::None => false,
            AggregationSelection::All => true,
            AggregationSelection::Only(names) => {
                names.iter().any(|name| name.eq_ignore_ascii_case(facet.name))
            }
        }
    }
}

/// A compiled clause of a facet-bound key.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetFilter {
    /// Dimension the clause refines.
    pub facet: &'static str,
    /// The compiled clause.
    pub clause: Value,
}

/// Builds the aggregation tree of a request.
pub struct AggregationPlanner<'a> {
    facets: &'a [FacetDimension],
    identifier_field: &'a str,
}

impl<'a> AggregationPlanner<'a> {
    /// Creates a planner over the facets of one document type.
    pub fn new(facets: &'a [FacetDimension], identifier_field: &'a str) -> Self {
        Self {
            facets,
            identifier_field,
        }
    }

    /// Plans the aggregations for `selection` given the active facet filters.
    ///
    /// Returns `None` when nothing is selected.
    pub fn plan(&self, selection: &AggregationSelection, active: &[FacetFilter]) -> Option<Value> {
        let mut aggregations = Map::new();

        for facet in self.facets.iter().filter(|facet| selection.includes(facet)) {
            aggregations.insert(
                facet.name.to_string(),
                json!({
                    "filter": cross_filter(facet, active),
                    "aggs": { facet.name: self.subtree(facet) }
                }),
            );
        }

        if aggregations.is_empty() {
            None
        } else {
            Some(Value::Object(aggregations))
        }
    }

    /// Builds the unfiltered subtree of one dimension.
    pub fn subtree(&self, facet: &FacetDimension) -> Value {
        let mut terms = json!({
            "terms": {
                "field": facet.field,
                "size": facet.size
            }
        });

        let mut sub = Map::new();
        if let Some(labels) = facet.labels_source() {
            sub.insert(
                "labels".to_string(),
                json!({
                    "top_hits": {
                        "size": 1,
                        "_source": { "includes": [labels] }
                    }
                }),
            );
        }
        if facet.parent_count && facet.nested.is_some() {
            sub.insert(
                "parent".to_string(),
                json!({
                    "reverse_nested": {},
                    "aggs": {
                        "documents": {
                            "cardinality": { "field": self.identifier_field }
                        }
                    }
                }),
            );
        }
        if !sub.is_empty() {
            terms["aggs"] = Value::Object(sub);
        }

        match facet.nested {
            Some(path) => json!({
                "nested": { "path": path },
                "aggs": { "values": terms }
            }),
            None => terms,
        }
    }
}

/// The clauses of every active facet filter except the facet's own.
fn cross_filter(facet: &FacetDimension, active: &[FacetFilter]) -> Value {
    let others: Vec<&Value> = active
        .iter()
        .filter(|filter| filter.facet != facet.name)
        .map(|filter| &filter.clause)
        .collect();

    if others.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "bool": { "must": others } })
    }
}
