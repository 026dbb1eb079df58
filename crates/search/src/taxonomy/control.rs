//! Control keys shared by every document type.
//!
//! These steer pagination, ordering, aggregation and field selection and are
//! stored apart from the search keys. They are resolved after a catalogue's
//! own keys.

use super::key::{QueryKey, ValueKind};

/// Offset of the first hit.
pub const FROM: &str = "from";
/// Page size.
pub const SIZE: &str = "size";
/// Page number, normalised into `from`.
pub const PAGE: &str = "page";
/// Sort expression.
pub const SORT: &str = "sort";
/// Direction applied to sort tokens without one.
pub const SORT_ORDER: &str = "sortOrder";
/// Search-after cursor.
pub const SEARCH_AFTER: &str = "searchAfter";
/// Aggregation selector.
pub const AGGREGATION: &str = "aggregation";
/// Free-text field restriction.
pub const FIELDS: &str = "fields";
/// `_source` includes.
pub const NODES_INCLUDED: &str = "nodesIncluded";
/// `_source` excludes.
pub const NODES_EXCLUDED: &str = "nodesExcluded";

/// Selector value requesting every facet.
pub const AGGREGATION_ALL: &str = "all";
/// Selector value disabling aggregations.
pub const AGGREGATION_NONE: &str = "none";

/// The shared control key table.
pub static CONTROL_KEYS: &[QueryKey] = &[
    QueryKey::control(FROM, "from|offset", ValueKind::Number, r"^\d+$"),
    QueryKey::control(
        SIZE,
        "size|results|perpage|pagesize",
        ValueKind::Number,
        r"^\d+$",
    ),
    QueryKey::control(PAGE, "page", ValueKind::Number, r"^\d+$"),
    QueryKey::control(SORT, "sort|orderby|sortby", ValueKind::Sort, r"(?s)^.+$"),
    QueryKey::control(
        SORT_ORDER,
        "sortorder|order",
        ValueKind::Sort,
        r"(?i)^(asc|desc)$",
    ),
    QueryKey::control(
        SEARCH_AFTER,
        "searchafter",
        ValueKind::Keyword,
        r"^[A-Za-z0-9_-]+$",
    ),
    QueryKey::control(
        AGGREGATION,
        "aggregations?",
        ValueKind::Keyword,
        r"^[A-Za-z]+$",
    ),
    QueryKey::control(FIELDS, "fields|nodessearched", ValueKind::Keyword, r"^[\w.]+$"),
    QueryKey::control(NODES_INCLUDED, "nodesincluded", ValueKind::Keyword, r"^[\w.]+$"),
    QueryKey::control(NODES_EXCLUDED, "nodesexcluded", ValueKind::Keyword, r"^[\w.]+$"),
];

/// Control keys that accept a comma separated list.
pub fn is_list_key(name: &str) -> bool {
    matches!(
        name,
        SORT | AGGREGATION | FIELDS | NODES_INCLUDED | NODES_EXCLUDED
    )
}
