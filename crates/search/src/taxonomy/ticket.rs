//! Curation ticket taxonomy.

use super::catalogue::CatalogueDefinition;
use super::control::{AGGREGATION, FROM, SIZE, SORT};
use super::facet::FacetDimension;
use super::key::{CustomClause, QueryKey, SearchOperator, ValueKind, WeightedField};
use super::sort::{RELEVANCE, SortDirection, SortKey};
use super::DocumentType;

const ORGANIZATION_PREFIX: &str = "cristin/organization";
const EXCLUDE_SUBUNITS: &str = "excludeSubunits";

static FREE_TEXT: &[WeightedField] = &[
    WeightedField::new("publication.mainTitle", 3.0),
    WeightedField::new("messages.text", 1.5),
    WeightedField::new("owner.firstName", 1.0),
    WeightedField::new("owner.lastName", 1.0),
];

/// Search keys, in resolution order.
pub static KEYS: &[QueryKey] = &[
    QueryKey::custom(
        "query",
        "query|searchall|q",
        CustomClause::WeightedFreeText { fields: FREE_TEXT },
        &[
            "publication.mainTitle",
            "messages.text",
            "owner.firstName",
            "owner.lastName",
        ],
    ),
    QueryKey::new(
        "type",
        "type|tickettype",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["type.keyword"],
    )
    .facet("type"),
    QueryKey::new(
        "status",
        "status|ticketstatus",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["status.keyword"],
    )
    .facet("status"),
    QueryKey::new(
        "statusNot",
        "statusnot",
        ValueKind::Keyword,
        SearchOperator::NotAnyOf,
        &["status.keyword"],
    ),
    QueryKey::new(
        "assignee",
        "assignee",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["assignee.username.keyword"],
    )
    .facet("assignee"),
    QueryKey::new(
        "owner",
        "owner",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["owner.username.keyword"],
    ),
    QueryKey::new(
        "viewedBy",
        "viewedby",
        ValueKind::Keyword,
        SearchOperator::AllOf,
        &["viewedBy.username.keyword"],
    ),
    QueryKey::new(
        "notViewedBy",
        "notviewedby|viewedbynot",
        ValueKind::Keyword,
        SearchOperator::NotAllOf,
        &["viewedBy.username.keyword"],
    ),
    QueryKey::new(
        "finalizedBy",
        "finalizedby",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["finalizedBy.username.keyword"],
    ),
    QueryKey::new(
        "publicationId",
        "publicationid|publicationidentifier",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["publication.id.keyword", "publication.identifier.keyword"],
    )
    .uri("publication")
    .decoded(),
    QueryKey::new(
        "publicationTitle",
        "publicationtitle",
        ValueKind::Text,
        SearchOperator::AllOf,
        &["publication.mainTitle"],
    ),
    QueryKey::new(
        "createdDate",
        "createddate|created",
        ValueKind::Date,
        SearchOperator::Between,
        &["createdDate"],
    ),
    QueryKey::new(
        "modifiedDate",
        "modifieddate|modified",
        ValueKind::Date,
        SearchOperator::Between,
        &["modifiedDate"],
    ),
    QueryKey::custom(
        "organizationId",
        "organizationid|organization|unit",
        CustomClause::Membership {
            exact_field: "organization.id.keyword",
            ancestor_field: "organizationIds.keyword",
            toggle: EXCLUDE_SUBUNITS,
        },
        &["organization.id.keyword", "organizationIds.keyword"],
    )
    .operator(SearchOperator::AnyOf)
    .uri(ORGANIZATION_PREFIX)
    .decoded(),
    QueryKey::new(
        EXCLUDE_SUBUNITS,
        "excludesubunits",
        ValueKind::Flag,
        SearchOperator::None,
        &[],
    ),
    QueryKey::new(
        "hasMessages",
        "hasmessages",
        ValueKind::Exists,
        SearchOperator::Exists,
        &["messages.text"],
    ),
    QueryKey::new(
        "id",
        "id|identifier",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["identifier.keyword", "id.keyword"],
    ),
];

/// Sort keys.
pub static SORT_KEYS: &[SortKey] = &[
    RELEVANCE,
    SortKey::new(
        "createdDate",
        "createddate|created",
        &["createdDate"],
        SortDirection::Descending,
    ),
    SortKey::new(
        "modifiedDate",
        "modifieddate|modified",
        &["modifiedDate"],
        SortDirection::Descending,
    ),
    SortKey::new("status", "status", &["status.keyword"], SortDirection::Ascending),
    SortKey::new("type", "type", &["type.keyword"], SortDirection::Ascending),
];

/// Aggregation dimensions.
pub static FACETS: &[FacetDimension] = &[
    FacetDimension::terms("type", "type", "type.keyword"),
    FacetDimension::terms("status", "status", "status.keyword"),
    FacetDimension::terms("assignee", "assignee", "assignee.username.keyword").size(100),
];

/// The ticket catalogue definition.
pub static TICKETS: CatalogueDefinition = CatalogueDefinition {
    document_type: DocumentType::Ticket,
    keys: KEYS,
    sort_keys: SORT_KEYS,
    facets: FACETS,
    required: &[FROM, SIZE, SORT, AGGREGATION],
    default_size: 15,
    default_sort: "createdDate:desc",
    promotion_key: None,
    identifier_field: "identifier.keyword",
    source_excludes: &["messages.owner"],
};
