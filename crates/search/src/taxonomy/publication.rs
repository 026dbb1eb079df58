//! Publication (bibliographic record) taxonomy.

use super::catalogue::CatalogueDefinition;
use super::control::{AGGREGATION, FROM, SIZE, SORT};
use super::facet::FacetDimension;
use super::key::{CustomClause, QueryKey, SearchOperator, ValueKind, WeightedField};
use super::sort::{RELEVANCE, SortDirection, SortKey};
use super::DocumentType;

const CONTRIBUTORS: &str = "entityDescription.contributors";
const CONTRIBUTOR_ID: &str = "entityDescription.contributors.identity.id.keyword";
const CONTRIBUTOR_NAME: &str = "entityDescription.contributors.identity.name";
const INSTANCE_TYPE: &str = "entityDescription.reference.publicationInstance.type.keyword";
const PUBLICATION_YEAR: &str = "entityDescription.publicationDate.year";
const TOP_LEVEL_ORGANIZATIONS: &str = "topLevelOrganizations";
const FUNDINGS: &str = "fundings";
const FUNDING_SOURCE: &str = "fundings.source.identifier.keyword";
const ADDITIONAL_IDENTIFIERS: &str = "additionalIdentifiers";
const IDENTIFIER_SOURCE: &str = "additionalIdentifiers.sourceName.keyword";
const IDENTIFIER_VALUE: &str = "additionalIdentifiers.value.keyword";
const LICENSE: &str = "associatedArtifacts.license.keyword";
const SCIENTIFIC_VALUE: &str = "entityDescription.reference.publicationContext.scientificValue.keyword";

const PERSON_PREFIX: &str = "cristin/person";
const ORGANIZATION_PREFIX: &str = "cristin/organization";

/// Flag selecting exact unit membership.
pub const EXCLUDE_SUBUNITS: &str = "excludeSubunits";

static FREE_TEXT: &[WeightedField] = &[
    WeightedField::new("entityDescription.mainTitle", 3.0),
    WeightedField::new(CONTRIBUTOR_NAME, 2.0),
    WeightedField::new("entityDescription.abstract", 1.5),
    WeightedField::new("entityDescription.description", 1.0),
    WeightedField::new("entityDescription.tags", 1.0),
    WeightedField::new("entityDescription.reference.publicationContext.name", 0.5),
];

/// Search keys, in resolution order.
pub static KEYS: &[QueryKey] = &[
    QueryKey::custom(
        "query",
        "query|searchall|q",
        CustomClause::WeightedFreeText { fields: FREE_TEXT },
        &[
            "entityDescription.mainTitle",
            CONTRIBUTOR_NAME,
            "entityDescription.abstract",
            "entityDescription.description",
            "entityDescription.tags",
            "entityDescription.reference.publicationContext.name",
        ],
    ),
    QueryKey::new(
        "title",
        "title|maintitle",
        ValueKind::Text,
        SearchOperator::AllOf,
        &["entityDescription.mainTitle"],
    )
    .boost(2.0),
    QueryKey::new(
        "titleNot",
        "titlenot",
        ValueKind::Text,
        SearchOperator::NotAnyOf,
        &["entityDescription.mainTitle"],
    ),
    QueryKey::new(
        "titleShould",
        "titleshould",
        ValueKind::Text,
        SearchOperator::AnyOf,
        &["entityDescription.mainTitle"],
    ),
    QueryKey::new(
        "abstract",
        "abstract",
        ValueKind::Text,
        SearchOperator::AllOf,
        &["entityDescription.abstract"],
    ),
    QueryKey::new(
        "contributor",
        "contributors?|contributorid",
        ValueKind::Keyword,
        SearchOperator::AllOf,
        &[CONTRIBUTOR_ID],
    )
    .nested(CONTRIBUTORS)
    .uri(PERSON_PREFIX)
    .decoded(),
    QueryKey::new(
        "contributorNot",
        "contributors?not|contributoridnot",
        ValueKind::Keyword,
        SearchOperator::NotAnyOf,
        &[CONTRIBUTOR_ID],
    )
    .nested(CONTRIBUTORS)
    .uri(PERSON_PREFIX)
    .decoded(),
    QueryKey::new(
        "contributorShould",
        "contributors?should",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &[CONTRIBUTOR_ID],
    )
    .nested(CONTRIBUTORS)
    .uri(PERSON_PREFIX)
    .decoded(),
    QueryKey::new(
        "contributorName",
        "contributors?name|author|creator",
        ValueKind::FuzzyText,
        SearchOperator::AllOf,
        &[CONTRIBUTOR_NAME],
    )
    .nested(CONTRIBUTORS),
    QueryKey::new(
        "id",
        "id|identifier",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["identifier.keyword", "id.keyword"],
    ),
    QueryKey::new(
        "idNot",
        "idnot|identifiernot",
        ValueKind::Keyword,
        SearchOperator::NotAnyOf,
        &["identifier.keyword", "id.keyword"],
    ),
    QueryKey::new(
        "type",
        "type|instancetype|category",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &[INSTANCE_TYPE],
    )
    .facet("type"),
    QueryKey::new(
        "typeNot",
        "typenot|instancetypenot|categorynot",
        ValueKind::Keyword,
        SearchOperator::NotAnyOf,
        &[INSTANCE_TYPE],
    ),
    QueryKey::new(
        "publicationYear",
        "publicationyear|year",
        ValueKind::Number,
        SearchOperator::Between,
        &[PUBLICATION_YEAR],
    ),
    QueryKey::new(
        "publicationYearBefore",
        "publicationyearbefore|yearbefore",
        ValueKind::Number,
        SearchOperator::LessThan,
        &[PUBLICATION_YEAR],
    ),
    QueryKey::new(
        "publicationYearSince",
        "publicationyearsince|yearsince",
        ValueKind::Number,
        SearchOperator::GreaterOrEqual,
        &[PUBLICATION_YEAR],
    ),
    QueryKey::new(
        "publishedBetween",
        "publishedbetween",
        ValueKind::Date,
        SearchOperator::Between,
        &["publishedDate"],
    ),
    QueryKey::new(
        "publishedBefore",
        "publishedbefore",
        ValueKind::Date,
        SearchOperator::LessThan,
        &["publishedDate"],
    ),
    QueryKey::new(
        "publishedSince",
        "publishedsince",
        ValueKind::Date,
        SearchOperator::GreaterOrEqual,
        &["publishedDate"],
    ),
    QueryKey::new(
        "createdSince",
        "createdsince",
        ValueKind::Date,
        SearchOperator::GreaterOrEqual,
        &["createdDate"],
    ),
    QueryKey::new(
        "modifiedSince",
        "modifiedsince",
        ValueKind::Date,
        SearchOperator::GreaterOrEqual,
        &["modifiedDate"],
    ),
    QueryKey::custom(
        "unit",
        "units?|unitid|organization|organizationid",
        CustomClause::Membership {
            exact_field: "entityDescription.contributors.affiliations.id.keyword",
            ancestor_field: "entityDescription.contributors.affiliations.ancestors.keyword",
            toggle: EXCLUDE_SUBUNITS,
        },
        &[
            "entityDescription.contributors.affiliations.id.keyword",
            "entityDescription.contributors.affiliations.ancestors.keyword",
        ],
    )
    .nested(CONTRIBUTORS)
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
        "topLevelOrganization",
        "toplevelorganizations?",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["topLevelOrganizations.id.keyword"],
    )
    .nested(TOP_LEVEL_ORGANIZATIONS)
    .uri(ORGANIZATION_PREFIX)
    .decoded()
    .facet("topLevelOrganization"),
    QueryKey::new(
        "fundingSource",
        "fundingsource",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &[FUNDING_SOURCE],
    )
    .nested(FUNDINGS)
    .facet("fundingSource"),
    QueryKey::custom("funding", "fundings?", CustomClause::NestedPair, &[FUNDING_SOURCE])
        .nested(FUNDINGS)
        .sub_key("fundings.identifier.keyword")
        .pattern(r"^[^:]+:[^:]+$"),
    QueryKey::custom(
        "cristinIdentifier",
        "cristinidentifier|cristinid",
        CustomClause::TypedIdentifier {
            type_field: IDENTIFIER_SOURCE,
            type_value: "Cristin",
        },
        &[IDENTIFIER_VALUE],
    )
    .nested(ADDITIONAL_IDENTIFIERS)
    .operator(SearchOperator::AnyOf),
    QueryKey::custom(
        "scopusIdentifier",
        "scopusidentifier|scopusid",
        CustomClause::TypedIdentifier {
            type_field: IDENTIFIER_SOURCE,
            type_value: "Scopus",
        },
        &[IDENTIFIER_VALUE],
    )
    .nested(ADDITIONAL_IDENTIFIERS)
    .operator(SearchOperator::AnyOf),
    QueryKey::new(
        "doi",
        "doi",
        ValueKind::FuzzyKeyword,
        SearchOperator::AnyOf,
        &["entityDescription.reference.doi.keyword", "doi.keyword"],
    )
    .decoded(),
    QueryKey::new(
        "handle",
        "handle",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["handle.keyword"],
    )
    .decoded(),
    QueryKey::new(
        "hasFiles",
        "hasfiles?|files",
        ValueKind::Exists,
        SearchOperator::Exists,
        &["associatedArtifacts.fileIdentifier"],
    ),
    QueryKey::new(
        "license",
        "licen[cs]e",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &[LICENSE],
    )
    .decoded()
    .facet("license"),
    QueryKey::new(
        "journal",
        "journal|publicationcontext|series",
        ValueKind::FuzzyText,
        SearchOperator::AnyOf,
        &[
            "entityDescription.reference.publicationContext.name",
            "entityDescription.reference.publicationContext.title",
        ],
    ),
    QueryKey::new(
        "tags",
        "tags?|keywords?",
        ValueKind::Text,
        SearchOperator::AnyOf,
        &["entityDescription.tags"],
    ),
    QueryKey::new(
        "status",
        "status",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["status.keyword"],
    ),
    QueryKey::new(
        "scientificValue",
        "scientificvalue|level",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &[SCIENTIFIC_VALUE],
    )
    .facet("scientificValue"),
];

/// Sort keys.
pub static SORT_KEYS: &[SortKey] = &[
    RELEVANCE,
    SortKey::new(
        "publishedDate",
        "publisheddate|published",
        &["publishedDate"],
        SortDirection::Descending,
    ),
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
    SortKey::new(
        "publicationYear",
        "publicationyear|year",
        &[PUBLICATION_YEAR],
        SortDirection::Descending,
    ),
    SortKey::new(
        "title",
        "title|maintitle",
        &["entityDescription.mainTitle.keyword"],
        SortDirection::Ascending,
    ),
    SortKey::new(
        "type",
        "type|instancetype|category",
        &[INSTANCE_TYPE],
        SortDirection::Ascending,
    ),
];

/// Aggregation dimensions.
pub static FACETS: &[FacetDimension] = &[
    FacetDimension::terms("type", "type", INSTANCE_TYPE),
    FacetDimension::terms(
        "topLevelOrganization",
        "topLevelOrganization",
        "topLevelOrganizations.id.keyword",
    )
    .nested(TOP_LEVEL_ORGANIZATIONS)
    .labels("labels"),
    FacetDimension::terms("fundingSource", "fundingSource", FUNDING_SOURCE)
        .nested(FUNDINGS)
        .labels("source.labels"),
    FacetDimension::terms("license", "license", LICENSE),
    FacetDimension::terms("scientificValue", "scientificValue", SCIENTIFIC_VALUE).size(10),
];

/// The publication catalogue definition.
pub static PUBLICATIONS: CatalogueDefinition = CatalogueDefinition {
    document_type: DocumentType::Publication,
    keys: KEYS,
    sort_keys: SORT_KEYS,
    facets: FACETS,
    required: &[FROM, SIZE, SORT, AGGREGATION],
    default_size: 15,
    default_sort: "relevance,publishedDate:desc",
    promotion_key: Some("contributor"),
    identifier_field: "identifier.keyword",
    source_excludes: &["joinField", "entityDescription.contributors.affiliations.ancestors"],
};
