//! Import candidate taxonomy.

use super::catalogue::CatalogueDefinition;
use super::control::{AGGREGATION, FROM, SIZE, SORT};
use super::facet::FacetDimension;
use super::key::{CustomClause, QueryKey, SearchOperator, ValueKind, WeightedField};
use super::sort::{RELEVANCE, SortDirection, SortKey};
use super::DocumentType;

const CONTRIBUTORS: &str = "contributors";
const ORGANIZATIONS: &str = "organizations";
const ADDITIONAL_IDENTIFIERS: &str = "additionalIdentifiers";
const IDENTIFIER_SOURCE: &str = "additionalIdentifiers.sourceName.keyword";
const IDENTIFIER_VALUE: &str = "additionalIdentifiers.value.keyword";
const INSTANCE_TYPE: &str = "publicationInstance.type.keyword";

static FREE_TEXT: &[WeightedField] = &[
    WeightedField::new("mainTitle", 3.0),
    WeightedField::new("contributors.identity.name", 2.0),
    WeightedField::new("abstract", 1.0),
];

/// Search keys, in resolution order.
pub static KEYS: &[QueryKey] = &[
    QueryKey::custom(
        "query",
        "query|searchall|q",
        CustomClause::WeightedFreeText { fields: FREE_TEXT },
        &["mainTitle", "contributors.identity.name", "abstract"],
    ),
    QueryKey::new(
        "importStatus",
        "importstatus|status",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["importStatus.candidateStatus.keyword"],
    )
    .facet("importStatus"),
    QueryKey::new(
        "type",
        "type|instancetype|category",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &[INSTANCE_TYPE],
    )
    .facet("type"),
    QueryKey::new(
        "publicationYear",
        "publicationyear|year",
        ValueKind::Number,
        SearchOperator::Between,
        &["publicationYear"],
    ),
    QueryKey::new(
        "publicationYearSince",
        "publicationyearsince|yearsince",
        ValueKind::Number,
        SearchOperator::GreaterOrEqual,
        &["publicationYear"],
    ),
    QueryKey::new(
        "title",
        "title|maintitle",
        ValueKind::Text,
        SearchOperator::AllOf,
        &["mainTitle"],
    ),
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
        &["doi.keyword"],
    )
    .decoded(),
    QueryKey::new(
        "collaborationType",
        "collaborationtype",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["collaborationType.keyword"],
    )
    .facet("collaborationType"),
    QueryKey::new(
        "topLevelOrganization",
        "toplevelorganizations?|organization",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["organizations.id.keyword"],
    )
    .nested(ORGANIZATIONS)
    .uri("cristin/organization")
    .decoded()
    .facet("topLevelOrganization"),
    QueryKey::new(
        "files",
        "files|filesstatus",
        ValueKind::Keyword,
        SearchOperator::AnyOf,
        &["filesStatus.keyword"],
    )
    .facet("files"),
    QueryKey::new(
        "createdDate",
        "createddate|created",
        ValueKind::Date,
        SearchOperator::Between,
        &["createdDate"],
    ),
    QueryKey::new(
        "contributor",
        "contributors?|contributorid",
        ValueKind::Keyword,
        SearchOperator::AllOf,
        &["contributors.identity.id.keyword"],
    )
    .nested(CONTRIBUTORS)
    .uri("cristin/person")
    .decoded(),
    QueryKey::new(
        "contributorName",
        "contributors?name|author",
        ValueKind::FuzzyText,
        SearchOperator::AllOf,
        &["contributors.identity.name"],
    )
    .nested(CONTRIBUTORS),
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
        "publicationYear",
        "publicationyear|year",
        &["publicationYear"],
        SortDirection::Descending,
    ),
    SortKey::new(
        "title",
        "title|maintitle",
        &["mainTitle.keyword"],
        SortDirection::Ascending,
    ),
];

/// Aggregation dimensions.
pub static FACETS: &[FacetDimension] = &[
    FacetDimension::terms(
        "importStatus",
        "importStatus",
        "importStatus.candidateStatus.keyword",
    ),
    FacetDimension::terms("type", "type", INSTANCE_TYPE),
    FacetDimension::terms(
        "collaborationType",
        "collaborationType",
        "collaborationType.keyword",
    ),
    FacetDimension::terms(
        "topLevelOrganization",
        "topLevelOrganization",
        "organizations.id.keyword",
    )
    .nested(ORGANIZATIONS)
    .labels("labels"),
    FacetDimension::terms("files", "files", "filesStatus.keyword"),
];

/// The import candidate catalogue definition.
pub static IMPORT_CANDIDATES: CatalogueDefinition = CatalogueDefinition {
    document_type: DocumentType::ImportCandidate,
    keys: KEYS,
    sort_keys: SORT_KEYS,
    facets: FACETS,
    required: &[FROM, SIZE, SORT, AGGREGATION],
    default_size: 15,
    default_sort: "createdDate:desc",
    promotion_key: None,
    identifier_field: "identifier.keyword",
    source_excludes: &[],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{Catalogue, Taxonomy};

    #[test]
    fn test_catalogue_compiles_and_resolves() {
        let catalogue = Catalogue::new(&IMPORT_CANDIDATES, "https://api.test").unwrap();
        for key in KEYS {
            assert_eq!(catalogue.resolve(key.name).name, key.name, "{}", key.name);
        }
        assert_eq!(catalogue.resolve("status").name, "importStatus");
        assert_eq!(catalogue.facets().len(), 5);
    }
}
