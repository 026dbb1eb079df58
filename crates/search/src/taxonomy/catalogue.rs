//! The generic [`Taxonomy`] implementation.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use super::control::{self, CONTROL_KEYS};
use super::facet::FacetDimension;
use super::key::{INVALID, KeyScope, QueryKey};
use super::sort::{SortKey, SortTaxonomy, anchored, normalize_name};
use super::{DocumentType, Taxonomy, TaxonomyRules};
use crate::error::TaxonomyError;

const ANY_VALUE: &str = r"(?s)^.+$";

/// Static description of one document type.
#[derive(Debug)]
pub struct CatalogueDefinition {
    /// The document type described.
    pub document_type: DocumentType,
    /// Search keys in resolution order.
    pub keys: &'static [QueryKey],
    /// Sort keys.
    pub sort_keys: &'static [SortKey],
    /// Aggregation dimensions.
    pub facets: &'static [FacetDimension],
    /// Keys every store must contain.
    pub required: &'static [&'static str],
    /// Page size when `size` is absent.
    pub default_size: u64,
    /// Sort expression when `sort` is absent.
    pub default_sort: &'static str,
    /// Key whose single value triggers promoted results.
    pub promotion_key: Option<&'static str>,
    /// Unique document identifier field.
    pub identifier_field: &'static str,
    /// `_source` paths excluded by default.
    pub source_excludes: &'static [&'static str],
}

/// A compiled taxonomy for one document type.
///
/// Built once at startup; every regex in the definition is compiled here so
/// that a broken table fails fast instead of on the first request.
#[derive(Debug)]
pub struct Catalogue {
    definition: &'static CatalogueDefinition,
    names: Vec<(Regex, &'static QueryKey)>,
    values: HashMap<&'static str, Regex>,
    any_value: Regex,
    sort: SortTaxonomy,
    rules: TaxonomyRules,
}

impl Catalogue {
    /// Compiles `definition`, expanding identifier fragments against
    /// `api_host`.
    pub fn new(
        definition: &'static CatalogueDefinition,
        api_host: impl Into<String>,
    ) -> Result<Self, TaxonomyError> {
        let mut names = Vec::with_capacity(definition.keys.len() + CONTROL_KEYS.len());
        let mut values = HashMap::new();

        for key in definition.keys.iter().chain(CONTROL_KEYS.iter()) {
            if key.scope != KeyScope::Internal {
                let regex = anchored(key.name_pattern).map_err(|source| {
                    TaxonomyError::InvalidPattern {
                        key: key.name.to_string(),
                        source,
                    }
                })?;
                names.push((regex, key));
            }

            let regex = Regex::new(key.element_pattern()).map_err(|source| {
                TaxonomyError::InvalidPattern {
                    key: key.name.to_string(),
                    source,
                }
            })?;
            values.insert(key.name, regex);
        }

        let catalogue = Self {
            definition,
            names,
            values,
            any_value: Regex::new(ANY_VALUE).map_err(|source| TaxonomyError::InvalidPattern {
                key: INVALID.name.to_string(),
                source,
            })?,
            sort: SortTaxonomy::new(definition.sort_keys)?,
            rules: TaxonomyRules {
                required: definition.required.to_vec(),
                default_size: definition.default_size,
                default_sort: definition.default_sort,
                promotion_key: definition.promotion_key,
                identifier_field: definition.identifier_field,
                source_excludes: definition.source_excludes,
                api_host: api_host.into(),
            },
        };
        catalogue.check_references()?;

        debug!(
            document_type = %definition.document_type,
            keys = catalogue.names.len(),
            facets = definition.facets.len(),
            "Compiled catalogue"
        );

        Ok(catalogue)
    }

    /// Overrides the default page size.
    pub fn with_default_size(mut self, size: u64) -> Self {
        self.rules.default_size = size;
        self
    }

    fn check_references(&self) -> Result<(), TaxonomyError> {
        let facet_keys = self.definition.facets.iter().map(|facet| facet.key);
        let referenced = self
            .definition
            .required
            .iter()
            .copied()
            .chain(self.definition.promotion_key)
            .chain(facet_keys);

        for name in referenced {
            if self.key(name).is_none() {
                return Err(TaxonomyError::UndefinedKey {
                    document_type: self.definition.document_type.to_string(),
                    key: name.to_string(),
                });
            }
        }

        if self.sort.parse(self.definition.default_sort, None).is_err() {
            return Err(TaxonomyError::UndefinedKey {
                document_type: self.definition.document_type.to_string(),
                key: self.definition.default_sort.to_string(),
            });
        }
        Ok(())
    }
}

impl Taxonomy for Catalogue {
    fn document_type(&self) -> DocumentType {
        self.definition.document_type
    }

    fn resolve(&self, name: &str) -> &'static QueryKey {
        let normalized = normalize_name(name.trim());
        self.names
            .iter()
            .find(|(regex, _)| regex.is_match(&normalized))
            .map(|(_, key)| *key)
            .unwrap_or(&INVALID)
    }

    fn key(&self, canonical: &str) -> Option<&'static QueryKey> {
        self.definition
            .keys
            .iter()
            .chain(CONTROL_KEYS.iter())
            .find(|key| key.name == canonical)
    }

    fn value_pattern(&self, key: &QueryKey) -> &Regex {
        self.values.get(key.name).unwrap_or(&self.any_value)
    }

    fn sort_taxonomy(&self) -> &SortTaxonomy {
        &self.sort
    }

    fn facets(&self) -> &'static [FacetDimension] {
        self.definition.facets
    }

    fn rules(&self) -> &TaxonomyRules {
        &self.rules
    }

    fn valid_names(&self) -> Vec<&'static str> {
        self.names
            .iter()
            .map(|(_, key)| key.name)
            .filter(|name| *name != control::PAGE)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::key::{SearchOperator, ValueKind};
    use crate::taxonomy::sort::RELEVANCE;

    static KEYS: &[QueryKey] = &[
        QueryKey::new(
            "contributorName",
            "contributorname|author",
            ValueKind::Text,
            SearchOperator::AllOf,
            &["contributors.name"],
        ),
        QueryKey::new(
            "contributor",
            "contributor",
            ValueKind::Keyword,
            SearchOperator::AllOf,
            &["contributors.id.keyword"],
        ),
        QueryKey::new(
            "hidden",
            "hidden",
            ValueKind::Keyword,
            SearchOperator::AllOf,
            &["hidden"],
        )
        .internal(),
    ];

    static DEFINITION: CatalogueDefinition = CatalogueDefinition {
        document_type: DocumentType::Publication,
        keys: KEYS,
        sort_keys: &[RELEVANCE],
        facets: &[],
        required: &["from", "size"],
        default_size: 15,
        default_sort: "relevance",
        promotion_key: Some("contributor"),
        identifier_field: "id.keyword",
        source_excludes: &[],
    };

    #[test]
    fn test_resolve_first_match_wins() {
        let catalogue = Catalogue::new(&DEFINITION, "https://api.test").unwrap();
        assert_eq!(catalogue.resolve("contributor").name, "contributor");
        assert_eq!(catalogue.resolve("contributor_name").name, "contributorName");
        assert_eq!(catalogue.resolve("AUTHOR").name, "contributorName");
    }

    #[test]
    fn test_resolve_control_keys_after_search_keys() {
        let catalogue = Catalogue::new(&DEFINITION, "https://api.test").unwrap();
        assert_eq!(catalogue.resolve("per_page").name, "size");
        assert_eq!(catalogue.resolve("Offset").name, "from");
        assert_eq!(catalogue.resolve("sort-order").name, "sortOrder");
    }

    #[test]
    fn test_internal_keys_never_resolve() {
        let catalogue = Catalogue::new(&DEFINITION, "https://api.test").unwrap();
        assert!(catalogue.resolve("hidden").is_invalid());
        assert!(catalogue.key("hidden").is_some());
        assert!(!catalogue.valid_names().contains(&"hidden"));
    }

    #[test]
    fn test_default_values() {
        let catalogue = Catalogue::new(&DEFINITION, "https://api.test")
            .unwrap()
            .with_default_size(25);
        let rules = catalogue.rules();
        assert_eq!(rules.default_value("from").as_deref(), Some("0"));
        assert_eq!(rules.default_value("size").as_deref(), Some("25"));
        assert_eq!(rules.default_value("sort").as_deref(), Some("relevance"));
        assert_eq!(rules.default_value("aggregation").as_deref(), Some("all"));
        assert_eq!(rules.default_value("contributor"), None);
        assert_eq!(catalogue.sort_taxonomy().valid_names(), vec!["relevance"]);
    }

    #[test]
    fn test_expand_uri() {
        let catalogue = Catalogue::new(&DEFINITION, "https://api.test/").unwrap();
        let rules = catalogue.rules();
        assert_eq!(
            rules.expand_uri("cristin/person", "1234"),
            "https://api.test/cristin/person/1234"
        );
        assert_eq!(
            rules.expand_uri("cristin/person", "https://other/1"),
            "https://other/1"
        );
    }
}
