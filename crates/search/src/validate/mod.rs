//! Request parameter validation.
//!
//! The [`Validator`] turns raw `(name, value)` pairs into a [`ParameterStore`]
//! or a [`ValidationError`] listing every problem of one failure class. It
//! never talks to the engine, so a rejected request costs no engine call.
//!
//! Checks run in a fixed order:
//!
//! 1. defaults for absent required keys
//! 2. missing required keys
//! 3. unknown parameter names
//! 4. value patterns
//! 5. sort tokens and the aggregation selector
//! 6. normalisation (page, partial dates, identifier URIs)
//! 7. page size and result window bounds

mod normalize;

use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::aggregation::AggregationSelection;
use crate::error::{ValidationError, ValueIssue};
use crate::pagination::SearchAfterCursor;
use crate::params::{Entry, ParameterStore};
use crate::taxonomy::control::{self, SEARCH_AFTER, SORT, SORT_ORDER};
use crate::taxonomy::{
    QueryKey, SearchOperator, SortDirection, Taxonomy, ValueEncoding, ValueKind,
};

pub use normalize::{expand_dates, period_end, period_start};

/// Maximum `from + size` the engine serves without a search-after cursor.
pub const RESULT_WINDOW: u64 = 10_000;

/// Page size and depth limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    /// Largest accepted page size.
    pub max_size: u64,
    /// Largest accepted `from + size` for offset pagination.
    pub result_window: u64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_size: 1000,
            result_window: RESULT_WINDOW,
        }
    }
}

/// Validates request parameters against a taxonomy.
pub struct Validator<'t, T: Taxonomy + ?Sized> {
    taxonomy: &'t T,
    required: Vec<&'static str>,
    limits: ValidationLimits,
}

impl<'t, T: Taxonomy + ?Sized> Validator<'t, T> {
    /// Creates a validator with the taxonomy's required keys.
    pub fn new(taxonomy: &'t T) -> Self {
        Self {
            taxonomy,
            required: Vec::new(),
            limits: ValidationLimits::default(),
        }
    }

    /// Adds endpoint specific required keys.
    pub fn with_required(mut self, names: &[&'static str]) -> Self {
        self.required.extend_from_slice(names);
        self
    }

    /// Sets the page limits.
    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Validates raw pairs in request order.
    pub fn validate<I, K, V>(&self, pairs: I) -> Result<ParameterStore, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let rules = self.taxonomy.rules();
        let mut store = ParameterStore::with_required(
            rules
                .required
                .iter()
                .copied()
                .chain(self.required.iter().copied()),
        );
        let mut unknown: Vec<String> = Vec::new();

        for (name, value) in pairs {
            let name = name.as_ref();
            let key = self.taxonomy.resolve(name);
            if key.is_invalid() {
                if !unknown.iter().any(|n| n == name) {
                    unknown.push(name.to_string());
                }
                continue;
            }

            let value = value.as_ref().trim();
            if value.is_empty() {
                debug!(parameter = %key.name, "Ignoring empty parameter value");
                continue;
            }
            store.merge(key, decode(key, value));
        }

        self.apply_defaults(&mut store);

        let missing: Vec<String> = store
            .required()
            .iter()
            .filter(|name| !store.contains(name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequired { names: missing });
        }

        if !unknown.is_empty() {
            return Err(ValidationError::UnknownParameter {
                names: unknown,
                valid: self.valid_names(),
            });
        }

        let issues: Vec<ValueIssue> = store
            .search_entries()
            .chain(store.control_entries())
            .filter_map(|entry| self.check_value(entry))
            .collect();
        if !issues.is_empty() {
            return Err(ValidationError::InvalidValue { issues });
        }

        self.check_sort(&mut store)?;
        self.check_aggregation(&store)?;

        normalize::normalize(self.taxonomy, &mut store);

        self.check_bounds(&store)?;

        debug!(
            document_type = %self.taxonomy.document_type(),
            search = store.search_entries().count(),
            control = store.control_entries().count(),
            "Validated request parameters"
        );

        Ok(store)
    }

    fn valid_names(&self) -> Vec<String> {
        self.taxonomy
            .valid_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn apply_defaults(&self, store: &mut ParameterStore) {
        let rules = self.taxonomy.rules();
        let absent: Vec<&'static str> = store
            .required()
            .iter()
            .copied()
            .filter(|name| !store.contains(name))
            .collect();

        for name in absent {
            // Keys without a default are reported as missing by the caller.
            let (Some(key), Some(value)) = (self.taxonomy.key(name), rules.default_value(name))
            else {
                continue;
            };
            store.merge(key, value);
        }
    }

    fn check_value(&self, entry: &Entry) -> Option<ValueIssue> {
        let key = entry.key;
        let elements = entry.elements();
        let issue = |message: String| Some(ValueIssue::new(key.name, &entry.value, message));

        if key.operator == SearchOperator::Between {
            if elements.len() > 2 {
                return issue(format!("{} must be a value or a lower:upper pair", key.name));
            }
            if elements.iter().all(|element| element.is_empty()) {
                return issue(self.taxonomy.error_message(key));
            }
        } else if is_single_valued(key) && elements.len() > 1 {
            return issue(format!("{} accepts a single value", key.name));
        }

        let pattern = self.taxonomy.value_pattern(key);
        let valid = elements.iter().all(|element| {
            (key.operator == SearchOperator::Between && element.is_empty())
                || pattern.is_match(element)
        });
        if !valid {
            return issue(self.taxonomy.error_message(key));
        }

        if key.kind == ValueKind::Date
            && !elements
                .iter()
                .filter(|element| !element.is_empty())
                .all(|element| normalize::is_calendar_date(element))
        {
            return issue(format!("{} is not a calendar date", key.name));
        }

        if key.name == SEARCH_AFTER && SearchAfterCursor::decode(&entry.value).is_err() {
            return issue(format!("{} is not a valid cursor", key.name));
        }
        None
    }

    fn check_sort(&self, store: &mut ParameterStore) -> Result<(), ValidationError> {
        let fallback = store
            .remove(SORT_ORDER)
            .and_then(|order| SortDirection::parse(order.trim()));

        let Some(expression) = store.sort().map(str::to_string) else {
            return Ok(());
        };

        let sort = self.taxonomy.sort_taxonomy();
        match sort.parse(&expression, fallback) {
            Ok(directives) => {
                if let Some(key) = self.taxonomy.key(SORT) {
                    let canonical = directives
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(",");
                    store.set(key, canonical);
                }
                Ok(())
            }
            Err(tokens) => Err(ValidationError::InvalidSort {
                tokens,
                valid: sort.valid_names().into_iter().map(str::to_string).collect(),
            }),
        }
    }

    fn check_aggregation(&self, store: &ParameterStore) -> Result<(), ValidationError> {
        let AggregationSelection::Only(names) = store.aggregation() else {
            return Ok(());
        };

        let issues: Vec<ValueIssue> = names
            .iter()
            .filter(|name| self.taxonomy.facet(name).is_none())
            .map(|name| {
                let valid = self
                    .taxonomy
                    .facets()
                    .iter()
                    .map(|facet| facet.name)
                    .collect::<Vec<_>>()
                    .join(", ");
                ValueIssue::new(
                    control::AGGREGATION,
                    name.as_str(),
                    format!("must be all, none or one of: {}", valid),
                )
            })
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::InvalidValue { issues })
        }
    }

    fn check_bounds(&self, store: &ParameterStore) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        let (from, size) = (store.from(), store.size());

        if size > self.limits.max_size {
            issues.push(ValueIssue::new(
                control::SIZE,
                size.to_string(),
                format!("must be at most {}", self.limits.max_size),
            ));
        }
        if store.search_after().is_none()
            && from.saturating_add(size) > self.limits.result_window
        {
            issues.push(ValueIssue::new(
                control::FROM,
                from.to_string(),
                format!(
                    "from + size must not exceed {}; use searchAfter for deeper pages",
                    self.limits.result_window
                ),
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::InvalidValue { issues })
        }
    }
}

fn is_single_valued(key: &QueryKey) -> bool {
    key.operator.is_single_valued() && !control::is_list_key(key.name)
}

fn decode(key: &QueryKey, value: &str) -> String {
    match key.encoding {
        ValueEncoding::None => value.to_string(),
        ValueEncoding::Decode => match percent_decode_str(value).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => {
                debug!(parameter = %key.name, "Value is not valid UTF-8 after decoding");
                value.to_string()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::publication::PUBLICATIONS;
    use crate::taxonomy::Catalogue;

    fn catalogue() -> Catalogue {
        Catalogue::new(&PUBLICATIONS, "https://api.test").unwrap()
    }

    fn validate(pairs: &[(&str, &str)]) -> Result<ParameterStore, ValidationError> {
        let catalogue = catalogue();
        Validator::new(&catalogue).validate(pairs.iter().copied())
    }

    #[test]
    fn test_defaults_fill_required_keys() {
        let store = validate(&[("title", "ocean")]).unwrap();
        assert_eq!(store.from(), 0);
        assert_eq!(store.size(), 15);
        assert_eq!(store.sort(), Some("relevance:desc,publishedDate:desc"));
        assert_eq!(store.get("aggregation"), Some("all"));
        assert_eq!(store.get("title"), Some("ocean"));
    }

    #[test]
    fn test_missing_required_without_default() {
        let catalogue = catalogue();
        let err = Validator::new(&catalogue)
            .with_required(&["contributor", "unit"])
            .validate([("title", "ocean")])
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                names: vec!["contributor".to_string(), "unit".to_string()]
            }
        );
    }

    #[test]
    fn test_unknown_parameters_all_reported() {
        let err = validate(&[("foo", "bar"), ("title", "x"), ("baz", "1"), ("foo", "2")])
            .unwrap_err();
        match err {
            ValidationError::UnknownParameter { names, valid } => {
                assert_eq!(names, vec!["foo".to_string(), "baz".to_string()]);
                assert!(valid.contains(&"title".to_string()));
                assert!(valid.contains(&"size".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolution_ignores_case_and_separators() {
        let store = validate(&[("CONTRIBUTOR_NAME", "Ada"), ("per-page", "5")]).unwrap();
        assert_eq!(store.get("contributorName"), Some("Ada"));
        assert_eq!(store.size(), 5);
    }

    #[test]
    fn test_invalid_values_all_reported() {
        let err = validate(&[("size", "ten"), ("publicationYear", "20x"), ("hasFiles", "maybe")])
            .unwrap_err();
        match err {
            ValidationError::InvalidValue { issues } => {
                let names: Vec<_> = issues.iter().map(|i| i.parameter.as_str()).collect();
                assert!(names.contains(&"size"));
                assert!(names.contains(&"publicationYear"));
                assert!(names.contains(&"hasFiles"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_repeated_values_merge() {
        let store = validate(&[("type", "AcademicArticle"), ("type", "Book")]).unwrap();
        assert_eq!(store.get("type"), Some("AcademicArticle,Book"));

        let store = validate(&[("publicationYear", "2010"), ("publicationYear", "2020")]).unwrap();
        assert_eq!(store.get("publicationYear"), Some("2010:2020"));
    }

    #[test]
    fn test_single_valued_keys_reject_lists() {
        let err = validate(&[("size", "1"), ("size", "2")]).unwrap_err();
        assert_eq!(err.kind(), "InvalidValue");
    }

    #[test]
    fn test_sort_order_folds_into_tokens() {
        let store = validate(&[("sort", "title,publishedDate:desc"), ("sortOrder", "DESC")])
            .unwrap();
        assert_eq!(store.sort(), Some("title:desc,publishedDate:desc"));
        assert!(!store.contains("sortOrder"));
    }

    #[test]
    fn test_invalid_sort_reports_tokens_and_valid_names() {
        let err = validate(&[("sort", "title:asc:desc,foo,publishedDate")]).unwrap_err();
        match err {
            ValidationError::InvalidSort { tokens, valid } => {
                assert_eq!(tokens, vec!["title:asc:desc".to_string(), "foo".to_string()]);
                assert!(valid.contains(&"relevance".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_aggregation_selector() {
        assert!(validate(&[("aggregation", "none")]).is_ok());
        assert!(validate(&[("aggregation", "type,license")]).is_ok());
        let err = validate(&[("aggregation", "type,colour")]).unwrap_err();
        assert_eq!(err.invalid_parameters().len(), 1);
    }

    #[test]
    fn test_page_normalised_to_from() {
        let store = validate(&[("page", "3"), ("size", "10")]).unwrap();
        assert_eq!(store.from(), 30);
        assert!(store.page().is_none());
    }

    #[test]
    fn test_dates_expanded() {
        let store = validate(&[
            ("publishedBetween", "2019:2020-02"),
            ("publishedBefore", "2021"),
        ])
        .unwrap();
        assert_eq!(store.get("publishedBetween"), Some("2019-01-01:2020-02-29"));
        assert_eq!(store.get("publishedBefore"), Some("2021-01-01"));
    }

    #[test]
    fn test_identifier_fragments_expanded() {
        let store = validate(&[("contributor", "1234"), ("unit", "https://x.org/ou/1")]).unwrap();
        assert_eq!(
            store.get("contributor"),
            Some("https://api.test/cristin/person/1234")
        );
        assert_eq!(store.get("unit"), Some("https://x.org/ou/1"));
    }

    #[test]
    fn test_double_encoded_values_decoded() {
        let store = validate(&[("doi", "10.1000%2Fxyz")]).unwrap();
        assert_eq!(store.get("doi"), Some("10.1000/xyz"));
    }

    #[test]
    fn test_result_window() {
        let err = validate(&[("from", "9990"), ("size", "20")]).unwrap_err();
        assert_eq!(err.kind(), "InvalidValue");

        let cursor = SearchAfterCursor::new(vec![serde_json::json!(1)]).encode();
        let store = validate(&[("from", "9990"), ("size", "20"), ("searchAfter", cursor.as_str())]);
        assert!(store.is_ok());
    }

    #[test]
    fn test_size_limit() {
        let catalogue = catalogue();
        let err = Validator::new(&catalogue)
            .with_limits(ValidationLimits {
                max_size: 50,
                result_window: RESULT_WINDOW,
            })
            .validate([("size", "51")])
            .unwrap_err();
        assert!(err.to_string().contains("must be at most 50"));
    }

    #[test]
    fn test_malformed_cursor_rejected() {
        let err = validate(&[("searchAfter", "bm90LWpzb24")]).unwrap_err();
        assert_eq!(err.kind(), "InvalidValue");
    }

    #[test]
    fn test_empty_values_ignored() {
        let store = validate(&[("title", ""), ("abstract", "  ")]).unwrap();
        assert!(!store.contains("title"));
        assert!(!store.contains("abstract"));
    }
}
