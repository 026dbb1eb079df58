//! Query key descriptors.
//!
//! A [`QueryKey`] is an immutable record describing one recognised query
//! parameter: how its name is matched, how its value is validated and merged,
//! which index fields it targets and which clause shape it compiles to.
//! Taxonomies are static tables of these records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The value type of a query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueKind {
    /// Analysed text, all terms required.
    Text,
    /// Analysed text with typo tolerance.
    FuzzyText,
    /// Exact keyword match.
    Keyword,
    /// Keyword match with a fuzzy fallback on the analysed field.
    FuzzyKeyword,
    /// Numeric value.
    Number,
    /// Calendar date (`yyyy`, `yyyy-mm` or `yyyy-mm-dd`).
    Date,
    /// Boolean matched against the index.
    Boolean,
    /// Boolean toggle that only steers other clauses.
    Flag,
    /// Presence check.
    Exists,
    /// Sort expression.
    Sort,
    /// Bespoke clause shape, see [`CustomClause`].
    Custom,
    /// Unresolved parameter name.
    Invalid,
}

impl ValueKind {
    /// Pattern every single value element of this kind must match.
    pub fn element_pattern(&self) -> &'static str {
        match self {
            ValueKind::Number => r"^-?\d+(\.\d+)?$",
            ValueKind::Date => r"^\d{4}(-(0[1-9]|1[0-2])(-(0[1-9]|[12]\d|3[01]))?)?$",
            ValueKind::Boolean | ValueKind::Flag | ValueKind::Exists => r"(?i)^(true|false)$",
            _ => r"(?s)^.+$",
        }
    }

    /// Human readable description of the accepted value format.
    pub fn error_message(&self) -> &'static str {
        match self {
            ValueKind::Number => "must be a number",
            ValueKind::Date => "must be a date formatted as yyyy, yyyy-mm or yyyy-mm-dd",
            ValueKind::Boolean | ValueKind::Flag | ValueKind::Exists => "must be true or false",
            ValueKind::Sort => "must be a comma separated list of name[:asc|desc]",
            ValueKind::Custom => "has an invalid format",
            ValueKind::Invalid => "is not a recognised parameter",
            _ => "must not be empty",
        }
    }
}

/// How the values of a key combine into a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchOperator {
    /// Every value must match.
    AllOf,
    /// At least one value must match.
    AnyOf,
    /// Exclude documents matching every value.
    NotAllOf,
    /// Exclude documents matching any value.
    NotAnyOf,
    /// Inclusive range from a `lower:upper` pair.
    Between,
    /// Open range, lower bound inclusive.
    GreaterOrEqual,
    /// Open range, upper bound exclusive.
    LessThan,
    /// Field presence.
    Exists,
    /// Produces no clause of its own.
    None,
}

impl SearchOperator {
    /// Delimiter used when repeated assignments of a key are merged.
    ///
    /// Ordered pairs use a colon, value sets a comma.
    pub fn delimiter(&self) -> char {
        match self {
            SearchOperator::Between => ':',
            _ => ',',
        }
    }

    /// Returns true for operators that only ever hold one value.
    pub fn is_single_valued(&self) -> bool {
        matches!(
            self,
            SearchOperator::GreaterOrEqual | SearchOperator::LessThan | SearchOperator::None
        )
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchOperator::AllOf => "all-of",
            SearchOperator::AnyOf => "any-of",
            SearchOperator::NotAllOf => "not-all-of",
            SearchOperator::NotAnyOf => "not-any-of",
            SearchOperator::Between => "between",
            SearchOperator::GreaterOrEqual => "greater-or-equal",
            SearchOperator::LessThan => "less-than",
            SearchOperator::Exists => "exists",
            SearchOperator::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// Which map of the parameter store a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyScope {
    /// Compiled into the engine query.
    Search,
    /// Pagination, sort, aggregation and field selection.
    Control,
    /// Never resolved from a request parameter name.
    Internal,
}

/// Decode rule applied to raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueEncoding {
    /// Use the value as received.
    #[default]
    None,
    /// Percent-decode the value once more (double-encoded URIs and DOIs).
    Decode,
}

/// A field with a relevance weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedField {
    /// Index field path.
    pub path: &'static str,
    /// Boost applied to matches in this field.
    pub boost: f32,
}

impl WeightedField {
    /// Creates a weighted field.
    pub const fn new(path: &'static str, boost: f32) -> Self {
        Self { path, boost }
    }
}

/// Bespoke clause shapes. This set is closed: a key is custom only if it
/// names one of these variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CustomClause {
    /// Free text matched across weighted fields with phrase boosting on the
    /// two strongest fields.
    WeightedFreeText {
        /// Fields searched, with their weights.
        fields: &'static [WeightedField],
    },
    /// `first:second` value matched inside one nested object, the first part
    /// against `fields[0]` and the second against the key's `sub_key`.
    NestedPair,
    /// Value matched together with a fixed type discriminant inside one
    /// nested object.
    TypedIdentifier {
        /// Field holding the discriminant.
        type_field: &'static str,
        /// Required discriminant value.
        type_value: &'static str,
    },
    /// Organisation membership, either exact or including all ancestors
    /// depending on a boolean toggle key.
    Membership {
        /// Field holding the directly affiliated organisation.
        exact_field: &'static str,
        /// Field holding the organisation and all its ancestors.
        ancestor_field: &'static str,
        /// Name of the flag key selecting the exact form.
        toggle: &'static str,
    },
}

/// An entry in a field taxonomy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryKey {
    /// Canonical parameter name.
    pub name: &'static str,
    /// Regex fragment matched against the normalised parameter name.
    pub name_pattern: &'static str,
    /// Value type.
    pub kind: ValueKind,
    /// How values combine.
    pub operator: SearchOperator,
    /// Target field paths; more than one means the fields are alternatives.
    pub fields: &'static [&'static str],
    /// Nested object path the clause is wrapped in.
    pub nested: Option<&'static str>,
    /// Pattern overriding the kind's element pattern.
    pub value_pattern: Option<&'static str>,
    /// Decode rule for raw values.
    pub encoding: ValueEncoding,
    /// Score multiplier for generic clauses.
    pub boost: f32,
    /// Companion field for composite values.
    pub sub_key: Option<&'static str>,
    /// Store map the key belongs to.
    pub scope: KeyScope,
    /// Bespoke clause shape.
    pub custom: Option<CustomClause>,
    /// Path below the API host for expanding identifier fragments to URIs.
    pub uri_prefix: Option<&'static str>,
    /// Aggregation dimension filtered by this key.
    pub facet: Option<&'static str>,
}

impl QueryKey {
    /// Creates a search key with default settings.
    pub const fn new(
        name: &'static str,
        name_pattern: &'static str,
        kind: ValueKind,
        operator: SearchOperator,
        fields: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            name_pattern,
            kind,
            operator,
            fields,
            nested: None,
            value_pattern: None,
            encoding: ValueEncoding::None,
            boost: 1.0,
            sub_key: None,
            scope: KeyScope::Search,
            custom: None,
            uri_prefix: None,
            facet: None,
        }
    }

    /// A control key (pagination, sort, aggregation, field selection).
    pub const fn control(
        name: &'static str,
        name_pattern: &'static str,
        kind: ValueKind,
        value_pattern: &'static str,
    ) -> Self {
        let mut key = Self::new(name, name_pattern, kind, SearchOperator::None, &[]);
        key.scope = KeyScope::Control;
        key.value_pattern = Some(value_pattern);
        key
    }

    /// A key with a bespoke clause shape.
    pub const fn custom(
        name: &'static str,
        name_pattern: &'static str,
        clause: CustomClause,
        fields: &'static [&'static str],
    ) -> Self {
        let mut key = Self::new(name, name_pattern, ValueKind::Custom, SearchOperator::AllOf, fields);
        key.custom = Some(clause);
        key
    }

    /// Overrides how values combine.
    pub const fn operator(mut self, operator: SearchOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Wraps the clause in a nested query on `path`.
    pub const fn nested(mut self, path: &'static str) -> Self {
        self.nested = Some(path);
        self
    }

    /// Overrides the value pattern.
    pub const fn pattern(mut self, pattern: &'static str) -> Self {
        self.value_pattern = Some(pattern);
        self
    }

    /// Percent-decodes values a second time.
    pub const fn decoded(mut self) -> Self {
        self.encoding = ValueEncoding::Decode;
        self
    }

    /// Sets the boost factor.
    pub const fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Sets the companion field of a composite value.
    pub const fn sub_key(mut self, field: &'static str) -> Self {
        self.sub_key = Some(field);
        self
    }

    /// Expands identifier fragments below `prefix` on the API host.
    pub const fn uri(mut self, prefix: &'static str) -> Self {
        self.uri_prefix = Some(prefix);
        self
    }

    /// Binds the key to an aggregation dimension.
    pub const fn facet(mut self, dimension: &'static str) -> Self {
        self.facet = Some(dimension);
        self
    }

    /// Marks the key as internal.
    pub const fn internal(mut self) -> Self {
        self.scope = KeyScope::Internal;
        self
    }

    /// Returns true for the unresolved key.
    pub fn is_invalid(&self) -> bool {
        self.kind == ValueKind::Invalid
    }

    /// Returns true if the key is compiled by a bespoke builder.
    pub fn is_custom(&self) -> bool {
        self.custom.is_some()
    }

    /// Splits a stored value into its elements using the merge delimiter.
    pub fn elements<'v>(&self, value: &'v str) -> Vec<&'v str> {
        value
            .split(self.operator.delimiter())
            .map(str::trim)
            .collect()
    }

    /// The value pattern applied to each element.
    pub fn element_pattern(&self) -> &'static str {
        self.value_pattern
            .unwrap_or_else(|| self.kind.element_pattern())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The key returned for names no taxonomy entry matches.
pub static INVALID: QueryKey =
    QueryKey::new("invalid", "", ValueKind::Invalid, SearchOperator::None, &[]).internal();
