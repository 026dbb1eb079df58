//! The typed parameter store.
//!
//! A [`ParameterStore`] holds the validated parameters of one request in two
//! disjoint ordered maps: search keys, which compile into the engine query,
//! and control keys, which steer pagination, ordering, aggregation and field
//! selection. Entries keep their insertion order so that rebuilt links list
//! parameters the way the client sent them.

use crate::aggregation::AggregationSelection;
use crate::taxonomy::control::{
    AGGREGATION, FIELDS, FROM, NODES_EXCLUDED, NODES_INCLUDED, PAGE, SEARCH_AFTER, SIZE, SORT,
};
use crate::taxonomy::{KeyScope, QueryKey};

/// A parameter with its merged value.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// The resolved key.
    pub key: &'static QueryKey,
    /// Merged value; repeated assignments are joined with the key's delimiter.
    pub value: String,
}

impl Entry {
    /// The value split on the key's delimiter.
    pub fn elements(&self) -> Vec<&str> {
        self.key.elements(&self.value)
    }
}

/// Validated parameters of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    search: Vec<Entry>,
    control: Vec<Entry>,
    required: Vec<&'static str>,
}

impl ParameterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store requiring `names`.
    pub fn with_required(names: impl IntoIterator<Item = &'static str>) -> Self {
        let mut store = Self::new();
        for name in names {
            if !store.required.contains(&name) {
                store.required.push(name);
            }
        }
        store
    }

    /// Names of the keys every validated store contains.
    pub fn required(&self) -> &[&'static str] {
        &self.required
    }

    fn map(&self, key: &QueryKey) -> &Vec<Entry> {
        match key.scope {
            KeyScope::Control => &self.control,
            _ => &self.search,
        }
    }

    fn map_mut(&mut self, key: &QueryKey) -> &mut Vec<Entry> {
        match key.scope {
            KeyScope::Control => &mut self.control,
            _ => &mut self.search,
        }
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.search
            .iter()
            .chain(self.control.iter())
            .find(|entry| entry.key.name == name)
    }

    /// Adds a value, merging with an existing value of the same key.
    pub fn merge(&mut self, key: &'static QueryKey, value: impl Into<String>) {
        let value = value.into();
        let delimiter = key.operator.delimiter();
        let map = self.map_mut(key);
        match map.iter_mut().find(|entry| entry.key.name == key.name) {
            Some(entry) => {
                entry.value.push(delimiter);
                entry.value.push_str(&value);
            }
            None => map.push(Entry { key, value }),
        }
    }

    /// Sets a value, replacing any existing value in place.
    pub fn set(&mut self, key: &'static QueryKey, value: impl Into<String>) {
        let value = value.into();
        let map = self.map_mut(key);
        match map.iter_mut().find(|entry| entry.key.name == key.name) {
            Some(entry) => entry.value = value,
            None => map.push(Entry { key, value }),
        }
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        for map in [&mut self.search, &mut self.control] {
            if let Some(index) = map.iter().position(|entry| entry.key.name == name) {
                return Some(map.remove(index).value);
            }
        }
        None
    }

    /// Returns true if the key is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Returns the merged value of a key.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry(name).map(|entry| entry.value.as_str())
    }

    /// Returns the value elements of a key.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.entry(name)
            .map(|entry| entry.elements())
            .unwrap_or_default()
    }

    /// Returns true if the key holds the value `true`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// Returns true if `key` is present in the map its scope selects.
    pub fn has(&self, key: &QueryKey) -> bool {
        self.map(key).iter().any(|entry| entry.key.name == key.name)
    }

    /// Search entries in insertion order.
    pub fn search_entries(&self) -> impl Iterator<Item = &Entry> {
        self.search.iter()
    }

    /// Control entries in insertion order.
    pub fn control_entries(&self) -> impl Iterator<Item = &Entry> {
        self.control.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.search.iter_mut().chain(self.control.iter_mut())
    }

    /// Offset of the first hit.
    pub fn from(&self) -> u64 {
        self.number(FROM).unwrap_or(0)
    }

    /// Page size.
    pub fn size(&self) -> u64 {
        self.number(SIZE).unwrap_or(0)
    }

    /// Page number, present only before normalisation.
    pub fn page(&self) -> Option<u64> {
        self.number(PAGE)
    }

    /// Sort expression.
    pub fn sort(&self) -> Option<&str> {
        self.get(SORT)
    }

    /// Aggregation selector.
    pub fn aggregation(&self) -> AggregationSelection {
        self.get(AGGREGATION)
            .map(AggregationSelection::parse)
            .unwrap_or(AggregationSelection::None)
    }

    /// Search-after cursor.
    pub fn search_after(&self) -> Option<&str> {
        self.get(SEARCH_AFTER)
    }

    /// Field paths restricting free-text search.
    pub fn searched_fields(&self) -> Vec<&str> {
        self.list(FIELDS)
    }

    /// `_source` paths explicitly included.
    pub fn included_nodes(&self) -> Vec<&str> {
        self.list(NODES_INCLUDED)
    }

    /// `_source` paths explicitly excluded.
    pub fn excluded_nodes(&self) -> Vec<&str> {
        self.list(NODES_EXCLUDED)
    }

    fn list(&self, name: &str) -> Vec<&str> {
        self.values(name)
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect()
    }

    fn number(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(|value| value.trim().parse().ok())
    }

    /// Canonical `(name, value)` pairs, control keys first.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.control
            .iter()
            .chain(self.search.iter())
            .map(|entry| (entry.key.name.to_string(), entry.value.clone()))
            .collect()
    }
}
