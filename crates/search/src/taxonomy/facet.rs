//! Aggregation dimensions.

/// A count-by-distinct-value breakdown offered for faceted navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetDimension {
    /// Name of the dimension in requests and responses.
    pub name: &'static str,
    /// Query key whose values filter this dimension.
    pub key: &'static str,
    /// Keyword field counted.
    pub field: &'static str,
    /// Nested object path the field lives in.
    pub nested: Option<&'static str>,
    /// Source path (relative to the counted object) holding display labels.
    pub labels: Option<&'static str>,
    /// Count parent documents instead of nested objects.
    pub parent_count: bool,
    /// Maximum number of buckets.
    pub size: u32,
}

impl FacetDimension {
    /// A flat keyword dimension.
    pub const fn terms(name: &'static str, key: &'static str, field: &'static str) -> Self {
        Self {
            name,
            key,
            field,
            nested: None,
            labels: None,
            parent_count: false,
            size: 50,
        }
    }

    /// Places the dimension inside a nested object and counts parents.
    pub const fn nested(mut self, path: &'static str) -> Self {
        self.nested = Some(path);
        self.parent_count = true;
        self
    }

    /// Reads multilingual labels from `path`.
    pub const fn labels(mut self, path: &'static str) -> Self {
        self.labels = Some(path);
        self
    }

    /// Full document path of the labels, as source filtering expects it.
    ///
    /// Hits of a nested dimension return the nested object as their source,
    /// so [`FacetDimension::labels`] stays relative when reading them back.
    pub fn labels_source(&self) -> Option<String> {
        let labels = self.labels?;
        Some(match self.nested {
            Some(path) => format!("{path}.{labels}"),
            None => labels.to_string(),
        })
    }

    /// Sets the bucket limit.
    pub const fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}
