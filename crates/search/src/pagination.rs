//! Offset pages, search-after cursors and navigation links.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;
use url::Url;

use crate::error::{ValidationError, ValueIssue};
use crate::params::ParameterStore;
use crate::taxonomy::control::{FROM, SEARCH_AFTER};

/// An opaque deep-pagination cursor.
///
/// Holds the sort values of the last hit of a page and is exchanged with
/// clients as URL-safe, unpadded base64 of their JSON array.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchAfterCursor {
    sort_values: Vec<Value>,
}

impl SearchAfterCursor {
    /// Creates a cursor from a hit's sort values.
    pub fn new(sort_values: Vec<Value>) -> Self {
        Self { sort_values }
    }

    /// Returns the sort values.
    pub fn sort_values(&self) -> &[Value] {
        &self.sort_values
    }

    /// Encodes the cursor to an opaque string.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(&self.sort_values).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes a cursor from an opaque string.
    pub fn decode(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidValue {
            issues: vec![ValueIssue::new(SEARCH_AFTER, s, "is not a valid cursor")],
        };

        let bytes = URL_SAFE_NO_PAD.decode(s).map_err(|_| invalid())?;
        let sort_values: Vec<Value> = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
        if sort_values.is_empty() {
            return Err(invalid());
        }
        Ok(Self { sort_values })
    }
}

/// Position of a page within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Offset of the first hit.
    pub offset: u64,
    /// Requested page size.
    pub size: u64,
    /// Total number of matching documents.
    pub total: u64,
}

impl PageWindow {
    /// Offset of the next page, if there is one.
    pub fn next_offset(&self) -> Option<u64> {
        let next = self.offset.saturating_add(self.size);
        (self.size > 0 && next < self.total).then_some(next)
    }

    /// Offset of the previous page, if there is one.
    pub fn previous_offset(&self) -> Option<u64> {
        if self.size == 0 {
            return None;
        }
        self.offset.checked_sub(self.size)
    }
}

/// Navigation links of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLinks {
    /// This page.
    pub self_link: Url,
    /// The following offset page.
    pub next: Option<Url>,
    /// The preceding offset page.
    pub previous: Option<Url>,
    /// The following page reached through a search-after cursor.
    pub next_search_after: Option<Url>,
}

/// Builds links from the canonical parameters of a validated store.
#[derive(Debug, Clone)]
pub struct Pager {
    base: Url,
    pairs: Vec<(String, String)>,
}

impl Pager {
    /// Creates a pager for links below `base`.
    pub fn new(base: Url, store: &ParameterStore) -> Self {
        Self {
            base,
            pairs: store.to_query_pairs(),
        }
    }

    /// Builds every link of the page.
    ///
    /// `last_sort` holds the sort values of the last hit and `hits` the number
    /// of hits actually returned. A page reached through a search-after
    /// cursor has no offset links; it only continues through the next cursor.
    pub fn links(&self, window: PageWindow, hits: usize, last_sort: Option<&[Value]>) -> PageLinks {
        let page_full = hits as u64 == window.size && window.size > 0;

        if self.is_cursor_page() {
            let next_search_after = match last_sort {
                Some(values) if page_full && !values.is_empty() => {
                    Some(self.search_after(&SearchAfterCursor::new(values.to_vec())))
                }
                _ => None,
            };
            return PageLinks {
                self_link: self.build(self.without(&[FROM])),
                next: None,
                previous: None,
                next_search_after,
            };
        }

        let next = window.next_offset().map(|offset| self.rewrite(offset));
        let previous = window.previous_offset().map(|offset| self.rewrite(offset));
        let next_search_after = match last_sort {
            Some(values) if page_full && next.is_some() && !values.is_empty() => {
                Some(self.search_after(&SearchAfterCursor::new(values.to_vec())))
            }
            _ => None,
        };

        PageLinks {
            self_link: self.rewrite(window.offset),
            next,
            previous,
            next_search_after,
        }
    }

    /// Whether the current page continues a search-after cursor.
    pub fn is_cursor_page(&self) -> bool {
        self.pairs.iter().any(|(name, _)| name == SEARCH_AFTER)
    }

    /// The current parameters with `from` set to `offset`.
    pub fn rewrite(&self, offset: u64) -> Url {
        self.build(self.replaced(FROM, &offset.to_string()))
    }

    /// The current parameters without `from`, continuing after `cursor`.
    pub fn search_after(&self, cursor: &SearchAfterCursor) -> Url {
        let mut pairs = self.without(&[FROM, SEARCH_AFTER]);
        pairs.push((SEARCH_AFTER.to_string(), cursor.encode()));
        self.build(pairs)
    }

    /// The current parameters with `name` set to `value` and `from` reset.
    ///
    /// Refinement is single-valued: a value already set for `name` is
    /// replaced, not extended, so a bucket link always narrows to exactly
    /// that bucket.
    pub fn refine(&self, name: &str, value: &str) -> Url {
        let mut pairs = self.replaced(name, value);
        pairs.retain(|(n, _)| n != SEARCH_AFTER);
        if let Some(pair) = pairs.iter_mut().find(|(n, _)| n == FROM) {
            pair.1 = "0".to_string();
        }
        self.build(pairs)
    }

    fn without(&self, names: &[&str]) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .filter(|(name, _)| !names.contains(&name.as_str()))
            .cloned()
            .collect()
    }

    fn replaced(&self, name: &str, value: &str) -> Vec<(String, String)> {
        let mut pairs = self.pairs.clone();
        match pairs.iter_mut().find(|(n, _)| n == name) {
            Some(pair) => pair.1 = value.to_string(),
            None => pairs.push((name.to_string(), value.to_string())),
        }
        pairs
    }

    fn build(&self, pairs: Vec<(String, String)>) -> Url {
        let mut url = self.base.clone();
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::taxonomy::publication::PUBLICATIONS;
    use crate::taxonomy::Catalogue;
    use crate::validate::Validator;

    fn pager(pairs: &[(&str, &str)]) -> Pager {
        let catalogue = Catalogue::new(&PUBLICATIONS, "https://api.test").unwrap();
        let store = Validator::new(&catalogue)
            .validate(pairs.iter().copied())
            .unwrap();
        Pager::new(Url::parse("https://api.test/search/resources").unwrap(), &store)
    }

    fn query_value(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_cursor_roundtrip() {
        let cursor = SearchAfterCursor::new(vec![json!(1.5), json!("abc")]);
        let decoded = SearchAfterCursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
        assert!(!cursor.encode().contains('='));
    }

    #[test]
    fn test_cursor_rejects_garbage() {
        assert!(SearchAfterCursor::decode("!!!").is_err());
        assert!(SearchAfterCursor::decode(&URL_SAFE_NO_PAD.encode("{}")).is_err());
        assert!(SearchAfterCursor::decode(&URL_SAFE_NO_PAD.encode("[]")).is_err());
    }

    #[test]
    fn test_window_bounds() {
        let window = PageWindow { offset: 0, size: 2, total: 5 };
        assert_eq!(window.next_offset(), Some(2));
        assert_eq!(window.previous_offset(), None);

        let window = PageWindow { offset: 4, size: 2, total: 5 };
        assert_eq!(window.next_offset(), None);
        assert_eq!(window.previous_offset(), Some(2));

        let window = PageWindow { offset: 1, size: 2, total: 5 };
        assert_eq!(window.previous_offset(), None);

        let window = PageWindow { offset: 3, size: 2, total: 5 };
        assert_eq!(window.next_offset(), None);
    }

    #[test]
    fn test_links_first_page() {
        let pager = pager(&[("size", "2"), ("from", "0"), ("title", "ocean")]);
        let window = PageWindow { offset: 0, size: 2, total: 5 };
        let sort = vec![json!(3.2), json!("id-2")];
        let links = pager.links(window, 2, Some(sort.as_slice()));

        assert_eq!(query_value(&links.self_link, "from").as_deref(), Some("0"));
        let next = links.next.unwrap();
        assert_eq!(query_value(&next, "from").as_deref(), Some("2"));
        assert_eq!(query_value(&next, "title").as_deref(), Some("ocean"));
        assert!(links.previous.is_none());

        let after = links.next_search_after.unwrap();
        assert!(query_value(&after, "from").is_none());
        assert!(query_value(&after, "searchAfter").is_some());
    }

    #[test]
    fn test_no_search_after_link_for_short_page() {
        let pager = pager(&[("size", "10")]);
        let window = PageWindow { offset: 0, size: 10, total: 30 };
        let sort = vec![json!(1)];
        let links = pager.links(window, 7, Some(sort.as_slice()));
        assert!(links.next.is_some());
        assert!(links.next_search_after.is_none());
    }

    #[test]
    fn test_refine_resets_offset() {
        let pager = pager(&[("from", "20"), ("type", "Book")]);
        let url = pager.refine("type", "AcademicArticle");
        assert_eq!(query_value(&url, "from").as_deref(), Some("0"));
        assert_eq!(query_value(&url, "type").as_deref(), Some("AcademicArticle"));

        let url = pager.refine("license", "CC-BY");
        assert_eq!(query_value(&url, "license").as_deref(), Some("CC-BY"));
    }

    #[test]
    fn test_refine_replaces_existing_values() {
        let cursor = encoded_cursor();
        let pager = pager(&[("type", "Book,Report"), ("searchAfter", cursor.as_str())]);
        let url = pager.refine("type", "AcademicArticle");
        assert_eq!(query_value(&url, "type").as_deref(), Some("AcademicArticle"));
        assert!(query_value(&url, "searchAfter").is_none());
    }

    fn encoded_cursor() -> String {
        SearchAfterCursor::new(vec![json!(1.0), json!("doc-1")]).encode()
    }

    #[test]
    fn test_cursor_page_has_no_offset_links() {
        let cursor = encoded_cursor();
        let pager = pager(&[("size", "2"), ("searchAfter", cursor.as_str())]);
        assert!(pager.is_cursor_page());

        let window = PageWindow { offset: 0, size: 2, total: 10 };
        let sort = vec![json!(0.5), json!("doc-3")];
        let links = pager.links(window, 2, Some(sort.as_slice()));

        assert!(links.next.is_none());
        assert!(links.previous.is_none());
        assert!(query_value(&links.self_link, "from").is_none());
        assert_eq!(
            query_value(&links.self_link, "searchAfter").as_deref(),
            Some(cursor.as_str())
        );

        let after = links.next_search_after.unwrap();
        let decoded =
            SearchAfterCursor::decode(&query_value(&after, "searchAfter").unwrap()).unwrap();
        assert_eq!(decoded.sort_values(), sort.as_slice());
    }

    #[test]
    fn test_cursor_page_ends_on_short_page() {
        let cursor = encoded_cursor();
        let pager = pager(&[("size", "2"), ("searchAfter", cursor.as_str())]);
        let window = PageWindow { offset: 0, size: 2, total: 10 };
        let sort = vec![json!(0.5), json!("doc-9")];
        let links = pager.links(window, 1, Some(sort.as_slice()));
        assert!(links.next_search_after.is_none());
        assert!(links.next.is_none());
    }
}
