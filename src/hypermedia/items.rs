//! Item collections derived from a document's embedded `items`.

use std::ops::Deref;

use serde_json::Value;

use crate::hypermedia::document::Document;
use crate::hypermedia::link::Link;

/// Pagination facts read from a document's `self` navigation link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// Total items across all pages; `0` when unknown.
    pub total_items: u64,
    /// Total page count; `1` when unknown.
    pub total_pages: u64,
    /// Current page number; `1` when unknown.
    pub page_num: u64,
}

impl Pagination {
    pub(crate) fn from_self_link(link: Option<&Link>) -> Self {
        Self {
            total_items: link.and_then(Link::total_items).unwrap_or(0),
            total_pages: link.and_then(Link::total_pages).unwrap_or(1),
            page_num: link.and_then(Link::page_num).unwrap_or(1),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::from_self_link(None)
    }
}

/// The items of one page, each as its own [`Document`].
///
/// Every item owns a copy of its raw body and shares the parent's
/// [`ApiContext`](crate::hypermedia::ApiContext), so mutating one item never
/// affects the parent or its siblings.
#[derive(Clone, Debug, Default)]
pub struct ItemSet {
    items: Vec<Document>,
    pagination: Pagination,
}

impl ItemSet {
    /// Derives the item set of `parent`.
    #[must_use]
    pub fn new(parent: &Document) -> Self {
        let items = parent
            .body()
            .get("items")
            .and_then(Value::as_array)
            .map(|raw| raw.iter().map(|item| parent.derive(item.clone())).collect())
            .unwrap_or_default();

        Self {
            items,
            pagination: parent.pagination(),
        }
    }

    /// Returns the total item count across all pages.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.pagination.total_items
    }

    /// Returns the total page count.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.pagination.total_pages
    }

    /// Returns the page these items belong to.
    #[must_use]
    pub const fn page_num(&self) -> u64 {
        self.pagination.page_num
    }

    /// Returns the first item.
    #[must_use]
    pub fn first(&self) -> Option<&Document> {
        self.items.first()
    }

    /// Consumes the set, returning its documents.
    #[must_use]
    pub fn into_inner(self) -> Vec<Document> {
        self.items
    }
}

impl Deref for ItemSet {
    type Target = [Document];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl IntoIterator for ItemSet {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ItemSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypermedia::document::ApiContext;
    use serde_json::json;

    fn parent(body: Value) -> Document {
        Document::from_body(None, body, ApiContext::default())
    }

    #[test]
    fn test_pagination_defaults_when_self_link_missing() {
        let items = parent(json!({"items": [{"attributes": {"guid": "a"}}]})).items();
        assert_eq!(items.total_items(), 0);
        assert_eq!(items.total_pages(), 1);
        assert_eq!(items.page_num(), 1);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_pagination_from_self_link() {
        let items = parent(json!({
            "links": {"navigation": [
                {"href": "/docs?page=3", "rels": ["self"], "pagenum": 3, "totalpages": 7, "totalitems": 68}
            ]},
            "items": []
        }))
        .items();
        assert_eq!(items.page_num(), 3);
        assert_eq!(items.total_pages(), 7);
        assert_eq!(items.total_items(), 68);
        assert!(items.is_empty());
        assert!(items.first().is_none());
    }

    #[test]
    fn test_items_keep_order() {
        let items = parent(json!({"items": [
            {"attributes": {"guid": "one"}},
            {"attributes": {"guid": "two"}},
            {"attributes": {"guid": "three"}}
        ]}))
        .items();

        let guids: Vec<&str> = items.iter().filter_map(Document::guid).collect();
        assert_eq!(guids, vec!["one", "two", "three"]);
        assert_eq!(items.first().and_then(Document::guid), Some("one"));
    }

    #[test]
    fn test_missing_items_is_empty() {
        let items = parent(json!({"attributes": {}})).items();
        assert!(items.is_empty());
        assert_eq!(items.into_iter().count(), 0);
    }
}
