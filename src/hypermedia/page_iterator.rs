//! Page-by-page traversal of item collections.
//!
//! # Example
//!
//! ```rust,ignore
//! use pmp_sdk::hypermedia::PageIterator;
//!
//! let mut pages = PageIterator::new(doc, Some(3));
//! while pages.valid() {
//!     let items = pages.current().unwrap_or_default();
//!     println!("page {:?}: {} items", pages.key(), items.len());
//!     pages.next().await?;
//! }
//! ```

use crate::error::Error;
use crate::hypermedia::document::Document;
use crate::hypermedia::items::ItemSet;

/// Navigation relation of the next page.
const NEXT_REL: &str = "next";

/// A cursor walking pages through `next` navigation links.
///
/// The cursor is either positioned on a document or exhausted. Exhaustion
/// is terminal until [`PageIterator::rewind`], which returns to the initial
/// document without a request.
#[derive(Clone, Debug)]
pub struct PageIterator {
    initial: Document,
    current: Option<Document>,
    last_page: Option<u64>,
}

impl PageIterator {
    /// Creates a cursor positioned on `doc`.
    ///
    /// With `page_limit` set to `Some(n)` (`n > 0`), at most `n` pages are
    /// visited, starting at `doc`. `None` or `Some(0)` walks until the
    /// server offers no further page.
    #[must_use]
    pub fn new(doc: Document, page_limit: Option<u64>) -> Self {
        let last_page = page_limit
            .filter(|limit| *limit > 0)
            .map(|limit| doc.pagination().page_num.saturating_add(limit - 1));

        Self {
            current: Some(doc.clone()),
            initial: doc,
            last_page,
        }
    }

    /// Returns to the initial document.
    pub fn rewind(&mut self) {
        self.current = Some(self.initial.clone());
    }

    /// Returns the items of the current page, or `None` once exhausted.
    #[must_use]
    pub fn current(&self) -> Option<ItemSet> {
        self.current.as_ref().map(Document::items)
    }

    /// Returns the current page number, or `None` once exhausted.
    #[must_use]
    pub fn key(&self) -> Option<u64> {
        self.current.as_ref().map(|doc| doc.pagination().page_num)
    }

    /// Returns the current document, or `None` once exhausted.
    #[must_use]
    pub const fn document(&self) -> Option<&Document> {
        self.current.as_ref()
    }

    /// Returns `true` while the cursor is positioned on a page.
    #[must_use]
    pub const fn valid(&self) -> bool {
        self.current.is_some()
    }

    /// Advances to the next page.
    ///
    /// Exhausts the cursor when there is no `next` link, when it points past
    /// the page limit, or when its target no longer exists.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the cursor stays where it was.
    pub async fn next(&mut self) -> Result<(), Error> {
        let Some(doc) = &self.current else {
            return Ok(());
        };

        let next = doc.navigation(NEXT_REL).filter(|link| match self.last_page {
            None => true,
            Some(last) => link.page_num().is_some_and(|page| page <= last),
        });

        self.current = match next {
            Some(link) => {
                tracing::debug!("Advancing to page {:?}: {}", link.page_num(), link);
                link.follow(&serde_json::Value::Null).await?
            }
            None => None,
        };
        Ok(())
    }
}
