//! Hypermedia navigation over collection.doc+json documents.
//!
//! - [`Link`] and [`LinkSet`]: relation-tagged references, static or templated
//! - [`Document`]: a fetched or locally built document and its link groups
//! - [`ItemSet`]: the embedded items of one page, as documents
//! - [`PageIterator`]: a cursor following `next` navigation links
//! - [`template`]: URI Template expansion with the API's variable encoding

mod document;
mod items;
mod link;
mod link_set;
mod page_iterator;
pub mod template;

pub use document::{ApiContext, Document, URN_DELETE, URN_SAVE};
pub use items::{ItemSet, Pagination};
pub(crate) use link::lenient_u64;
pub use link::{Link, LinkData, LinkHints};
pub use link_set::LinkSet;
pub use page_iterator::PageIterator;
