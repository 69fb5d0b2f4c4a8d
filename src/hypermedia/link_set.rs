//! Ordered collections of links with relation lookup.

use std::fmt;
use std::ops::Deref;

use serde_json::Value;

use crate::hypermedia::document::ApiContext;
use crate::hypermedia::link::Link;

/// An ordered set of [`Link`]s.
///
/// Filtering never mutates: [`LinkSet::rels`] returns a new set.
///
/// # Example
///
/// ```rust
/// use pmp_sdk::hypermedia::{ApiContext, LinkSet};
/// use serde_json::json;
///
/// let links = LinkSet::from_values(
///     &[
///         json!({"href": "/a", "rels": ["urn:a"]}),
///         json!({"href": "/bc", "rels": ["urn:b", "urn:c"]}),
///     ],
///     &ApiContext::default(),
/// );
///
/// let matched = links.rels(&["urn:c"]);
/// assert_eq!(matched.len(), 1);
/// assert_eq!(matched[0].to_string(), "/bc");
/// ```
#[derive(Clone, Debug, Default)]
pub struct LinkSet {
    links: Vec<Link>,
}

impl LinkSet {
    /// Creates a set from already-built links.
    #[must_use]
    pub const fn new(links: Vec<Link>) -> Self {
        Self { links }
    }

    /// Creates a set from raw JSON links.
    #[must_use]
    pub fn from_values(raw: &[Value], context: &ApiContext) -> Self {
        Self::new(
            raw.iter()
                .map(|link| Link::from_value(link, context))
                .collect(),
        )
    }

    /// Returns the links having at least one of `urns` as a relation.
    #[must_use]
    pub fn rels<S: AsRef<str>>(&self, urns: &[S]) -> Self {
        Self::new(
            self.links
                .iter()
                .filter(|link| link.has_any_rel(urns))
                .cloned()
                .collect(),
        )
    }

    /// Returns the first link with the relation `urn`.
    #[must_use]
    pub fn rel(&self, urn: &str) -> Option<Link> {
        self.links
            .iter()
            .find(|link| link.has_any_rel(&[urn]))
            .cloned()
    }

    /// Returns the first link in the set.
    #[must_use]
    pub fn first(&self) -> Option<&Link> {
        self.links.first()
    }

    /// Consumes the set, returning its links.
    #[must_use]
    pub fn into_inner(self) -> Vec<Link> {
        self.links
    }
}

impl Deref for LinkSet {
    type Target = [Link];

    fn deref(&self) -> &Self::Target {
        &self.links
    }
}

impl IntoIterator for LinkSet {
    type Item = Link;
    type IntoIter = std::vec::IntoIter<Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

impl fmt::Display for LinkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links: Vec<String> = self.links.iter().map(ToString::to_string).collect();
        write!(f, "LinkSet[{}]", links.join(","))
    }
}
