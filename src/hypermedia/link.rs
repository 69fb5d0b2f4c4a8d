//! A single collection.doc+json link.
//!
//! A link is either static (`href`) or templated (`href-template` plus the
//! declared `href-vars`). Static hrefs always win: expanding a link with an
//! `href` returns it verbatim, whatever variables are passed.
//!
//! # Example
//!
//! ```rust
//! use pmp_sdk::hypermedia::{ApiContext, Link};
//! use serde_json::json;
//!
//! let ctx = ApiContext::default();
//! let link = Link::from_value(
//!     &json!({"href-template": "https://api.pmp.io/docs{?guid}", "rels": ["urn:collectiondoc:hreftpl:docs"]}),
//!     &ctx,
//! );
//!
//! assert_eq!(link.expand(&json!({"guid": "abc"})).unwrap(), "https://api.pmp.io/docs?guid=abc");
//! assert_eq!(link.to_string(), "https://api.pmp.io/docs{?guid}");
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::clients::HttpMethod;
use crate::error::{Error, UsageError};
use crate::hypermedia::document::{ApiContext, Document};
use crate::hypermedia::template;

/// Method hints attached to a link.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkHints {
    /// Permitted HTTP methods, preferred first.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Any other hint fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The raw fields of a link, as they appear on the wire.
///
/// Fields outside the known set are kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    /// Absolute URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// URI Template string.
    #[serde(
        rename = "href-template",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub href_template: Option<String>,
    /// Declared template variables.
    #[serde(rename = "href-vars", default, skip_serializing_if = "Option::is_none")]
    pub href_vars: Option<Value>,
    /// Method hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<LinkHints>,
    /// Relation identifiers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rels: Vec<String>,
    /// Page number (navigation links).
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub pagenum: Option<u64>,
    /// Total page count (navigation links).
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub totalpages: Option<u64>,
    /// Total item count (navigation links).
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub totalitems: Option<u64>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts a non-negative integer or a numeric string; anything else is `None`.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A navigable (or templated) reference to another document.
#[derive(Clone, Debug)]
pub struct Link {
    data: LinkData,
    context: ApiContext,
}

impl Link {
    /// Creates a link from its fields and the context used to follow it.
    #[must_use]
    pub const fn new(data: LinkData, context: ApiContext) -> Self {
        Self { data, context }
    }

    /// Creates a link from raw JSON.
    ///
    /// Malformed input produces a link with no fields, which fails to expand.
    #[must_use]
    pub fn from_value(raw: &Value, context: &ApiContext) -> Self {
        let data = serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
            tracing::debug!("Ignoring malformed link {}: {}", raw, e);
            LinkData::default()
        });
        Self::new(data, context.clone())
    }

    /// Returns the raw link fields.
    #[must_use]
    pub const fn data(&self) -> &LinkData {
        &self.data
    }

    /// Returns the `href`, if set and non-empty.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        self.data.href.as_deref().filter(|h| !h.is_empty())
    }

    /// Returns the `href-template`, if set and non-empty.
    #[must_use]
    pub fn href_template(&self) -> Option<&str> {
        self.data.href_template.as_deref().filter(|h| !h.is_empty())
    }

    /// Returns the relation identifiers.
    #[must_use]
    pub fn rels(&self) -> &[String] {
        &self.data.rels
    }

    /// Returns `true` if any of `urns` is one of this link's relations.
    #[must_use]
    pub fn has_any_rel<S: AsRef<str>>(&self, urns: &[S]) -> bool {
        urns.iter()
            .any(|urn| self.data.rels.iter().any(|rel| rel == urn.as_ref()))
    }

    /// Returns the page number of a navigation link.
    #[must_use]
    pub const fn page_num(&self) -> Option<u64> {
        self.data.pagenum
    }

    /// Returns the total page count of a navigation link.
    #[must_use]
    pub const fn total_pages(&self) -> Option<u64> {
        self.data.totalpages
    }

    /// Returns the total item count of a navigation link.
    #[must_use]
    pub const fn total_items(&self) -> Option<u64> {
        self.data.totalitems
    }

    /// Returns the preferred HTTP method: the first `hints.allow` entry, or GET.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::UnsupportedMethod`] if the hint names an
    /// unknown method.
    pub fn method(&self) -> Result<HttpMethod, UsageError> {
        self.data
            .hints
            .as_ref()
            .and_then(|hints| hints.allow.first())
            .map_or(Ok(HttpMethod::Get), |method| method.parse())
    }

    /// Resolves the link to a concrete URL.
    ///
    /// `vars` is only used for templated links; non-object values count as
    /// no variables.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::MissingHref`] if the link has neither `href`
    /// nor `href-template`.
    pub fn expand(&self, vars: &Value) -> Result<String, Error> {
        if let Some(href) = self.href() {
            return Ok(href.to_string());
        }
        let tpl = self.href_template().ok_or(UsageError::MissingHref)?;
        Ok(template::expand(tpl, &template::encode_vars(vars)))
    }

    /// Follows the link, fetching the document it points to.
    ///
    /// A 403/404 answer means the document isn't there and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns any other error from expansion or the fetch.
    pub async fn follow(&self, vars: &Value) -> Result<Option<Document>, Error> {
        let url = self.expand(vars)?;
        match Document::fetch(&url, self.context.clone()).await {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Link target not found: {}", url);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Submits form-style parameters through the link; same as [`Link::follow`].
    ///
    /// # Errors
    ///
    /// See [`Link::follow`].
    pub async fn submit(&self, params: &Value) -> Result<Option<Document>, Error> {
        self.follow(params).await
    }

    /// Returns the declared template variables.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::NotATemplate`] unless the link has both an
    /// `href-template` and non-empty `href-vars`.
    pub fn options(&self) -> Result<&Value, Error> {
        if self.href_template().is_none() {
            return Err(UsageError::NotATemplate.into());
        }
        match &self.data.href_vars {
            Some(vars) if !is_empty_value(vars) => Ok(vars),
            _ => Err(UsageError::NotATemplate.into()),
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(o) => o.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.href().or_else(|| self.href_template()).unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(raw: &Value) -> Link {
        Link::from_value(raw, &ApiContext::default())
    }

    #[test]
    fn test_href_wins_over_template_and_ignores_vars() {
        let l = link(&json!({
            "href": "https://api.pmp.io/docs/123",
            "href-template": "https://api.pmp.io/docs{?guid}",
        }));
        assert_eq!(
            l.expand(&json!({"guid": "abc", "other": true})).unwrap(),
            "https://api.pmp.io/docs/123"
        );
    }

    #[test]
    fn test_template_expansion_contains_variable() {
        let l = link(&json!({"href-template": "https://api.pmp.io/docs{?guid}"}));
        let url = l.expand(&json!({"guid": "abc"})).unwrap();
        assert!(url.contains("guid=abc"));
    }

    #[test]
    fn test_empty_href_falls_back_to_template() {
        let l = link(&json!({"href": "", "href-template": "https://api.pmp.io/docs{/guid}"}));
        assert_eq!(l.expand(&json!({"guid": "x"})).unwrap(), "https://api.pmp.io/docs/x");
    }

    #[test]
    fn test_expand_without_href_is_usage_error() {
        let l = link(&json!({"rels": ["urn:a"]}));
        assert!(matches!(
            l.expand(&Value::Null),
            Err(Error::Usage(UsageError::MissingHref))
        ));
    }

    #[test]
    fn test_options_requires_template_and_vars() {
        let l = link(&json!({"href-template": "/docs{?guid}", "href-vars": {"guid": "https://docs"}}));
        assert_eq!(l.options().unwrap()["guid"], "https://docs");

        let no_vars = link(&json!({"href-template": "/docs{?guid}"}));
        assert!(matches!(
            no_vars.options(),
            Err(Error::Usage(UsageError::NotATemplate))
        ));

        let static_link = link(&json!({"href": "/docs", "href-vars": {"guid": "x"}}));
        assert!(matches!(
            static_link.options(),
            Err(Error::Usage(UsageError::NotATemplate))
        ));
    }

    #[test]
    fn test_display_prefers_href_then_template() {
        assert_eq!(link(&json!({"href": "/a", "href-template": "/b"})).to_string(), "/a");
        assert_eq!(link(&json!({"href-template": "/b"})).to_string(), "/b");
        assert_eq!(link(&json!({})).to_string(), "");
    }

    #[test]
    fn test_method_from_hints() {
        assert_eq!(link(&json!({"href": "/a"})).method().unwrap(), HttpMethod::Get);
        assert_eq!(
            link(&json!({"href": "/a", "hints": {"allow": ["post", "get"]}}))
                .method()
                .unwrap(),
            HttpMethod::Post
        );
        assert_eq!(
            link(&json!({"href": "/a", "hints": {"allow": []}}))
                .method()
                .unwrap(),
            HttpMethod::Get
        );
    }

    #[test]
    fn test_navigation_fields_accept_numbers_and_strings() {
        let l = link(&json!({"href": "/a", "rels": ["self"], "pagenum": 2, "totalpages": "5"}));
        assert_eq!(l.page_num(), Some(2));
        assert_eq!(l.total_pages(), Some(5));
        assert_eq!(l.total_items(), None);
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let l = link(&json!({"href": "/a", "title": "A doc", "method": "x"}));
        assert_eq!(l.data().extra["title"], "A doc");
        assert_eq!(l.data().extra["method"], "x");
    }

    #[test]
    fn test_malformed_link_has_no_href() {
        let l = link(&json!({"href": 42}));
        assert!(l.href().is_none());
        assert!(l.expand(&Value::Null).is_err());
    }

    #[test]
    fn test_has_any_rel_uses_intersection() {
        let l = link(&json!({"href": "/a", "rels": ["urn:b", "urn:c"]}));
        assert!(l.has_any_rel(&["urn:c"]));
        assert!(l.has_any_rel(&["urn:x", "urn:b"]));
        assert!(!l.has_any_rel(&["urn:a"]));
        assert!(!l.has_any_rel::<&str>(&[]));
    }
}
