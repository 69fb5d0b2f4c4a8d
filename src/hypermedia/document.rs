//! Collection.doc+json documents.
//!
//! A [`Document`] owns its JSON body and shares its [`ApiContext`] (the
//! transport plus an optional auth client) with every link and item derived
//! from it. Cloning a document copies the body and shares the context.
//!
//! # Body Layout
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "attributes": { "guid": "..." },
//!   "links": {
//!     "navigation": [{ "href": "...", "rels": ["self"], "pagenum": 1 }],
//!     "query": [{ "href-template": "...", "rels": ["urn:..."] }],
//!     "auth": [{ "href": "...", "rels": ["urn:..."], "hints": { "allow": ["POST"] } }]
//!   },
//!   "items": [ { ... }, { ... } ]
//! }
//! ```

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::auth::AuthClient;
use crate::clients::{HttpClient, HttpMethod};
use crate::config::TransportOptions;
use crate::error::{Error, UsageError};
use crate::hypermedia::items::{ItemSet, Pagination};
use crate::hypermedia::link::Link;
use crate::hypermedia::link_set::LinkSet;

/// Relation of the edit link used to save a document.
pub const URN_SAVE: &str = "urn:collectiondoc:form:documentsave";

/// Relation of the edit link used to delete a document.
pub const URN_DELETE: &str = "urn:collectiondoc:form:documentdelete";

/// Link group holding authentication links.
const AUTH_GROUP: &str = "auth";

/// Link group holding pagination links.
const NAVIGATION_GROUP: &str = "navigation";

/// Link groups the server owns; they are not sent back on save.
const READ_ONLY_GROUPS: &[&str] = &["query", "edit", "auth", "navigation", "creator"];

/// What a document needs to talk to the API.
#[derive(Clone, Debug)]
pub struct ApiContext {
    http: HttpClient,
    auth: Option<Arc<AuthClient>>,
}

impl ApiContext {
    /// Creates an unauthenticated context.
    #[must_use]
    pub const fn new(http: HttpClient) -> Self {
        Self { http, auth: None }
    }

    /// Creates a context that authenticates with `auth`.
    #[must_use]
    pub const fn with_auth(http: HttpClient, auth: Arc<AuthClient>) -> Self {
        Self {
            http,
            auth: Some(auth),
        }
    }

    /// Returns the transport.
    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Returns the auth client, if any.
    #[must_use]
    pub const fn auth(&self) -> Option<&Arc<AuthClient>> {
        self.auth.as_ref()
    }

    async fn bearer_token(&self) -> Result<Option<String>, Error> {
        match &self.auth {
            Some(auth) => Ok(Some(auth.get_token(false).await?.access_token)),
            None => Ok(None),
        }
    }
}

impl Default for ApiContext {
    fn default() -> Self {
        Self::new(HttpClient::new(TransportOptions::default(), None))
    }
}

/// A hypermedia document.
#[derive(Clone, Debug)]
pub struct Document {
    url: Option<String>,
    body: Value,
    context: ApiContext,
}

// Verify Document is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Document>();
};

impl Document {
    /// Creates a new, unsaved document.
    #[must_use]
    pub fn new(context: ApiContext) -> Self {
        Self::from_body(
            None,
            json!({"version": "1.0", "attributes": {}, "links": {}}),
            context,
        )
    }

    /// Creates a document from an already loaded body.
    #[must_use]
    pub const fn from_body(url: Option<String>, body: Value, context: ApiContext) -> Self {
        Self { url, body, context }
    }

    /// Fetches the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns the transport error, including [`Error::NotFound`] for 403/404.
    pub async fn fetch(url: &str, context: ApiContext) -> Result<Self, Error> {
        let token = context.bearer_token().await?;
        let response = context
            .http
            .bearer_request(HttpMethod::Get, url, token.as_deref(), None)
            .await?;
        Ok(Self::from_body(
            Some(url.to_string()),
            response.into_body(),
            context,
        ))
    }

    /// Fetches the document again from its URL.
    ///
    /// Unsaved documents have nothing to reload and are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    pub async fn reload(&mut self) -> Result<(), Error> {
        if let Some(url) = self.url.clone() {
            *self = Self::fetch(&url, self.context.clone()).await?;
        }
        Ok(())
    }

    /// Returns the URL the document was fetched from.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns the raw body.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Replaces the raw body.
    pub fn set_document(&mut self, body: Value) {
        self.body = body;
    }

    /// Attaches an auth client used for every following request.
    pub fn set_auth(&mut self, auth: Arc<AuthClient>) {
        self.context.auth = Some(auth);
    }

    /// Returns the context shared with derived links and items.
    #[must_use]
    pub const fn context(&self) -> &ApiContext {
        &self.context
    }

    /// Returns the `attributes` object.
    #[must_use]
    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        self.body.get("attributes").and_then(Value::as_object)
    }

    /// Returns the document guid.
    #[must_use]
    pub fn guid(&self) -> Option<&str> {
        self.attributes()?
            .get("guid")
            .and_then(Value::as_str)
            .filter(|g| !g.is_empty())
    }

    /// Returns every link in one link group (e.g. `"query"`, `"item"`).
    #[must_use]
    pub fn links(&self, group: &str) -> LinkSet {
        self.body
            .get("links")
            .and_then(|links| links.get(group))
            .and_then(Value::as_array)
            .map(|raw| LinkSet::from_values(raw, &self.context))
            .unwrap_or_default()
    }

    /// Replaces one link group.
    pub fn set_links(&mut self, group: &str, links: Vec<Value>) {
        if !self.body.is_object() {
            self.body = json!({});
        }
        let root = &mut self.body["links"];
        if !root.is_object() {
            *root = json!({});
        }
        root[group] = Value::Array(links);
    }

    /// Returns the first non-auth link with the relation `urn`.
    ///
    /// Groups are searched in group-name order, so a relation present in
    /// both `edit` and `query` resolves to the `edit` link.
    #[must_use]
    pub fn link(&self, urn: &str) -> Option<Link> {
        let groups = self.body.get("links").and_then(Value::as_object)?;
        groups
            .iter()
            .filter(|(group, _)| group.as_str() != AUTH_GROUP)
            .filter_map(|(_, raw)| raw.as_array())
            .find_map(|raw| LinkSet::from_values(raw, &self.context).rel(urn))
    }

    /// Returns the authentication link with the relation `urn`.
    #[must_use]
    pub fn auth(&self, urn: &str) -> Option<Link> {
        self.links(AUTH_GROUP).rel(urn)
    }

    /// Returns the navigation link with the relation `rel` (e.g. `"self"`, `"next"`).
    #[must_use]
    pub fn navigation(&self, rel: &str) -> Option<Link> {
        self.links(NAVIGATION_GROUP).rel(rel)
    }

    /// Returns the pagination facts from the `self` navigation link.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination::from_self_link(self.navigation("self").as_ref())
    }

    /// Returns one document per embedded item.
    #[must_use]
    pub fn items(&self) -> ItemSet {
        ItemSet::new(self)
    }

    /// Derives an item document: own body, shared context.
    pub(crate) fn derive(&self, body: Value) -> Self {
        let mut item = Self::from_body(None, body, self.context.clone());
        item.url = item.navigation("self").and_then(|l| l.href().map(String::from));
        item
    }

    /// Saves the document through its save edit link.
    ///
    /// The edit link is looked up on the document, then on the home
    /// document of the attached auth client.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::MissingGuid`] if the document has no guid,
    /// [`UsageError::MissingLink`] if no save link exists, or the transport
    /// error.
    pub async fn save(&mut self) -> Result<(), Error> {
        let guid = self.guid().ok_or(UsageError::MissingGuid)?.to_string();
        let link = self.edit_link(URN_SAVE).await?;
        let url = link.expand(&json!({ "guid": guid }))?;
        let method = match link.method()? {
            HttpMethod::Get => HttpMethod::Put,
            other => other,
        };

        let token = self.context.bearer_token().await?;
        let body = self.cleaned_body();
        let response = self
            .context
            .http
            .bearer_request(method, &url, token.as_deref(), Some(&body))
            .await?;

        let saved_url = response
            .body
            .as_ref()
            .and_then(|b| b.get("url"))
            .and_then(Value::as_str);
        self.url = Some(saved_url.map_or(url.clone(), String::from));
        tracing::debug!("Saved document {} to {}", guid, url);
        Ok(())
    }

    /// Deletes the document through its delete edit link.
    ///
    /// Returns `false` if the server had no such document.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::MissingGuid`] if the document has no guid,
    /// [`UsageError::MissingLink`] if no delete link exists, or the transport
    /// error.
    pub async fn delete(&self) -> Result<bool, Error> {
        let guid = self.guid().ok_or(UsageError::MissingGuid)?;
        let link = self.edit_link(URN_DELETE).await?;
        let url = link.expand(&json!({ "guid": guid }))?;
        let method = match link.method()? {
            HttpMethod::Get => HttpMethod::Delete,
            other => other,
        };

        let token = self.context.bearer_token().await?;
        match self
            .context
            .http
            .bearer_request(method, &url, token.as_deref(), None)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn edit_link(&self, urn: &str) -> Result<Link, Error> {
        if let Some(link) = self.link(urn) {
            return Ok(link);
        }
        if let Some(auth) = &self.context.auth {
            if let Some(link) = auth.home().await?.link(urn) {
                return Ok(link);
            }
        }
        Err(UsageError::MissingLink {
            urn: urn.to_string(),
        }
        .into())
    }

    fn cleaned_body(&self) -> Value {
        let mut body = self.body.clone();
        if let Some(root) = body.as_object_mut() {
            root.remove("items");
            if let Some(links) = root.get_mut("links").and_then(Value::as_object_mut) {
                links.retain(|group, _| !READ_ONLY_GROUPS.contains(&group.as_str()));
            }
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: Value) -> Document {
        Document::from_body(None, body, ApiContext::default())
    }

    fn sample() -> Document {
        doc(json!({
            "version": "1.0",
            "attributes": {"guid": "abc-123", "title": "Sample"},
            "links": {
                "navigation": [
                    {"href": "https://api.pmp.io/docs?page=2", "rels": ["self"], "pagenum": 2, "totalpages": 5, "totalitems": 42},
                    {"href": "https://api.pmp.io/docs?page=3", "rels": ["next"], "pagenum": 3}
                ],
                "query": [
                    {"href-template": "https://api.pmp.io/docs{?guid}", "rels": ["urn:collectiondoc:query:docs"]}
                ],
                "auth": [
                    {"href": "https://api.pmp.io/auth/access_token", "rels": ["urn:collectiondoc:form:issuetoken"], "hints": {"allow": ["POST"]}}
                ]
            },
            "items": [
                {"attributes": {"guid": "item-1"}, "links": {"navigation": [{"href": "https://api.pmp.io/docs/item-1", "rels": ["self"]}]}},
                {"attributes": {"guid": "item-2"}}
            ]
        }))
    }

    #[test]
    fn test_new_document_is_empty() {
        let d = Document::new(ApiContext::default());
        assert!(d.url().is_none());
        assert!(d.guid().is_none());
        assert!(d.links("query").is_empty());
        assert!(d.items().is_empty());
    }

    #[test]
    fn test_guid_and_attributes() {
        let d = sample();
        assert_eq!(d.guid(), Some("abc-123"));
        assert_eq!(d.attributes().unwrap()["title"], "Sample");
    }

    #[test]
    fn test_link_searches_non_auth_groups() {
        let d = sample();
        assert!(d.link("urn:collectiondoc:query:docs").is_some());
        assert!(d.link("urn:collectiondoc:form:issuetoken").is_none());
        assert!(d.link("urn:nope").is_none());
    }

    #[test]
    fn test_link_prefers_groups_by_name() {
        let d = Document::from_body(
            None,
            json!({"links": {
                "query": [{"href": "https://api.pmp.io/q", "rels": ["urn:shared"]}],
                "edit": [{"href": "https://api.pmp.io/e", "rels": ["urn:shared"]}]
            }}),
            ApiContext::default(),
        );
        assert_eq!(
            d.link("urn:shared").unwrap().href(),
            Some("https://api.pmp.io/e")
        );
    }

    #[test]
    fn test_auth_searches_only_auth_group() {
        let d = sample();
        let link = d.auth("urn:collectiondoc:form:issuetoken").unwrap();
        assert_eq!(link.method().unwrap(), HttpMethod::Post);
        assert!(d.auth("urn:collectiondoc:query:docs").is_none());
    }

    #[test]
    fn test_navigation_links() {
        let d = sample();
        assert_eq!(d.navigation("next").unwrap().page_num(), Some(3));
        assert!(d.navigation("prev").is_none());

        let pagination = d.pagination();
        assert_eq!(pagination.page_num, 2);
        assert_eq!(pagination.total_pages, 5);
        assert_eq!(pagination.total_items, 42);
    }

    #[test]
    fn test_derived_items_own_their_bodies() {
        let parent = sample();
        let mut items = parent.items().into_inner();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url(), Some("https://api.pmp.io/docs/item-1"));
        assert!(items[1].url().is_none());

        items[0].set_document(json!({"attributes": {"guid": "changed"}}));
        assert_eq!(items[0].guid(), Some("changed"));
        assert_eq!(items[1].guid(), Some("item-2"));
        assert_eq!(parent.items()[0].guid(), Some("item-1"));
    }

    #[test]
    fn test_set_links_creates_group() {
        let mut d = Document::new(ApiContext::default());
        d.set_links("profile", vec![json!({"href": "https://api.pmp.io/profiles/story"})]);
        assert_eq!(
            d.links("profile").first().unwrap().to_string(),
            "https://api.pmp.io/profiles/story"
        );

        let mut bare = doc(Value::Null);
        bare.set_links("collection", vec![json!({"href": "/c"})]);
        assert_eq!(bare.links("collection").len(), 1);
    }

    #[test]
    fn test_cleaned_body_drops_server_owned_parts() {
        let mut d = sample();
        d.set_links("profile", vec![json!({"href": "/profiles/story"})]);
        let cleaned = d.cleaned_body();

        assert!(cleaned.get("items").is_none());
        let links = cleaned["links"].as_object().unwrap();
        assert!(links.contains_key("profile"));
        assert!(!links.contains_key("navigation"));
        assert!(!links.contains_key("query"));
        assert!(!links.contains_key("auth"));
        assert_eq!(cleaned["attributes"]["guid"], "abc-123");
    }
}
