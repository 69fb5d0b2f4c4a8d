//! The SDK entry point.
//!
//! [`PmpSdk`] connects to an API host, authenticates, and exposes the home
//! document's fetch and query links as methods.
//!
//! # Example
//!
//! ```rust,ignore
//! use pmp_sdk::{HostUrl, PmpSdk, SdkConfig};
//! use serde_json::json;
//!
//! let config = SdkConfig::builder()
//!     .host(HostUrl::new("https://api.pmp.io")?)
//!     .client_id("client-id")
//!     .client_secret("client-secret")
//!     .build()?;
//!
//! let sdk = PmpSdk::connect(config).await?;
//!
//! if let Some(doc) = sdk.fetch_doc("04224975-e93c-4b17-9df9-96db37d318f3", &json!({})).await? {
//!     println!("{:?}", doc.attributes());
//! }
//!
//! let stories = sdk.query_docs(&json!({"profile": "story", "limit": 10})).await?;
//! ```

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::auth::AuthClient;
use crate::clients::HttpClient;
use crate::config::{SdkConfig, SdkConfigBuilder};
use crate::error::{Error, UsageError};
use crate::hypermedia::{ApiContext, Document, Link};
use crate::session::{SessionCodec, SessionEnvelope};

/// Fetch link for documents by guid or alias.
pub const FETCH_DOC: &str = "urn:collectiondoc:hreftpl:docs";
/// Fetch link for profiles by guid or alias.
pub const FETCH_PROFILE: &str = "urn:collectiondoc:hreftpl:profiles";
/// Fetch link for schemas by guid or alias.
pub const FETCH_SCHEMA: &str = "urn:collectiondoc:hreftpl:schemas";
/// Fetch link for topics by guid or alias.
pub const FETCH_TOPIC: &str = "urn:collectiondoc:hreftpl:topics";
/// Fetch link for users by guid or alias.
pub const FETCH_USER: &str = "urn:collectiondoc:hreftpl:users";
/// Query link for the items of one collection.
pub const QUERY_COLLECTION: &str = "urn:collectiondoc:query:collection";
/// Query link for documents.
pub const QUERY_DOCS: &str = "urn:collectiondoc:query:docs";
/// Query link for groups.
pub const QUERY_GROUPS: &str = "urn:collectiondoc:query:groups";
/// Query link for profiles.
pub const QUERY_PROFILES: &str = "urn:collectiondoc:query:profiles";
/// Query link for schemas.
pub const QUERY_SCHEMAS: &str = "urn:collectiondoc:query:schemas";
/// Query link for topics.
pub const QUERY_TOPICS: &str = "urn:collectiondoc:query:topics";
/// Query link for users.
pub const QUERY_USERS: &str = "urn:collectiondoc:query:users";

/// A connected, authenticated SDK session.
#[derive(Debug)]
pub struct PmpSdk {
    config: SdkConfig,
    http: HttpClient,
    home: Document,
    auth: Arc<AuthClient>,
}

// Verify PmpSdk is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PmpSdk>();
};

impl PmpSdk {
    /// Connects to the configured host.
    ///
    /// Fetches the home document, then authenticates with the client
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Host`] if the host name doesn't resolve or serves no
    /// home document, [`Error::Authentication`] for missing or rejected
    /// credentials, or any other transport error.
    pub async fn connect(config: SdkConfig) -> Result<Self, Error> {
        let http = HttpClient::new(config.options(), config.user_agent_prefix());

        let home = match Document::fetch(config.host().as_ref(), ApiContext::new(http.clone())).await
        {
            Ok(home) => home,
            Err(Error::NotFound(mut e)) => {
                e.message = "Host not found".to_string();
                return Err(Error::Host(e));
            }
            Err(e) => return Err(e),
        };

        let auth = AuthClient::new(
            config.host().clone(),
            config.client_id(),
            config.client_secret(),
            Some(home.clone()),
            http.clone(),
        )
        .await?;
        tracing::debug!("Connected to {}", config.host());

        Ok(Self::assemble(config, http, home, Arc::new(auth)))
    }

    fn assemble(config: SdkConfig, http: HttpClient, mut home: Document, auth: Arc<AuthClient>) -> Self {
        home.set_auth(Arc::clone(&auth));
        Self {
            config,
            http,
            home,
            auth,
        }
    }

    /// Returns the home document.
    #[must_use]
    pub const fn home(&self) -> &Document {
        &self.home
    }

    /// Returns the shared auth client.
    #[must_use]
    pub const fn auth(&self) -> &Arc<AuthClient> {
        &self.auth
    }

    /// Returns the configuration this session was built from.
    #[must_use]
    pub const fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Returns an authenticated context for building or fetching documents.
    #[must_use]
    pub fn context(&self) -> ApiContext {
        ApiContext::with_auth(self.http.clone(), Arc::clone(&self.auth))
    }

    fn home_link(&self, urn: &str) -> Result<Link, Error> {
        self.home.link(urn).ok_or_else(|| {
            UsageError::MissingLink {
                urn: urn.to_string(),
            }
            .into()
        })
    }

    async fn request(&self, urn: &str, vars: &Value) -> Result<Option<Document>, Error> {
        self.home_link(urn)?.submit(vars).await
    }

    async fn request_guid(
        &self,
        urn: &str,
        guid: &str,
        vars: &Value,
    ) -> Result<Option<Document>, Error> {
        let mut vars = vars.as_object().cloned().unwrap_or_default();
        vars.insert("guid".to_string(), Value::String(guid.to_string()));
        self.request(urn, &Value::Object(vars)).await
    }

    fn expand_guid(&self, urn: &str, guid: &str) -> Result<String, Error> {
        self.home_link(urn)?.expand(&json!({ "guid": guid }))
    }

    /// Fetches a document by guid or alias; `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::MissingLink`] if the home document has no fetch
    /// link, or any transport error other than not-found.
    pub async fn fetch_doc(&self, guid: &str, vars: &Value) -> Result<Option<Document>, Error> {
        self.request_guid(FETCH_DOC, guid, vars).await
    }

    /// Fetches a profile by guid or alias; `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::fetch_doc`].
    pub async fn fetch_profile(&self, guid: &str, vars: &Value) -> Result<Option<Document>, Error> {
        self.request_guid(FETCH_PROFILE, guid, vars).await
    }

    /// Fetches a schema by guid or alias; `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::fetch_doc`].
    pub async fn fetch_schema(&self, guid: &str, vars: &Value) -> Result<Option<Document>, Error> {
        self.request_guid(FETCH_SCHEMA, guid, vars).await
    }

    /// Fetches a topic by guid or alias; `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::fetch_doc`].
    pub async fn fetch_topic(&self, guid: &str, vars: &Value) -> Result<Option<Document>, Error> {
        self.request_guid(FETCH_TOPIC, guid, vars).await
    }

    /// Fetches a user by guid or alias; `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::fetch_doc`].
    pub async fn fetch_user(&self, guid: &str, vars: &Value) -> Result<Option<Document>, Error> {
        self.request_guid(FETCH_USER, guid, vars).await
    }

    /// Queries the items of the collection `guid`; `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::MissingLink`] if the home document has no such
    /// query link, or any transport error other than not-found.
    pub async fn query_collection(
        &self,
        guid: &str,
        vars: &Value,
    ) -> Result<Option<Document>, Error> {
        self.request_guid(QUERY_COLLECTION, guid, vars).await
    }

    /// Queries documents; `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::query_collection`].
    pub async fn query_docs(&self, vars: &Value) -> Result<Option<Document>, Error> {
        self.request(QUERY_DOCS, vars).await
    }

    /// Queries groups; `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::query_collection`].
    pub async fn query_groups(&self, vars: &Value) -> Result<Option<Document>, Error> {
        self.request(QUERY_GROUPS, vars).await
    }

    /// Queries profiles; `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::query_collection`].
    pub async fn query_profiles(&self, vars: &Value) -> Result<Option<Document>, Error> {
        self.request(QUERY_PROFILES, vars).await
    }

    /// Queries schemas; `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::query_collection`].
    pub async fn query_schemas(&self, vars: &Value) -> Result<Option<Document>, Error> {
        self.request(QUERY_SCHEMAS, vars).await
    }

    /// Queries topics; `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::query_collection`].
    pub async fn query_topics(&self, vars: &Value) -> Result<Option<Document>, Error> {
        self.request(QUERY_TOPICS, vars).await
    }

    /// Queries users; `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::query_collection`].
    pub async fn query_users(&self, vars: &Value) -> Result<Option<Document>, Error> {
        self.request(QUERY_USERS, vars).await
    }

    /// Returns the URL of a document by guid or alias.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::MissingLink`] if the home document has no
    /// fetch link for documents.
    pub fn href_doc(&self, guid: &str) -> Result<String, Error> {
        self.expand_guid(FETCH_DOC, guid)
    }

    /// Returns the URL of a profile by guid or alias.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::href_doc`].
    pub fn href_profile(&self, guid: &str) -> Result<String, Error> {
        self.expand_guid(FETCH_PROFILE, guid)
    }

    /// Returns the URL of a schema by guid or alias.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::href_doc`].
    pub fn href_schema(&self, guid: &str) -> Result<String, Error> {
        self.expand_guid(FETCH_SCHEMA, guid)
    }

    /// Returns the URL of a topic by guid or alias.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::href_doc`].
    pub fn href_topic(&self, guid: &str) -> Result<String, Error> {
        self.expand_guid(FETCH_TOPIC, guid)
    }

    /// Returns the URL of a user by guid or alias.
    ///
    /// # Errors
    ///
    /// See [`PmpSdk::href_doc`].
    pub fn href_user(&self, guid: &str) -> Result<String, Error> {
        self.expand_guid(FETCH_USER, guid)
    }

    /// Builds a new, unsaved document of the given profile.
    ///
    /// `init` replaces the empty body when given.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::MissingLink`] if the home document has no
    /// profile fetch link.
    pub fn new_doc(&self, profile: &str, init: Option<Value>) -> Result<Document, Error> {
        let href = self.expand_guid(FETCH_PROFILE, profile)?;
        let mut doc = Document::new(self.context());
        if let Some(body) = init.filter(|b| !b.is_null()) {
            doc.set_document(body);
        }
        doc.set_links("profile", vec![json!({ "href": href })]);
        Ok(doc)
    }

    /// Encodes this session, including the cached token and home document.
    ///
    /// The gzip codec is used when the configuration asks for `serial_zip`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] if encoding fails.
    pub async fn serialize(&self) -> Result<String, Error> {
        let mut envelope = SessionEnvelope::new(
            self.config.host().clone(),
            self.config.client_id(),
            self.config.client_secret(),
        );
        envelope.options = self.config.options();
        envelope.serial_zip = self.config.serial_zip();
        envelope.user_agent_prefix = self.config.user_agent_prefix().map(String::from);
        envelope.token = self.auth.cached_token().await;
        envelope.home = Some(self.home.body().clone());

        let codec = if self.config.serial_zip() {
            SessionCodec::Gzip
        } else {
            SessionCodec::Base64
        };
        Ok(envelope.encode(codec)?)
    }

    /// Rebuilds a session from [`PmpSdk::serialize`] output without any
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] for malformed input, or
    /// [`Error::Authentication`] if the stored credentials are empty.
    pub fn restore(raw: &str) -> Result<Self, Error> {
        let envelope = SessionEnvelope::decode(raw)?;

        let mut builder = SdkConfigBuilder::new()
            .host(envelope.host.clone())
            .client_id(envelope.client_id.as_str())
            .client_secret(envelope.client_secret.as_str())
            .options(envelope.options)
            .serial_zip(envelope.serial_zip);
        if let Some(prefix) = &envelope.user_agent_prefix {
            builder = builder.user_agent_prefix(prefix.as_str());
        }
        let config = builder.build()?;

        let http = HttpClient::new(config.options(), config.user_agent_prefix());
        let home_body = envelope.home.unwrap_or_else(|| Value::Object(Map::new()));
        let home = Document::from_body(
            Some(config.host().to_string()),
            home_body,
            ApiContext::new(http.clone()),
        );

        let auth = AuthClient::from_parts(
            config.host().clone(),
            config.client_id(),
            config.client_secret(),
            Some(home.clone()),
            envelope.token,
            http.clone(),
        )?;
        tracing::debug!("Restored session for {}", config.host());

        Ok(Self::assemble(config, http, home, Arc::new(auth)))
    }
}
