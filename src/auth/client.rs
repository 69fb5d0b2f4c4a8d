//! Client-credentials authentication.
//!
//! An [`AuthClient`] trades a client id and secret for an access token and
//! caches it. Every bearer request made through a document with this client
//! attached uses the cached token.
//!
//! # Example
//!
//! ```rust,ignore
//! use pmp_sdk::auth::AuthClient;
//! use pmp_sdk::clients::HttpClient;
//! use pmp_sdk::{HostUrl, TransportOptions};
//!
//! let http = HttpClient::new(TransportOptions::default(), None);
//! let host = HostUrl::new("https://api.pmp.io")?;
//!
//! // Fetches the home document and a first token.
//! let auth = AuthClient::new(host, "client-id", "client-secret", None, http).await?;
//!
//! let token = auth.get_token(false).await?; // cached, no request
//! let fresh = auth.get_token(true).await?;  // always requests
//! auth.revoke_token().await?;
//! ```

use std::fmt;

use serde_json::json;
use tokio::sync::Mutex;

use crate::auth::endpoint::AuthEndpoint;
use crate::auth::token::AccessToken;
use crate::clients::{basic_auth_header, HttpClient};
use crate::config::HostUrl;
use crate::error::Error;
use crate::hypermedia::Document;

/// Relation of the auth link issuing tokens.
pub const URN_ISSUE: &str = "urn:collectiondoc:form:issuetoken";

/// Relation of the auth link revoking tokens.
pub const URN_REVOKE: &str = "urn:collectiondoc:form:revoketoken";

/// Grant type sent when requesting a token.
const CLIENT_CREDENTIALS_GRANT_TYPE: &str = "client_credentials";

/// A client id and secret.
///
/// The `Debug` implementation masks the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    /// Creates credentials, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if either value is empty.
    pub fn new(client_id: &str, client_secret: &str) -> Result<Self, Error> {
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(Error::authentication("Missing client credentials"));
        }
        Ok(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    /// Returns the client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    fn basic_auth(&self) -> String {
        basic_auth_header(&self.client_id, &self.client_secret)
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"*****")
            .finish()
    }
}

/// Authenticates as an API client and caches the access token.
pub struct AuthClient {
    credentials: ClientCredentials,
    basic_auth: String,
    endpoint: AuthEndpoint,
    token: Mutex<Option<AccessToken>>,
}

// Verify AuthClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthClient>();
};

impl AuthClient {
    /// Creates a client and fetches its first token.
    ///
    /// `home` is a pre-loaded home document; without one, it is fetched
    /// from `host` first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] for empty credentials (before any
    /// request is made) or a rejected token request, [`Error::Host`] if the
    /// host serves no home document, or any transport error.
    pub async fn new(
        host: HostUrl,
        client_id: &str,
        client_secret: &str,
        home: Option<Document>,
        http: HttpClient,
    ) -> Result<Self, Error> {
        let client = Self::from_parts(host, client_id, client_secret, home, None, http)?;
        client.get_token(false).await?;
        Ok(client)
    }

    /// Rebuilds a client from saved state without any request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] for empty credentials.
    pub fn from_parts(
        host: HostUrl,
        client_id: &str,
        client_secret: &str,
        home: Option<Document>,
        token: Option<AccessToken>,
        http: HttpClient,
    ) -> Result<Self, Error> {
        let credentials = ClientCredentials::new(client_id, client_secret)?;
        Ok(Self {
            basic_auth: credentials.basic_auth(),
            credentials,
            endpoint: AuthEndpoint::new(host, http, home),
            token: Mutex::new(token),
        })
    }

    /// Returns the cached token, requesting a new one if there is none or
    /// `refresh` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the server answers without an
    /// access token, [`crate::UsageError::MissingAuthLink`] if the home
    /// document has no issue link, or any transport error.
    pub async fn get_token(&self, refresh: bool) -> Result<AccessToken, Error> {
        let mut cached = self.token.lock().await;
        if !refresh {
            if let Some(token) = cached.as_ref() {
                return Ok(token.clone());
            }
        }

        let data = json!({ "grant_type": CLIENT_CREDENTIALS_GRANT_TYPE });
        let body = self
            .endpoint
            .request(URN_ISSUE, &data, &self.basic_auth)
            .await?;
        let token = AccessToken::from_response(body)?;
        tracing::debug!(
            "Issued access token for client {}",
            self.credentials.client_id()
        );

        *cached = Some(token.clone());
        Ok(token)
    }

    /// Revokes the token and clears the cache.
    ///
    /// The cache is cleared whenever the revoke request itself succeeds;
    /// the response body is not inspected.
    ///
    /// # Errors
    ///
    /// Returns the request error; the cached token is kept in that case.
    pub async fn revoke_token(&self) -> Result<(), Error> {
        let mut cached = self.token.lock().await;
        self.endpoint
            .request(URN_REVOKE, &json!({}), &self.basic_auth)
            .await?;
        *cached = None;
        tracing::debug!(
            "Revoked access token for client {}",
            self.credentials.client_id()
        );
        Ok(())
    }

    /// Returns the cached token without making a request.
    pub async fn cached_token(&self) -> Option<AccessToken> {
        self.token.lock().await.clone()
    }

    /// Returns the home document, fetching it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Host`] if the host serves no home document, or any
    /// transport error.
    pub async fn home(&self) -> Result<Document, Error> {
        self.endpoint.home().await
    }

    /// Returns the home document if it has been loaded.
    pub async fn cached_home(&self) -> Option<Document> {
        self.endpoint.cached_home().await
    }

    /// Returns the API host.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        self.endpoint.host()
    }

    /// Returns the transport used for auth requests.
    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        self.endpoint.http()
    }

    /// Returns the client credentials.
    #[must_use]
    pub const fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }
}

impl fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthClient")
            .field("host", self.host())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
