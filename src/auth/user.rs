//! Username/password authentication for managing client credentials.

use std::fmt;

use serde_json::{json, Value};

use crate::auth::endpoint::AuthEndpoint;
use crate::clients::{basic_auth_header, HttpClient};
use crate::config::HostUrl;
use crate::error::Error;
use crate::hypermedia::Document;

/// Relation of the auth link listing credentials.
pub const URN_LIST: &str = "urn:collectiondoc:form:listcredentials";

/// Relation of the auth link creating credentials.
pub const URN_CREATE: &str = "urn:collectiondoc:form:createcredentials";

/// Relation of the auth link removing credentials.
pub const URN_REMOVE: &str = "urn:collectiondoc:form:removecredentials";

/// A user managing their API client credentials.
///
/// Nothing is cached: every operation is one Basic-authenticated request.
///
/// # Example
///
/// ```rust,ignore
/// use pmp_sdk::auth::AuthUser;
///
/// let user = AuthUser::new(host, "username", "password", None, http);
/// let created = user.create_credential("read", 3600, "My app").await?;
/// let removed = user.remove_credential(created["client_id"].as_str().unwrap()).await?;
/// ```
pub struct AuthUser {
    username: String,
    basic_auth: String,
    endpoint: AuthEndpoint,
}

// Verify AuthUser is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthUser>();
};

impl AuthUser {
    /// Creates a user session. No request is made.
    #[must_use]
    pub fn new(
        host: HostUrl,
        username: &str,
        password: &str,
        home: Option<Document>,
        http: HttpClient,
    ) -> Self {
        Self {
            username: username.to_string(),
            basic_auth: basic_auth_header(username, password),
            endpoint: AuthEndpoint::new(host, http, home),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Lists the user's client credentials.
    ///
    /// # Errors
    ///
    /// Returns [`crate::UsageError::MissingAuthLink`] if the home document
    /// has no list link, or any transport error.
    pub async fn list_credentials(&self) -> Result<Value, Error> {
        self.endpoint
            .request(URN_LIST, &json!({}), &self.basic_auth)
            .await
    }

    /// Creates a client credential.
    ///
    /// `expires` is the lifetime in seconds of tokens issued for it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::UsageError::MissingAuthLink`] if the home document
    /// has no create link, or any transport error.
    pub async fn create_credential(
        &self,
        scope: &str,
        expires: u64,
        label: &str,
    ) -> Result<Value, Error> {
        let data = json!({
            "scope": scope,
            "label": label,
            "token_expires_in": expires,
        });
        self.endpoint
            .request(URN_CREATE, &data, &self.basic_auth)
            .await
    }

    /// Removes a client credential.
    ///
    /// Returns `false` if there was no such credential.
    ///
    /// # Errors
    ///
    /// Returns [`crate::UsageError::MissingAuthLink`] if the home document
    /// has no remove link, or any transport error other than not-found.
    pub async fn remove_credential(&self, client_id: &str) -> Result<bool, Error> {
        let data = json!({ "client_id": client_id });
        match self
            .endpoint
            .request(URN_REMOVE, &data, &self.basic_auth)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Credential {} not found", client_id);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthUser")
            .field("host", self.endpoint.host())
            .field("username", &self.username)
            .field("password", &"*****")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportOptions;

    #[test]
    fn test_debug_masks_password() {
        let user = AuthUser::new(
            HostUrl::new("https://api.pmp.io").unwrap(),
            "alice",
            "hunter2",
            None,
            HttpClient::new(TransportOptions::default(), None),
        );
        let debug = format!("{user:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains(&basic_auth_header("alice", "hunter2")));
    }
}
