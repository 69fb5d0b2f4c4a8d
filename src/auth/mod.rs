//! Authentication against the API's auth links.
//!
//! The home document of an API host carries a separate group of `auth`
//! links. Both flows resolve their requests through it:
//!
//! - [`AuthClient`]: client id/secret, issues and caches bearer tokens
//! - [`AuthUser`]: username/password, manages the user's client credentials
//! - [`AccessToken`]: a token as returned by the authentication server
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pmp_sdk::auth::AuthClient;
//! use pmp_sdk::hypermedia::{ApiContext, Document};
//!
//! let auth = Arc::new(AuthClient::new(host, "id", "secret", None, http.clone()).await?);
//! let doc = Document::fetch("https://api.pmp.io/docs", ApiContext::with_auth(http, auth)).await?;
//! ```

mod client;
mod endpoint;
mod token;
mod user;

pub use client::{AuthClient, ClientCredentials, URN_ISSUE, URN_REVOKE};
pub use token::AccessToken;
pub use user::{AuthUser, URN_CREATE, URN_LIST, URN_REMOVE};
