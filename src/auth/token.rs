//! Access tokens issued by the authentication server.
//!
//! The [`AccessToken`] type implements a custom [`Debug`] that masks the
//! token value, preventing accidental exposure in logs.
//!
//! # Example
//!
//! ```rust
//! use pmp_sdk::AccessToken;
//! use serde_json::json;
//!
//! let token = AccessToken::from_response(json!({
//!     "access_token": "abc123",
//!     "token_type": "Bearer",
//!     "token_expires_in": 86400
//! }))
//! .unwrap();
//!
//! assert_eq!(token.access_token, "abc123");
//! assert!(!format!("{token:?}").contains("abc123"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::hypermedia::lenient_u64;

/// An OAuth-style access token.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    /// The bearer token value.
    #[serde(default)]
    pub access_token: String,

    /// Token type, usually `"Bearer"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Seconds until the token expires.
    #[serde(
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_expires_in: Option<u64>,

    /// When the token was issued, as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_issue_date: Option<String>,

    /// Any other fields of the token response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccessToken {
    /// Parses a token response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the response is not an object or
    /// carries no access token.
    pub fn from_response(body: Value) -> Result<Self, Error> {
        serde_json::from_value::<Self>(body)
            .ok()
            .filter(|token| !token.access_token.is_empty())
            .ok_or_else(|| {
                Error::authentication("Unexpected empty token from the authentication server")
            })
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"*****")
            .field("token_type", &self.token_type)
            .field("token_expires_in", &self.token_expires_in)
            .field("token_issue_date", &self.token_issue_date)
            .finish_non_exhaustive()
    }
}
