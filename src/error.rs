//! Error types for the PMP SDK.
//!
//! Every fallible operation in the SDK returns [`Error`], whose variants map
//! one-to-one onto the failure classes a caller has to distinguish:
//!
//! - [`Error::Authentication`]: missing/invalid credentials, 401 responses,
//!   malformed token responses
//! - [`Error::NotFound`]: 403/404 responses
//! - [`Error::Host`]: the API host name could not be resolved, or is not an API
//! - [`Error::Remote`]: every other abnormal response (with diagnostics)
//! - [`Error::Usage`]: the caller asked for something the document can't give
//!
//! # Example
//!
//! ```rust
//! use pmp_sdk::{Error, UsageError};
//!
//! let err = Error::from(UsageError::MissingLink { urn: "urn:x".to_string() });
//! assert!(!err.is_not_found());
//! assert!(err.to_string().contains("urn:x"));
//! ```

use thiserror::Error;

use crate::clients::RemoteError;

/// Errors that can occur during SDK configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Host URL is invalid.
    #[error("Invalid host URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://api.pmp.io').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },
}

/// Errors caused by asking a link or document for something it cannot do.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// The link has neither `href` nor `href-template`.
    #[error("Cannot expand link because no href or href-template defined")]
    MissingHref,

    /// `options()` was called on a link that is not a defined href template.
    #[error("Cannot give link options because link is not a properly defined href template")]
    NotATemplate,

    /// No link with the relation exists in the document.
    #[error("Unable to find link {urn} in the document")]
    MissingLink {
        /// The relation that was looked up.
        urn: String,
    },

    /// No auth link with the relation exists in the home document.
    #[error("Unable to retrieve {urn} from the home document")]
    MissingAuthLink {
        /// The relation that was looked up.
        urn: String,
    },

    /// A link hint named an HTTP method the SDK can't issue.
    #[error("Unsupported HTTP method '{method}'")]
    UnsupportedMethod {
        /// The method as it appeared in the hint.
        method: String,
    },

    /// The document has no guid to save or delete it by.
    #[error("Document has no guid")]
    MissingGuid,
}

/// Errors decoding a persisted session envelope.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The codec tag is neither `gz=` nor `64=`.
    #[error("Unknown session codec tag '{tag}'")]
    UnknownCodec {
        /// The leading characters that were found.
        tag: String,
    },

    /// The payload is not valid base64.
    #[error("Invalid session encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload could not be compressed or decompressed.
    #[error("Invalid session compression: {0}")]
    Compression(#[from] std::io::Error),

    /// The decoded payload is not a valid envelope.
    #[error("Invalid session data: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope was written by an incompatible version.
    #[error("Unsupported session version {version}")]
    UnsupportedVersion {
        /// The version found in the envelope.
        version: u32,
    },
}

/// The SDK's top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or rejected credentials.
    #[error("Authentication error {0}")]
    Authentication(RemoteError),

    /// The resource does not exist or is not visible to these credentials.
    #[error("Not found {0}")]
    NotFound(RemoteError),

    /// The API host could not be reached or did not serve a home document.
    #[error("Host error {0}")]
    Host(RemoteError),

    /// Any other abnormal response from the API.
    #[error("Remote error {0}")]
    Remote(RemoteError),

    /// The caller asked a link or document for something it can't do.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Invalid SDK configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A persisted session could not be encoded or decoded.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Network or connection error other than host resolution.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl Error {
    /// Creates an authentication error carrying only a message.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(RemoteError::new(message))
    }

    /// Returns `true` for 403/404 outcomes.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns the HTTP status recorded on the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication(e) | Self::NotFound(e) | Self::Host(e) | Self::Remote(e) => {
                e.status
            }
            _ => None,
        }
    }

    /// Returns the remote diagnostics attached to the error, if any.
    #[must_use]
    pub const fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Authentication(e) | Self::NotFound(e) | Self::Host(e) | Self::Remote(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField { field: "host" };
        let message = error.to_string();
        assert!(message.contains("host"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_usage_error_names_the_relation() {
        let error = UsageError::MissingAuthLink {
            urn: "urn:collectiondoc:form:issuetoken".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unable to retrieve urn:collectiondoc:form:issuetoken from the home document"
        );
    }

    #[test]
    fn test_status_is_exposed_for_remote_classes() {
        let mut remote = RemoteError::new("Server Error");
        remote.status = Some(500);
        let error = Error::Remote(remote);
        assert_eq!(error.status(), Some(500));
        assert!(!error.is_not_found());

        let usage = Error::from(UsageError::MissingHref);
        assert_eq!(usage.status(), None);
        assert!(usage.remote().is_none());
    }

    #[test]
    fn test_authentication_helper_has_no_status() {
        let error = Error::authentication("Missing client credentials");
        assert!(matches!(error, Error::Authentication(_)));
        assert_eq!(error.status(), None);
        assert!(error.to_string().contains("Missing client credentials"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = Error::from(UsageError::NotATemplate);
        let _: &dyn std::error::Error = &error;
    }
}
