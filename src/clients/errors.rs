//! Diagnostics carried by errors that came back from the API.
//!
//! A [`RemoteError`] records what was asked and what was answered: the
//! request method and URL, the response status, and the raw response text.
//! It is wrapped by the [`Error`](crate::Error) variants that classify the
//! failure (authentication, not-found, host, remote).
//!
//! # Example
//!
//! ```rust
//! use pmp_sdk::clients::{HttpMethod, RemoteError};
//!
//! let error = RemoteError::new("Server Error")
//!     .with_request(HttpMethod::Get, "https://api.pmp.io/docs")
//!     .with_response(500, r#"{"error":"boom"}"#);
//!
//! assert_eq!(error.to_string(), "[500]: Server Error => GET https://api.pmp.io/docs");
//! assert_eq!(error.json_body().unwrap()["error"], "boom");
//! ```

use std::fmt;

use crate::clients::http_request::HttpMethod;

/// An abnormal outcome of an API request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteError {
    /// Short classification message (e.g. "Not Found", "Server Error").
    pub message: String,
    /// The HTTP method of the failed request.
    pub method: Option<HttpMethod>,
    /// The absolute URL of the failed request.
    pub url: Option<String>,
    /// The HTTP status code of the response.
    pub status: Option<u16>,
    /// The raw response body.
    pub body: Option<String>,
}

impl RemoteError {
    /// Creates an error with a message and no request diagnostics.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            method: None,
            url: None,
            status: None,
            body: None,
        }
    }

    /// Records the request that failed.
    #[must_use]
    pub fn with_request(mut self, method: HttpMethod, url: impl Into<String>) -> Self {
        self.method = Some(method);
        self.url = Some(url.into());
        self
    }

    /// Records the response that was received.
    #[must_use]
    pub fn with_response(mut self, status: u16, body: impl Into<String>) -> Self {
        self.status = Some(status);
        self.body = Some(body.into());
        self
    }

    /// Returns the response body parsed as JSON, if it is a JSON object.
    #[must_use]
    pub fn json_body(&self) -> Option<serde_json::Value> {
        let value: serde_json::Value = serde_json::from_str(self.body.as_deref()?).ok()?;
        value.is_object().then_some(value)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.status.unwrap_or(0), self.message)?;
        if self.method.is_some() || self.url.is_some() {
            f.write_str(" =>")?;
            if let Some(method) = &self.method {
                write!(f, " {method}")?;
            }
            if let Some(url) = &self.url {
                write!(f, " {url}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_request_details() {
        let error = RemoteError::new("Missing client credentials");
        assert_eq!(error.to_string(), "[0]: Missing client credentials");
    }

    #[test]
    fn test_display_with_request_details() {
        let error = RemoteError::new("Not Found")
            .with_request(HttpMethod::Delete, "https://api.pmp.io/docs/abc")
            .with_response(404, "{}");
        assert_eq!(
            error.to_string(),
            "[404]: Not Found => DELETE https://api.pmp.io/docs/abc"
        );
    }

    #[test]
    fn test_json_body_ignores_non_objects() {
        let error = RemoteError::new("Server Error").with_response(500, "<html>oops</html>");
        assert!(error.json_body().is_none());

        let error = RemoteError::new("Client Error").with_response(400, "[1, 2]");
        assert!(error.json_body().is_none());

        let error = RemoteError::new("Client Error").with_response(400, r#"{"errors":["bad"]}"#);
        assert_eq!(error.json_body().unwrap()["errors"][0], "bad");
    }
}
