//! HTTP transport for PMP API communication.
//!
//! This module provides the [`HttpClient`] type, which issues exactly one
//! request per call in one of two shapes:
//!
//! - [`HttpClient::bearer_request`]: collection.doc+json requests carrying a
//!   bearer token, used for every document operation
//! - [`HttpClient::basic_request`]: form requests carrying Basic credentials,
//!   used only against the auth links of the home document
//!
//! Responses are classified by [`classify`] into a [`HttpResponse`] or a
//! typed [`Error`]. No request is ever retried.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::clients::errors::RemoteError;
use crate::clients::http_request::{form_params, HttpMethod};
use crate::clients::http_response::HttpResponse;
use crate::config::{HostUrl, TransportOptions};
use crate::error::Error;

/// Content type for requests via bearer authentication.
pub const CONTENT_TYPE: &str = "application/vnd.collection.doc+json";

/// Prefix of the `User-Agent` header, followed by the SDK version.
pub const USER_AGENT_PREFIX: &str = "rustsdk/v";

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timeout applied to every API request.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable controlling request echoing.
pub const DEBUG_ENV_VAR: &str = "DEBUG";

/// Request echo verbosity, read from [`DEBUG_ENV_VAR`] on every request.
///
/// `1` logs the request line and status, `2` also logs the response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    /// No echo.
    Off,
    /// Echo `status method url`.
    RequestLine,
    /// Echo the request line and the response body.
    Body,
}

impl DebugLevel {
    /// Parses a raw environment value.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("1") => Self::RequestLine,
            Some("2") => Self::Body,
            _ => Self::Off,
        }
    }

    /// Reads the current level from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(std::env::var(DEBUG_ENV_VAR).ok().as_deref())
    }
}

/// HTTP client for making requests to the PMP API.
///
/// The client is cheap to clone: clones share the underlying connection
/// pool and carry the same [`TransportOptions`].
///
/// # Example
///
/// ```rust,ignore
/// use pmp_sdk::clients::{HttpClient, HttpMethod};
/// use pmp_sdk::TransportOptions;
///
/// let client = HttpClient::new(TransportOptions::default(), None);
/// let response = client
///     .bearer_request(HttpMethod::Get, "https://api.pmp.io/docs", Some("token"), None)
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Per-session transport preferences.
    options: TransportOptions,
    /// Full `User-Agent` header value.
    user_agent: String,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Arguments
    ///
    /// * `options` - gzip and minimal-response preferences for this session
    /// * `user_agent_prefix` - Optional text placed before the SDK user agent
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(options: TransportOptions, user_agent_prefix: Option<&str>) -> Self {
        let user_agent = user_agent_prefix.map_or_else(
            || format!("{USER_AGENT_PREFIX}{SDK_VERSION}"),
            |prefix| format!("{prefix} {USER_AGENT_PREFIX}{SDK_VERSION}"),
        );

        // reqwest sends `Accept-Encoding: gzip, deflate` and decodes the body
        // itself while gzip/deflate are enabled.
        let mut builder = reqwest::Client::builder().use_rustls_tls().timeout(TIMEOUT);
        if !options.gzip {
            builder = builder.no_gzip().no_deflate();
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self {
            client,
            options,
            user_agent,
        }
    }

    /// Returns the transport preferences of this client.
    #[must_use]
    pub const fn options(&self) -> TransportOptions {
        self.options
    }

    /// Returns the `User-Agent` header value sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Makes a request using bearer token authentication.
    ///
    /// `body` is JSON-encoded for POST and PUT; it is ignored otherwise.
    /// A `Prefer: return=minimal` header is sent for every URL that has a
    /// path beyond the root, when the minimal preference is enabled.
    ///
    /// # Errors
    ///
    /// Returns the classified [`Error`] for any non-2xx response, decode
    /// failure, or transport failure.
    pub async fn bearer_request(
        &self,
        method: HttpMethod,
        url: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<HttpResponse, Error> {
        let mut request = self
            .client
            .request(method.as_reqwest(), url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", CONTENT_TYPE)
            .header("Content-Type", CONTENT_TYPE);

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body.filter(|b| method.has_body() && !b.is_null()) {
            request = request.body(body.to_string());
        }
        if self.options.minimal && has_non_root_path(url) {
            request = request.header("Prefer", "return=minimal");
        }

        self.send(method, url, request).await
    }

    /// Makes a request using basic authentication.
    ///
    /// `basic_auth` is the full header value (see [`basic_auth_header`]).
    /// For POST, `form` is url-encoded with falsy values dropped.
    ///
    /// # Errors
    ///
    /// Returns the classified [`Error`] for any non-2xx response, decode
    /// failure, or transport failure.
    pub async fn basic_request(
        &self,
        method: HttpMethod,
        url: &str,
        basic_auth: &str,
        form: Option<&Value>,
    ) -> Result<HttpResponse, Error> {
        let mut request = self
            .client
            .request(method.as_reqwest(), url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .header("Authorization", basic_auth);

        if method == HttpMethod::Post {
            let params = form.map(form_params).unwrap_or_default();
            if !params.is_empty() {
                request = request.form(&params);
            }
        }

        self.send(method, url, request).await
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<HttpResponse, Error> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if is_resolve_failure(&e) => {
                tracing::warn!("Unable to resolve host for {} {}: {}", method, url, e);
                return Err(Error::Host(
                    RemoteError::new("Unable to resolve host").with_request(method, url),
                ));
            }
            Err(e) => return Err(Error::Network(e)),
        };

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(%method, url, status, "PMP API request");
        match DebugLevel::from_env() {
            DebugLevel::Off => {}
            DebugLevel::RequestLine => tracing::info!("# {} {} {}", status, method, url),
            DebugLevel::Body => {
                tracing::info!("# {} {} {}", status, method, url);
                tracing::info!("  {}", body);
            }
        }

        classify(method, url, status, &body)
    }
}

/// Builds a `Basic` authorization header value from a user and password.
///
/// # Example
///
/// ```rust
/// use pmp_sdk::clients::basic_auth_header;
///
/// assert_eq!(basic_auth_header("id", "secret"), "Basic aWQ6c2VjcmV0");
/// ```
#[must_use]
pub fn basic_auth_header(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

/// Classifies a raw response into success or a typed error.
///
/// The checks run in this order:
///
/// 1. non-204 with empty body: remote error ("Empty Document")
/// 2. 401: authentication error
/// 3. 403, 404: not-found error
/// 4. below 200: remote error ("Informational")
/// 5. 300-399: remote error ("Redirection")
/// 6. 400-499: remote error ("Client Error")
/// 7. 500 and above: remote error ("Server Error")
/// 8. 2xx other than 204 whose body is not JSON: remote error ("JSON decode error")
///
/// # Errors
///
/// Returns the error class for `status` as described above.
pub fn classify(
    method: HttpMethod,
    url: &str,
    status: u16,
    body: &str,
) -> Result<HttpResponse, Error> {
    let remote = |message: &str| {
        RemoteError::new(message)
            .with_request(method, url)
            .with_response(status, body)
    };

    if status != 204 && body.is_empty() {
        return Err(Error::Remote(remote("Empty Document")));
    }

    match status {
        401 => Err(Error::Authentication(remote("Unauthorized"))),
        403 => Err(Error::NotFound(remote("Forbidden"))),
        404 => Err(Error::NotFound(remote("Not Found"))),
        0..=199 => Err(Error::Remote(remote("Informational"))),
        300..=399 => Err(Error::Remote(remote("Redirection"))),
        400..=499 => Err(Error::Remote(remote("Client Error"))),
        500.. => Err(Error::Remote(remote("Server Error"))),
        204 => Ok(HttpResponse::new(status, None)),
        _ => serde_json::from_str(body)
            .map(|json| HttpResponse::new(status, Some(json)))
            .map_err(|_| Error::Remote(remote("JSON decode error"))),
    }
}

/// Returns `true` when the URL has a path other than `/`.
/// Whether a connect error failed at name resolution.
///
/// Refused, reset and TLS failures are connect errors too, but reach
/// a resolved address.
fn is_resolve_failure(error: &reqwest::Error) -> bool {
    if !error.is_connect() {
        return false;
    }
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::TimedOut
            ) {
                return false;
            }
        }
        let message = cause.to_string();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        source = cause.source();
    }
    false
}

fn has_non_root_path(url: &str) -> bool {
    HostUrl::new(url).is_ok_and(|host| !matches!(host.path(), "" | "/"))
}
