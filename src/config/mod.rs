//! Configuration types for the PMP SDK.
//!
//! # Overview
//!
//! - [`TransportOptions`]: per-session transport preferences (gzip, minimal responses)
//! - [`SdkConfig`]: everything [`PmpSdk::connect`](crate::PmpSdk::connect) needs
//! - [`SdkConfigBuilder`]: a builder for [`SdkConfig`]
//! - [`HostUrl`]: a validated API host URL
//!
//! # Example
//!
//! ```rust
//! use pmp_sdk::{HostUrl, SdkConfig};
//!
//! let config = SdkConfig::builder()
//!     .host(HostUrl::new("https://api.pmp.io").unwrap())
//!     .client_id("my-client-id")
//!     .client_secret("my-client-secret")
//!     .gzip(false)
//!     .build()
//!     .unwrap();
//!
//! assert!(!config.options().gzip);
//! assert!(config.options().minimal);
//! ```

mod newtypes;

pub use newtypes::HostUrl;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Transport preferences for one SDK session.
///
/// Both preferences default to enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Ask for gzip/deflate compressed responses.
    pub gzip: bool,
    /// Ask for minimal responses on non-root paths (`Prefer: return=minimal`).
    pub minimal: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            gzip: true,
            minimal: true,
        }
    }
}

/// Configuration for connecting an SDK session.
///
/// # Security
///
/// The `Debug` implementation masks the client secret.
#[derive(Clone)]
pub struct SdkConfig {
    host: HostUrl,
    client_id: String,
    client_secret: String,
    options: TransportOptions,
    serial_zip: bool,
    user_agent_prefix: Option<String>,
}

impl SdkConfig {
    /// Creates a new builder for constructing an `SdkConfig`.
    #[must_use]
    pub fn builder() -> SdkConfigBuilder {
        SdkConfigBuilder::new()
    }

    /// Returns the API host URL.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
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

    /// Returns the transport preferences.
    #[must_use]
    pub const fn options(&self) -> TransportOptions {
        self.options
    }

    /// Returns whether serialized sessions are gzip-compressed.
    #[must_use]
    pub const fn serial_zip(&self) -> bool {
        self.serial_zip
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .field("client_secret", &"*****")
            .field("options", &self.options)
            .field("serial_zip", &self.serial_zip)
            .field("user_agent_prefix", &self.user_agent_prefix)
            .finish()
    }
}

// Verify SdkConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SdkConfig>();
};

/// Builder for constructing [`SdkConfig`] instances.
///
/// Required fields are `host`, `client_id` and `client_secret`. Credentials
/// are not checked for emptiness here; the auth client rejects empty ones
/// with an authentication error.
///
/// # Defaults
///
/// - `options`: gzip and minimal responses enabled
/// - `serial_zip`: `false` (base64 envelopes)
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct SdkConfigBuilder {
    host: Option<HostUrl>,
    client_id: Option<String>,
    client_secret: Option<String>,
    options: TransportOptions,
    serial_zip: bool,
    user_agent_prefix: Option<String>,
}

impl SdkConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API host URL (required).
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the client id (required).
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the client secret (required).
    #[must_use]
    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets all transport preferences at once.
    #[must_use]
    pub const fn options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables compressed responses.
    #[must_use]
    pub const fn gzip(mut self, gzip: bool) -> Self {
        self.options.gzip = gzip;
        self
    }

    /// Enables or disables minimal responses.
    #[must_use]
    pub const fn minimal(mut self, minimal: bool) -> Self {
        self.options.minimal = minimal;
        self
    }

    /// Selects the gzip codec for serialized sessions.
    #[must_use]
    pub const fn serial_zip(mut self, serial_zip: bool) -> Self {
        self.serial_zip = serial_zip;
        self
    }

    /// Sets a prefix for the `User-Agent` header.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `host`, `client_id`
    /// or `client_secret` was not set.
    pub fn build(self) -> Result<SdkConfig, ConfigError> {
        let host = self
            .host
            .ok_or(ConfigError::MissingRequiredField { field: "host" })?;
        let client_id = self
            .client_id
            .ok_or(ConfigError::MissingRequiredField { field: "client_id" })?;
        let client_secret = self.client_secret.ok_or(ConfigError::MissingRequiredField {
            field: "client_secret",
        })?;

        Ok(SdkConfig {
            host,
            client_id,
            client_secret,
            options: self.options,
            serial_zip: self.serial_zip,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HostUrl {
        HostUrl::new("https://api.pmp.io").unwrap()
    }

    #[test]
    fn test_builder_requires_host() {
        let result = SdkConfig::builder()
            .client_id("id")
            .client_secret("secret")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "host" })
        ));
    }

    #[test]
    fn test_builder_requires_credentials() {
        let result = SdkConfig::builder().host(host()).client_secret("s").build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "client_id" })
        ));

        let result = SdkConfig::builder().host(host()).client_id("id").build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "client_secret"
            })
        ));
    }

    #[test]
    fn test_builder_defaults() {
        let config = SdkConfig::builder()
            .host(host())
            .client_id("id")
            .client_secret("secret")
            .build()
            .unwrap();

        assert_eq!(config.options(), TransportOptions::default());
        assert!(config.options().gzip);
        assert!(config.options().minimal);
        assert!(!config.serial_zip());
        assert!(config.user_agent_prefix().is_none());
    }

    #[test]
    fn test_debug_masks_secret() {
        let config = SdkConfig::builder()
            .host(host())
            .client_id("id")
            .client_secret("super-secret")
            .build()
            .unwrap();

        let debug = format!("{config:?}");
        assert!(debug.contains("*****"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_transport_options_deserialize_with_defaults() {
        let options: TransportOptions = serde_json::from_str(r#"{"gzip":false}"#).unwrap();
        assert!(!options.gzip);
        assert!(options.minimal);
    }
}
