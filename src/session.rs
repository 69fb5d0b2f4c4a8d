//! Portable SDK sessions.
//!
//! A [`SessionEnvelope`] captures everything needed to rebuild a connected
//! [`PmpSdk`](crate::PmpSdk) without authenticating again: transport
//! options, host, client credentials, the cached token and the home
//! document. It is encoded as a three-character codec tag followed by the
//! payload:
//!
//! - `64=` + base64(JSON)
//! - `gz=` + base64(gzip(JSON))
//!
//! # Example
//!
//! ```rust
//! use pmp_sdk::session::{SessionCodec, SessionEnvelope};
//! use pmp_sdk::{HostUrl, TransportOptions};
//!
//! let envelope = SessionEnvelope::new(
//!     HostUrl::new("https://api.pmp.io").unwrap(),
//!     "client-id",
//!     "client-secret",
//! );
//!
//! let raw = envelope.encode(SessionCodec::Gzip).unwrap();
//! assert!(raw.starts_with("gz="));
//!
//! let decoded = SessionEnvelope::decode(&raw).unwrap();
//! assert_eq!(decoded.client_id, "client-id");
//! assert_eq!(decoded.options, TransportOptions::default());
//! ```
//!
//! # Security
//!
//! Encoded sessions contain the client secret and a live access token.
//! Treat them like credentials.

use std::fmt;
use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AccessToken;
use crate::config::{HostUrl, TransportOptions};
use crate::error::SessionError;

/// Current envelope schema version.
pub const SESSION_VERSION: u32 = 1;

/// Tag of gzip-compressed envelopes.
pub const GZIP_PREFIX: &str = "gz=";

/// Tag of plain base64 envelopes.
pub const BASE64_PREFIX: &str = "64=";

/// How an envelope is encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCodec {
    /// `gz=` + base64 of the gzip-compressed JSON.
    Gzip,
    /// `64=` + base64 of the JSON.
    Base64,
}

impl SessionCodec {
    /// Returns the codec tag.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Gzip => GZIP_PREFIX,
            Self::Base64 => BASE64_PREFIX,
        }
    }

    /// Returns the codec for a tag.
    #[must_use]
    pub fn from_prefix(tag: &str) -> Option<Self> {
        match tag {
            GZIP_PREFIX => Some(Self::Gzip),
            BASE64_PREFIX => Some(Self::Base64),
            _ => None,
        }
    }
}

/// A serialized SDK session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEnvelope {
    /// Schema version, [`SESSION_VERSION`] when written by this crate.
    pub version: u32,

    /// Transport preferences.
    #[serde(default)]
    pub options: TransportOptions,

    /// Whether the session re-serializes with the gzip codec.
    #[serde(default)]
    pub serial_zip: bool,

    /// Extra `User-Agent` prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent_prefix: Option<String>,

    /// API host.
    pub host: HostUrl,

    /// Client id.
    pub client_id: String,

    /// Client secret.
    pub client_secret: String,

    /// Cached access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<AccessToken>,

    /// Body of the home document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<Value>,
}

impl SessionEnvelope {
    /// Creates an envelope with default options and no cached state.
    #[must_use]
    pub fn new(host: HostUrl, client_id: &str, client_secret: &str) -> Self {
        Self {
            version: SESSION_VERSION,
            options: TransportOptions::default(),
            serial_zip: false,
            user_agent_prefix: None,
            host,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token: None,
            home: None,
        }
    }

    /// Encodes the envelope with `codec`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Json`] or [`SessionError::Compression`] if
    /// encoding fails.
    pub fn encode(&self, codec: SessionCodec) -> Result<String, SessionError> {
        let json = serde_json::to_vec(self)?;
        let payload = match codec {
            SessionCodec::Base64 => json,
            SessionCodec::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&json)?;
                encoder.finish()?
            }
        };
        Ok(format!("{}{}", codec.prefix(), STANDARD.encode(payload)))
    }

    /// Decodes an envelope produced by [`SessionEnvelope::encode`].
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] for an unknown tag, invalid base64, gzip
    /// or JSON, or an unsupported version.
    pub fn decode(raw: &str) -> Result<Self, SessionError> {
        let (tag, encoded) = raw
            .get(..3)
            .zip(raw.get(3..))
            .ok_or_else(|| SessionError::UnknownCodec {
                tag: raw.chars().take(3).collect(),
            })?;
        let codec = SessionCodec::from_prefix(tag).ok_or_else(|| SessionError::UnknownCodec {
            tag: tag.to_string(),
        })?;

        let bytes = STANDARD.decode(encoded.trim())?;
        let json = match codec {
            SessionCodec::Base64 => bytes,
            SessionCodec::Gzip => {
                let mut json = Vec::new();
                GzDecoder::new(bytes.as_slice()).read_to_end(&mut json)?;
                json
            }
        };

        let value: Value = serde_json::from_slice(&json)?;
        let version = value.get("version").and_then(Value::as_u64).unwrap_or(0);
        if version != u64::from(SESSION_VERSION) {
            return Err(SessionError::UnsupportedVersion {
                version: u32::try_from(version).unwrap_or(u32::MAX),
            });
        }
        Ok(serde_json::from_value(value)?)
    }
}

impl fmt::Debug for SessionEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEnvelope")
            .field("version", &self.version)
            .field("options", &self.options)
            .field("serial_zip", &self.serial_zip)
            .field("user_agent_prefix", &self.user_agent_prefix)
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .field("client_secret", &"*****")
            .field("token", &self.token)
            .field("home", &self.home.is_some())
            .finish()
    }
}
