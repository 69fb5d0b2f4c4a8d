//! # PMP SDK for Rust
//!
//! A client for the Public Media Platform API, a hypermedia API speaking
//! `application/vnd.collection.doc+json`. Documents expose relation-tagged
//! links and embedded items; clients navigate by following links rather
//! than building URLs.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`SdkConfig`] and [`SdkConfigBuilder`]
//! - Link resolution with URI Template expansion ([`Link`], [`LinkSet`])
//! - Documents, item sets and page-by-page iteration ([`Document`], [`ItemSet`], [`PageIterator`])
//! - Client-credentials tokens with caching ([`AuthClient`])
//! - Credential management for users ([`AuthUser`])
//! - A normalized error taxonomy over HTTP status codes ([`Error`])
//! - Portable sessions that skip re-authentication ([`PmpSdk::serialize`])
//!
//! ## Quick Start
//!
//! ```rust
//! use pmp_sdk::{HostUrl, SdkConfig};
//!
//! let config = SdkConfig::builder()
//!     .host(HostUrl::new("https://api.pmp.io").unwrap())
//!     .client_id("your-client-id")
//!     .client_secret("your-client-secret")
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Connecting and Querying
//!
//! ```rust,ignore
//! use pmp_sdk::{PageIterator, PmpSdk};
//! use serde_json::json;
//!
//! let sdk = PmpSdk::connect(config).await?;
//!
//! if let Some(results) = sdk.query_docs(&json!({"profile": {"OR": ["story", "audio"]}})).await? {
//!     let mut pages = PageIterator::new(results, Some(3));
//!     while pages.valid() {
//!         for item in pages.current().unwrap_or_default() {
//!             println!("{:?}", item.guid());
//!         }
//!         pages.next().await?;
//!     }
//! }
//! ```
//!
//! ## Following Links
//!
//! ```rust,ignore
//! let topics = sdk.home().links("query").rels(&["urn:collectiondoc:query:topics"]);
//! if let Some(link) = topics.first() {
//!     // A 403/404 yields Ok(None) rather than an error.
//!     let doc = link.follow(&json!({"limit": 5})).await?;
//! }
//! ```
//!
//! ## Logging
//!
//! Every request emits a `tracing` debug event. Setting the `DEBUG`
//! environment variable to `1` also logs each request line at info level;
//! `2` adds the response body.
//!
//! ## Design Principles
//!
//! - **No global state**: transport preferences are per-session configuration
//! - **One request per operation**: nothing is retried or run concurrently
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod hypermedia;
pub mod sdk;
pub mod session;

// Re-export public types at crate root for convenience
pub use auth::{AccessToken, AuthClient, AuthUser, ClientCredentials};
pub use config::{HostUrl, SdkConfig, SdkConfigBuilder, TransportOptions};
pub use error::{ConfigError, Error, SessionError, UsageError};
pub use sdk::PmpSdk;

// Re-export HTTP client types
pub use clients::{HttpClient, HttpMethod, HttpResponse, RemoteError};

// Re-export hypermedia types
pub use hypermedia::{ApiContext, Document, ItemSet, Link, LinkSet, PageIterator};
