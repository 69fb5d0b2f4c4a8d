//! HTTP transport types for PMP API communication.
//!
//! This module provides the transport layer every other part of the SDK
//! goes through. It issues one request per call, never retries, and turns
//! status codes into the SDK's error taxonomy.
//!
//! # Overview
//!
//! - [`HttpClient`]: bearer (document) and basic (auth) request shapes
//! - [`HttpMethod`]: methods named by link hints
//! - [`HttpResponse`]: a classified, successful response
//! - [`RemoteError`]: diagnostics for abnormal responses
//! - [`classify`]: the status-code contract
//!
//! # Status-Code Contract
//!
//! | Status | Outcome |
//! |--------|---------|
//! | 204 | success, no body |
//! | non-204 with empty body | [`Error::Remote`](crate::Error::Remote) |
//! | 401 | [`Error::Authentication`](crate::Error::Authentication) |
//! | 403, 404 | [`Error::NotFound`](crate::Error::NotFound) |
//! | other non-2xx | [`Error::Remote`](crate::Error::Remote) |
//! | 2xx with invalid JSON | [`Error::Remote`](crate::Error::Remote) |

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::RemoteError;
pub use http_client::{
    basic_auth_header, classify, DebugLevel, HttpClient, CONTENT_TYPE, DEBUG_ENV_VAR,
    SDK_VERSION, TIMEOUT, USER_AGENT_PREFIX,
};
pub use http_request::{form_params, HttpMethod};
pub use http_response::HttpResponse;
