//! HTTP request types for the PMP SDK.
//!
//! This module provides the [`HttpMethod`] type and the helpers that shape
//! request bodies before they are sent.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::UsageError;

/// HTTP methods the SDK can issue.
///
/// Link hints (`hints.allow`) name methods as strings; they are parsed
/// case-insensitively with [`FromStr`].
///
/// # Example
///
/// ```rust
/// use pmp_sdk::clients::HttpMethod;
///
/// let method: HttpMethod = "post".parse().unwrap();
/// assert_eq!(method, HttpMethod::Post);
/// assert_eq!(method.to_string(), "POST");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources and submitting forms.
    Post,
    /// HTTP PUT method for saving documents.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
    /// HTTP PATCH method.
    Patch,
    /// HTTP HEAD method.
    Head,
    /// HTTP OPTIONS method.
    Options,
}

impl HttpMethod {
    /// Returns `true` for methods whose request carries a body.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    pub(crate) const fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        };
        f.write_str(name)
    }
}

impl FromStr for HttpMethod {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(UsageError::UnsupportedMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// Converts form data into url-encodable pairs, dropping falsy values.
///
/// Falsy means `null`, `false`, `0`, `""`, `"0"`, and empty arrays or
/// objects. Only top-level values are filtered. Arrays and objects are
/// flattened into bracketed keys (`scope[0]`, `meta[label]`), skipping
/// nested nulls. Non-object input yields no pairs.
#[must_use]
pub fn form_params(data: &Value) -> Vec<(String, String)> {
    let Some(map) = data.as_object() else {
        return Vec::new();
    };

    let mut params = Vec::new();
    for (key, value) in map.iter().filter(|(_, value)| !is_falsy(value)) {
        push_param(&mut params, key.clone(), value);
    }
    params
}

fn push_param(params: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => params.push((key, s.clone())),
        Value::Number(n) => params.push((key, n.to_string())),
        Value::Bool(b) => params.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                push_param(params, format!("{key}[{i}]"), item);
            }
        }
        Value::Object(fields) => {
            for (name, field) in fields {
                push_param(params, format!("{key}[{name}]"), field);
            }
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
