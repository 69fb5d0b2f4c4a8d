//! HTTP response types for the PMP SDK.

use serde_json::Value;

/// A successfully classified response from the API.
///
/// Only 2xx responses become an `HttpResponse`; everything else is turned
/// into an [`Error`](crate::Error) by the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The decoded JSON body, `None` for 204 No Content.
    pub body: Option<Value>,
}

impl HttpResponse {
    /// Creates a new response.
    #[must_use]
    pub const fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Consumes the response, returning its body or `null` when empty.
    #[must_use]
    pub fn into_body(self) -> Value {
        self.body.unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_body_defaults_to_null() {
        assert_eq!(HttpResponse::new(204, None).into_body(), Value::Null);
        assert_eq!(
            HttpResponse::new(200, Some(json!({"a": 1}))).into_body(),
            json!({"a": 1})
        );
    }
}
