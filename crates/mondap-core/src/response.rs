//! Successful API response representation.

use serde_json::Value;

/// A successful (2xx) API response.
///
/// Payload shapes are a caller concern; the body stays opaque JSON.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded response body.
    pub body: Value,
}

impl ApiResponse {
    /// Create a response from a status and decoded body.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// The API wraps payloads in a `{"data": ...}` envelope; this returns
    /// the payload, or `Null` when the envelope is absent.
    pub fn data(&self) -> &Value {
        self.body.get("data").unwrap_or(&Value::Null)
    }

    /// Consume the response and return the `data` payload.
    pub fn into_data(mut self) -> Value {
        match self.body.get_mut("data") {
            Some(data) => data.take(),
            None => Value::Null,
        }
    }
}
