//! Raw responses from the remote service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status and body bytes of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Build a response whose body is the given JSON value.
    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// HTTP 401: the service denied the credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Parse the body as a service envelope, if it is one.
    pub fn service_body(&self) -> Option<RawServiceResponse> {
        let value: Value = serde_json::from_slice(&self.body).ok()?;
        RawServiceResponse::from_value(value)
    }
}

/// The `{ success, message, data? }` envelope every endpoint returns.
///
/// `data` is endpoint-specific and kept as open JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawServiceResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RawServiceResponse {
    pub fn new(success: bool, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success,
            message: Some(message.into()),
            data,
        }
    }

    /// Leniently read an envelope out of arbitrary JSON.
    ///
    /// Returns `None` unless the value is an object. Mistyped fields are
    /// treated as absent rather than failing the whole body.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };
        let success = map.get("success").and_then(Value::as_bool).unwrap_or(false);
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        let data = map.remove("data").filter(|d| !d.is_null());
        Some(Self {
            success,
            message,
            data,
        })
    }

    /// A string field nested in `data`, if present.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}
