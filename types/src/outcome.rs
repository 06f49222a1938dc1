//! Canonical result of the NIC verification flow.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The single normalized result shape every NIC-verification caller consumes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub success: bool,
    pub message: String,
    pub data: VerificationDetail,
}

/// Detail of a verification outcome.
///
/// The UI-critical fields are typed and always present; endpoint-specific
/// fields (document number, confidence score, ...) live in `extra`.
/// `user_message` and `suggestions` are omitted from JSON while empty.
///
/// A reserved key found in `extra` shadows its typed field on the wire, so a
/// service value that does not fit the typed slot is still emitted as sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct VerificationDetail {
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
    pub user_message: String,
    pub suggestions: Vec<String>,
    pub technical_error: Option<String>,
    pub extra: Map<String, Value>,
}

impl VerificationDetail {
    pub fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Set a wire-named field, routing typed keys to their typed slot.
    ///
    /// Values are coerced to fit: scalars become text, a single string
    /// becomes a one-item suggestion list. Returns `false` when a typed key
    /// carries a value that cannot be represented (e.g. a non-boolean
    /// `success`); the field is left as is.
    pub fn insert(&mut self, key: &str, value: Value) -> bool {
        match key {
            "success" => match value.as_bool() {
                Some(flag) => {
                    self.success = flag;
                    true
                }
                None => false,
            },
            "message" => match text(value) {
                Some(message) => {
                    self.message = message;
                    true
                }
                None => false,
            },
            "error" => {
                self.error = text(value);
                true
            }
            "userMessage" => match text(value) {
                Some(message) => {
                    self.user_message = message;
                    true
                }
                None => false,
            },
            "suggestions" => match value {
                Value::Array(items) => {
                    self.suggestions = items.into_iter().filter_map(text).collect();
                    true
                }
                Value::String(single) => {
                    self.suggestions = vec![single];
                    true
                }
                _ => false,
            },
            "technicalError" => {
                self.technical_error = text(value);
                true
            }
            other => {
                self.extra.insert(other.to_string(), value);
                true
            }
        }
    }

    /// Set a wire-named field without altering its value.
    ///
    /// A typed key only lands in its typed slot when the value serializes
    /// back to exactly the same JSON; anything else is kept in `extra` under
    /// the same key.
    pub fn insert_verbatim(&mut self, key: &str, value: Value) {
        let value = match (key, value) {
            ("success", Value::Bool(flag)) => {
                self.success = flag;
                None
            }
            ("message", Value::String(message)) => {
                self.message = message;
                None
            }
            ("error", Value::String(error)) => {
                self.error = Some(error);
                None
            }
            ("userMessage", Value::String(message)) if !message.is_empty() => {
                self.user_message = message;
                None
            }
            ("suggestions", Value::Array(items)) if is_text_list(&items) => {
                self.suggestions = items.into_iter().filter_map(text).collect();
                None
            }
            ("technicalError", Value::String(error)) => {
                self.technical_error = Some(error);
                None
            }
            (_, value) => Some(value),
        };
        match value {
            Some(value) => {
                self.extra.insert(key.to_string(), value);
            }
            None => {
                self.extra.remove(key);
            }
        }
    }

    /// Endpoint-specific field by wire name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// The detail as a JSON object, using wire names.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn is_text_list(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_string)
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<Map<String, Value>> for VerificationDetail {
    fn from(fields: Map<String, Value>) -> Self {
        let mut detail = Self::default();
        for (key, value) in fields {
            detail.insert_verbatim(&key, value);
        }
        detail
    }
}

impl From<VerificationDetail> for Map<String, Value> {
    fn from(detail: VerificationDetail) -> Self {
        let mut fields = Map::new();
        fields.insert("success".into(), Value::Bool(detail.success));
        fields.insert("message".into(), Value::String(detail.message));
        if let Some(error) = detail.error {
            fields.insert("error".into(), Value::String(error));
        }
        if !detail.user_message.is_empty() {
            fields.insert("userMessage".into(), Value::String(detail.user_message));
        }
        if !detail.suggestions.is_empty() {
            let suggestions = detail.suggestions.into_iter().map(Value::String).collect();
            fields.insert("suggestions".into(), Value::Array(suggestions));
        }
        if let Some(error) = detail.technical_error {
            fields.insert("technicalError".into(), Value::String(error));
        }
        // extra entries shadow typed fields of the same name
        fields.extend(detail.extra);
        fields
    }
}

impl VerificationOutcome {
    /// Guidance for the user: the detail's user message, or the outcome message.
    pub fn display_message(&self) -> &str {
        if self.data.user_message.is_empty() {
            &self.message
        } else {
            &self.data.user_message
        }
    }
}
