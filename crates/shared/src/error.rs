use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by either endpoint on a non-success status.
///
/// `detail` is usually a string, but validation failures arrive as a list of
/// objects carrying a `msg` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ErrorPayload {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(Value::String(detail.into())),
        }
    }

    /// Parses a raw response body, yielding `None` when it is not an error payload.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    pub fn detail_message(&self) -> Option<String> {
        let message = match self.detail.as_ref()? {
            Value::String(text) => text.trim().to_string(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.clone()),
                    Value::Object(map) => map.get("msg").and_then(Value::as_str).map(str::to_string),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("; "),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        (!message.is_empty()).then_some(message)
    }
}
