use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Gemini API error response structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiErrorBody {
    #[serde(rename = "error")]
    pub inner: GeminiErrorObject,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiErrorObject {
    /// Numeric error code (normally equals the HTTP status, e.g. `429`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    /// Human-readable error message from upstream.
    ///
    /// Example (`400`):
    /// - `"API key not valid. Please pass a valid API key."`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Google-style canonical status name.
    ///
    /// Example:
    /// - `"RESOURCE_EXHAUSTED"` (rate limit / quota)
    /// - `"INVALID_ARGUMENT"` (malformed request or malformed key)
    /// - `"PERMISSION_DENIED"` (key rejected or API disabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Structured details (`google.rpc.ErrorInfo`, `google.rpc.RetryInfo`, …).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Value>>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GeminiErrorBody {
    pub fn status(&self) -> Option<&str> {
        self.inner.status.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.inner
            .message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
    }

    /// `ErrorInfo.reason` values carried in `details`, e.g. `API_KEY_INVALID`.
    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.inner
            .details
            .iter()
            .flatten()
            .filter_map(|detail| detail.get("reason").and_then(Value::as_str))
    }

    /// Whether upstream says the key itself is malformed or unknown.
    pub fn is_key_not_valid(&self) -> bool {
        self.reasons().any(|reason| reason == "API_KEY_INVALID")
            || self
                .message()
                .is_some_and(|message| message.to_ascii_lowercase().contains("key not valid"))
    }
}
