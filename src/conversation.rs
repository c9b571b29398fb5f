//! Conversation values handed to the orchestrator by the chat UI.
//!
//! These are read-only inputs: the orchestrator never mutates history.

use atomlink_schema::gemini::LatLng;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Role string used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// Binary input attached to a turn (image, audio clip, document).
///
/// Bytes are kept raw; base64 is applied only at the JSON boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(serialize_with = "serialize_base64", deserialize_with = "deserialize_base64")]
    pub data: Vec<u8>,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attachment {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// An attachment without bytes or MIME type cannot be sent and is skipped.
    pub fn is_sendable(&self) -> bool {
        !self.data.is_empty() && !self.mime_type.trim().is_empty()
    }

    pub fn base64_data(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// One entry of the chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub role: Role,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Milliseconds since the epoch on the wire.
    #[serde(default = "Utc::now", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Set on bubbles that report a failed call instead of a model answer.
    #[serde(default)]
    pub is_error: bool,
}

impl ConversationTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            attachments: Vec::new(),
            timestamp: Utc::now(),
            is_error: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Model-side bubble carrying an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(Role::Model, text)
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Caller location used for maps grounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoPoint> for LatLng {
    fn from(point: GeoPoint) -> Self {
        LatLng {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

fn serialize_base64<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
}

fn deserialize_base64<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    // Browsers hand over data URLs; keep only the payload after the comma.
    let payload = raw
        .split_once(";base64,")
        .map_or(raw.as_str(), |(_, payload)| payload);
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(serde::de::Error::custom)
}
