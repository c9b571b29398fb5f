use serde::{Deserialize, Serialize, de::Error};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single conversation turn or system instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Usually `"user"` or `"model"`. Absent for `systemInstruction`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Ordered parts that constitute a single message.
    #[serde(deserialize_with = "deserialize_parts")]
    pub parts: Vec<Part>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Content {
    pub fn new(role: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role.into()),
            parts,
            extra: BTreeMap::new(),
        }
    }

    /// Role-less content holding a single text part, as used by `systemInstruction`.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
            extra: BTreeMap::new(),
        }
    }
}

/// One atomic piece of content inside a `Content` turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Model-thought marker; thought parts are not part of the answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Inline media bytes (base64 in transit).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<Value>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            inline_data: Some(Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            ..Default::default()
        }
    }

    pub fn is_thought(&self) -> bool {
        self.thought.unwrap_or(false)
    }
}

/// `inlineData` payload: MIME type plus base64-encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

fn deserialize_parts<'de, D>(deserializer: D) -> Result<Vec<Part>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let parts = Vec::<Part>::deserialize(deserializer)?;

    for (index, part) in parts.iter().enumerate() {
        let data_fields_count = usize::from(part.text.is_some())
            + usize::from(part.inline_data.is_some())
            + usize::from(part.file_data.is_some())
            + usize::from(part.function_call.is_some())
            + usize::from(part.function_response.is_some());

        if data_fields_count > 1 {
            return Err(D::Error::custom(format!(
                "parts[{index}] must contain at most one data field among text, inlineData, fileData, functionCall, functionResponse"
            )));
        }
    }

    Ok(parts)
}
