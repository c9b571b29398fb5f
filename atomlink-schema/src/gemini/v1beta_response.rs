//! Gemini v1beta `generateContent` response types.
//!
//! Candidate content and grounding metadata are parsed leniently: a malformed
//! block or chunk is dropped instead of failing the whole response.

use super::{Blob, Content};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Absent when the service sends a role-only or otherwise unusable body,
    /// e.g. on `MAX_TOKENS` or `SAFETY` stops.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_lenient"
    )]
    pub content: Option<Content>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_lenient"
    )]
    pub grounding_metadata: Option<GroundingMetadata>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    /// Sources used for grounding, in service order.
    #[serde(default, deserialize_with = "deserialize_chunks")]
    pub grounding_chunks: Vec<GroundingChunk>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search_queries: Option<Vec<String>>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One grounding source; `web` and `maps` are the discriminants we care about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<GroundingChunkWeb>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<GroundingChunkMaps>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunkWeb {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunkMaps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl GenerateContentResponse {
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Concatenated non-thought text of the first candidate; `None` when empty.
    pub fn text(&self) -> Option<String> {
        let content = self.first_candidate()?.content.as_ref()?;
        let text = content
            .parts
            .iter()
            .filter(|part| !part.is_thought())
            .filter_map(|part| part.text.as_deref())
            .collect::<String>();
        (!text.is_empty()).then_some(text)
    }

    /// Grounding chunks of the first candidate, or an empty slice.
    pub fn grounding_chunks(&self) -> &[GroundingChunk] {
        self.first_candidate()
            .and_then(|candidate| candidate.grounding_metadata.as_ref())
            .map(|metadata| metadata.grounding_chunks.as_slice())
            .unwrap_or_default()
    }

    /// First `inlineData` blob of the first candidate (e.g. synthesized audio).
    pub fn first_inline_data(&self) -> Option<&Blob> {
        self.first_candidate()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.inline_data.as_ref())
    }
}

fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

fn deserialize_chunks<'de, D>(deserializer: D) -> Result<Vec<GroundingChunk>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
