//! Typed Gemini v1beta request schema for the `generateContent` endpoint.
//!
//! Known fields are modeled explicitly so the request builder can be checked at
//! compile time, while `extra` catch-all maps keep the shape forward compatible.

mod content;
mod generation;
mod safety;
mod tool;
mod tool_config;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub use content::{Blob, Content, Part};
pub use generation::{GenerationConfig, PrebuiltVoiceConfig, SpeechConfig, VoiceConfig};
pub use safety::{HarmBlockThreshold, HarmCategory, SafetySetting};
pub use tool::{GoogleMaps, GoogleSearch, Tool};
pub use tool_config::{LatLng, RetrievalConfig, ToolConfig};

/// Gemini `generateContent` request body.
///
/// Reference: <https://ai.google.dev/api/generate-content>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Required conversation turns.
    pub contents: Vec<Content>,

    /// System-level instruction. A `Content` without `role`, holding one text part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Per-category blocking thresholds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_settings: Option<Vec<SafetySetting>>,

    /// Generation parameters (temperature, modalities, speech, …).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,

    /// Tool declarations (search grounding, maps grounding, …).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,

    /// Tool configuration, e.g. the caller location used by maps grounding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,

    /// Catch-all for unknown fields such as `cachedContent`.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GenerateContentRequest {
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            system_instruction: None,
            safety_settings: None,
            generation_config: None,
            tools: None,
            tool_config: None,
            extra: BTreeMap::new(),
        }
    }

    /// Copy of this request with every tool declaration and tool config removed.
    pub fn without_tools(&self) -> Self {
        Self {
            tools: None,
            tool_config: None,
            ..self.clone()
        }
    }

    pub fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|tools| !tools.is_empty())
    }

    pub fn has_google_search(&self) -> bool {
        self.tools
            .iter()
            .flatten()
            .any(|tool| tool.google_search.is_some())
    }

    pub fn has_google_maps(&self) -> bool {
        self.tools
            .iter()
            .flatten()
            .any(|tool| tool.google_maps.is_some())
    }

    /// Coordinates attached to `toolConfig.retrievalConfig.latLng`, if any.
    pub fn retrieval_lat_lng(&self) -> Option<LatLng> {
        self.tool_config
            .as_ref()?
            .retrieval_config
            .as_ref()?
            .lat_lng
    }
}
