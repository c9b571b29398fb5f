use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `tools[]` object. Each entry normally declares exactly one tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Google Search grounding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,

    /// Google Maps grounding. The caller location goes in `toolConfig`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<GoogleMaps>,

    /// Function declarations, code execution, and other tools are passed through here.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Tool {
    pub fn google_search() -> Self {
        Self {
            google_search: Some(GoogleSearch::default()),
            ..Default::default()
        }
    }

    pub fn google_maps() -> Self {
        Self {
            google_maps: Some(GoogleMaps::default()),
            ..Default::default()
        }
    }
}

/// Empty marker object (`{}`) enabling search grounding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoogleSearch {}

/// Empty marker object (`{}`) enabling maps grounding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoogleMaps {}
