use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `toolConfig` object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_calling_config: Option<Value>,

    /// Retrieval configuration used by grounding tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_config: Option<RetrievalConfig>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ToolConfig {
    pub fn with_lat_lng(lat_lng: LatLng) -> Self {
        Self {
            retrieval_config: Some(RetrievalConfig {
                lat_lng: Some(lat_lng),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// `toolConfig.retrievalConfig`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<LatLng>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_config_roundtrip_with_lat_lng() {
        let input = json!({
            "retrievalConfig": {"latLng": {"latitude": 37.42, "longitude": -122.08}}
        });
        let tool_cfg: ToolConfig = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(
            tool_cfg.retrieval_config.as_ref().and_then(|r| r.lat_lng),
            Some(LatLng {
                latitude: 37.42,
                longitude: -122.08
            })
        );
        assert_eq!(serde_json::to_value(&tool_cfg).unwrap(), input);
    }

    #[test]
    fn tool_config_roundtrip_with_unknown_fields() {
        let input = json!({
            "functionCallingConfig": {"mode": "AUTO"},
            "someFutureField": true
        });
        let tool_cfg: ToolConfig = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(tool_cfg.extra.get("someFutureField"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&tool_cfg).unwrap(), input);
    }
}
