use atomlink_schema::GenerateContentResponse;
use atomlink_schema::gemini::GroundingChunk;
use serde::{Deserialize, Serialize};

/// Answer shown when the service returned no usable text.
pub const FALLBACK_ANSWER_TEXT: &str = "Neural connection interrupted. Please try again.";

/// Title given to map citations the service left untitled.
pub const DEFAULT_MAP_TITLE: &str = "View on Maps";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebCitation {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCitation {
    pub uri: String,
    pub title: String,
}

/// Display-ready outcome of one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub text: String,
    pub web_sources: Vec<WebCitation>,
    pub map_sources: Vec<MapCitation>,
}

impl GenerationResult {
    pub fn has_sources(&self) -> bool {
        !self.web_sources.is_empty() || !self.map_sources.is_empty()
    }
}

/// Turns a raw response into text plus citations. Never fails.
pub fn normalize_response(response: &GenerateContentResponse) -> GenerationResult {
    let text = response
        .text()
        .unwrap_or_else(|| FALLBACK_ANSWER_TEXT.to_string());

    let chunks = response.grounding_chunks();
    GenerationResult {
        text,
        web_sources: chunks.iter().filter_map(web_citation).collect(),
        map_sources: chunks.iter().filter_map(map_citation).collect(),
    }
}

fn web_citation(chunk: &GroundingChunk) -> Option<WebCitation> {
    let web = chunk.web.as_ref()?;
    let uri = non_blank(web.uri.as_deref())?;
    let title = non_blank(web.title.as_deref()).unwrap_or(uri);
    Some(WebCitation {
        uri: uri.to_string(),
        title: title.to_string(),
    })
}

fn map_citation(chunk: &GroundingChunk) -> Option<MapCitation> {
    let maps = chunk.maps.as_ref()?;
    let uri = non_blank(maps.uri.as_deref())?;
    Some(MapCitation {
        uri: uri.to_string(),
        title: non_blank(maps.title.as_deref())
            .unwrap_or(DEFAULT_MAP_TITLE)
            .to_string(),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
