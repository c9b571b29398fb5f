mod generate_content_request;
mod v1beta_response;

pub use generate_content_request::GenerateContentRequest;
pub use generate_content_request::{
    Blob, Content, GenerationConfig, GoogleMaps, GoogleSearch, HarmBlockThreshold, HarmCategory,
    LatLng, Part, PrebuiltVoiceConfig, RetrievalConfig, SafetySetting, SpeechConfig, Tool,
    ToolConfig, VoiceConfig,
};
pub use v1beta_response::{
    Candidate, GenerateContentResponse, GroundingChunk, GroundingChunkMaps, GroundingChunkWeb,
    GroundingMetadata,
};
