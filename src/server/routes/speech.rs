use crate::error::AtomlinkError;
use crate::server::router::RelayState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

/// `POST /api/speech` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechBody {
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
}

/// Raw PCM body, or 204 when the service produced no audio.
pub async fn speech_handler(
    State(state): State<RelayState>,
    body: Result<Json<SpeechBody>, JsonRejection>,
) -> Result<Response, AtomlinkError> {
    let Json(body) = body?;

    let audio = state
        .orchestrator
        .synthesize_speech(&body.text, body.voice.as_deref())
        .await?;

    Ok(match audio {
        Some(audio) => (
            [(CONTENT_TYPE, audio.content_type())],
            audio.to_le_bytes(),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
