use crate::conversation::{Attachment, ConversationTurn, GeoPoint};
use crate::error::AtomlinkError;
use crate::orchestrator::GenerationResult;
use crate::persona::ChatMode;
use crate::server::router::RelayState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::debug;

/// `POST /api/generate` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    /// Overrides the instruction composed from `mode`.
    #[serde(default)]
    pub system_instruction: Option<String>,
    #[serde(default)]
    pub mode: ChatMode,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl GenerateBody {
    pub fn system_instruction(&self) -> String {
        self.system_instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| self.mode.system_instruction(), str::to_string)
    }
}

pub async fn generate_handler(
    State(state): State<RelayState>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GenerationResult>, AtomlinkError> {
    let Json(body) = body?;

    if body.prompt.trim().is_empty() && !body.attachments.iter().any(Attachment::is_sendable) {
        return Err(AtomlinkError::BadRequest(
            "prompt or at least one attachment is required".to_string(),
        ));
    }

    debug!(
        mode = ?body.mode,
        history = body.history.len(),
        attachments = body.attachments.len(),
        located = body.location.is_some(),
        "Generate request accepted"
    );

    let result = state
        .orchestrator
        .generate(
            &body.prompt,
            &body.attachments,
            &body.history,
            &body.system_instruction(),
            body.location,
        )
        .await?;
    Ok(Json(result))
}
