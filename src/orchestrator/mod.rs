//! Request pipeline for text generation and speech synthesis.
//!
//! A generation call runs
//! `build -> credential failover -> capability fallback -> retry -> transport -> normalize`.
//! Each stage is a plain async function that receives the next stage as a
//! closure, so stages can be exercised on their own with fake continuations.

mod builder;
mod credentials;
mod failover;
mod fallback;
mod normalize;
mod retry;
mod speech;
mod transport;

pub use builder::{GenerationInput, SAFETY_SETTINGS, build_generation_request};
pub use credentials::{
    CredentialLease, CredentialPool, CredentialPoolHandle, CredentialPoolMessage, CredentialSlot,
    PREFERRED_SLOT, PoolSnapshot, SlotIndex,
};
pub use failover::with_credential_failover;
pub use fallback::with_capability_fallback;
pub use normalize::{
    DEFAULT_MAP_TITLE, FALLBACK_ANSWER_TEXT, GenerationResult, MapCitation, WebCitation,
    normalize_response,
};
pub use retry::RetryPolicy;
pub use speech::{
    SPEECH_CHANNELS, SPEECH_SAMPLE_RATE, SpeechAudio, build_speech_request, extract_speech,
};
pub use transport::{GeminiApi, GenerateTransport};

use crate::config::Config;
use crate::conversation::{Attachment, ConversationTurn, GeoPoint};
use crate::error::AtomlinkError;
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point used by the relay handlers.
///
/// Cheap to clone; clones share the transport and the credential pool.
#[derive(Clone)]
pub struct Orchestrator {
    transport: Arc<dyn GenerateTransport>,
    pool: CredentialPoolHandle,
    retry: RetryPolicy,
    text_model: Arc<str>,
    speech_model: Arc<str>,
    default_voice: Arc<str>,
}

impl Orchestrator {
    pub fn new(
        transport: Arc<dyn GenerateTransport>,
        pool: CredentialPoolHandle,
        cfg: &Config,
    ) -> Self {
        Self {
            transport,
            pool,
            retry: RetryPolicy::new(&cfg.retry),
            text_model: cfg.gemini.text_model.as_str().into(),
            speech_model: cfg.gemini.speech_model.as_str().into(),
            default_voice: cfg.gemini.default_voice.as_str().into(),
        }
    }

    /// Wires the HTTPS transport and spawns the credential pool actor.
    pub async fn spawn(cfg: &Config) -> Result<Self, AtomlinkError> {
        let transport = Arc::new(GeminiApi::new(&cfg.gemini)?);
        let pool =
            CredentialPoolHandle::spawn(CredentialPool::from_config(&cfg.credentials)).await?;
        Ok(Self::new(transport, pool, cfg))
    }

    pub fn pool(&self) -> &CredentialPoolHandle {
        &self.pool
    }

    /// Sends one chat turn and returns display-ready text with citations.
    pub async fn generate(
        &self,
        prompt: &str,
        attachments: &[Attachment],
        history: &[ConversationTurn],
        system_instruction: &str,
        location: Option<GeoPoint>,
    ) -> Result<GenerationResult, AtomlinkError> {
        let request = build_generation_request(GenerationInput {
            prompt,
            attachments,
            history,
            system_instruction,
            location,
        });
        debug!(
            turns = request.contents.len(),
            maps = request.has_google_maps(),
            "Generation request built"
        );

        let request = &request;
        let model: &str = &self.text_model;
        let response = with_credential_failover(&self.pool, |lease| async move {
            let api_key = &lease.api_key;
            with_capability_fallback(request, |attempt| async move {
                self.retry
                    .run(|| self.transport.generate_content(model, api_key, &attempt))
                    .await
            })
            .await
        })
        .await?;

        let result = normalize_response(&response);
        info!(
            web_sources = result.web_sources.len(),
            map_sources = result.map_sources.len(),
            "Generation complete"
        );
        Ok(result)
    }

    /// Speaks `text` with `voice` (or the configured default voice).
    ///
    /// Returns `Ok(None)` for blank text or when the service sends no audio.
    pub async fn synthesize_speech(
        &self,
        text: &str,
        voice: Option<&str>,
    ) -> Result<Option<SpeechAudio>, AtomlinkError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let voice = voice
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(&*self.default_voice);

        let request = &build_speech_request(text, voice);
        let model: &str = &self.speech_model;
        let response = with_credential_failover(&self.pool, |lease| async move {
            self.retry
                .run(|| self.transport.generate_content(model, &lease.api_key, request))
                .await
        })
        .await
        .map_err(|err| {
            if err.is_rate_limited() {
                err
            } else {
                err.into_user_facing()
            }
        })?;

        let audio = extract_speech(&response)?;
        if let Some(audio) = &audio {
            info!(voice, samples = audio.samples.len(), "Speech synthesized");
        }
        Ok(audio)
    }
}
