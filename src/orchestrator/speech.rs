//! Text-to-speech request shape and PCM decoding.
//!
//! The service answers with base64 encoded 16-bit little-endian PCM, mono,
//! at 24 kHz, carried as the first `inlineData` part of the first candidate.

use crate::error::AtomlinkError;
use atomlink_schema::gemini::{Content, GenerationConfig, Part};
use atomlink_schema::{GenerateContentRequest, GenerateContentResponse};
use base64::Engine as _;
use std::time::Duration;

pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
pub const SPEECH_CHANNELS: u16 = 1;

/// Decoded speech samples, ready for a playback device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl SpeechAudio {
    /// Decodes base64 PCM. A trailing odd byte is dropped.
    pub fn from_base64_pcm(data: &str) -> Result<Self, AtomlinkError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
        Ok(Self::from_pcm_bytes(&bytes))
    }

    pub fn from_pcm_bytes(bytes: &[u8]) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self {
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: SPEECH_CHANNELS,
            samples,
        }
    }

    /// Samples scaled into `[-1.0, 1.0)`.
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples
            .iter()
            .map(|&s| f32::from(s) / 32768.0)
            .collect()
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as u64 / u64::from(self.channels.max(1));
        Duration::from_micros(frames * 1_000_000 / u64::from(self.sample_rate))
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// MIME type for the raw body served to clients.
    pub fn content_type(&self) -> String {
        format!(
            "audio/L16; rate={}; channels={}",
            self.sample_rate, self.channels
        )
    }
}

/// Single user turn asking for audio in the given prebuilt voice.
pub fn build_speech_request(text: &str, voice: &str) -> GenerateContentRequest {
    let mut request = GenerateContentRequest::new(vec![Content::new("user", vec![Part::text(text)])]);
    request.generation_config = Some(GenerationConfig::audio_with_voice(voice));
    request
}

/// `Ok(None)` when the response carries no audio.
pub fn extract_speech(
    response: &GenerateContentResponse,
) -> Result<Option<SpeechAudio>, AtomlinkError> {
    let Some(blob) = response.first_inline_data() else {
        return Ok(None);
    };
    if blob.data.trim().is_empty() {
        return Ok(None);
    }
    SpeechAudio::from_base64_pcm(&blob.data).map(Some)
}
