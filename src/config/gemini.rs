use serde::{Deserialize, Serialize};
use url::Url;

/// Upstream Gemini API configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// Base URL of the v1beta API; model paths are joined onto it.
    /// TOML: `gemini.api_url`. Default: `https://generativelanguage.googleapis.com/v1beta/`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Model used for chat generation.
    /// TOML: `gemini.text_model`. Default: `gemini-2.5-flash`.
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for speech synthesis.
    /// TOML: `gemini.speech_model`. Default: `gemini-2.5-flash-preview-tts`.
    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// Prebuilt voice used when the caller does not name one.
    /// TOML: `gemini.default_voice`. Default: `Kore`.
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Optional upstream HTTP proxy. If set, used for the reqwest client.
    /// TOML: `gemini.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing for the reqwest client; disabled forces HTTP/1.
    /// TOML: `gemini.enable_multiplexing`. Default: `false`.
    #[serde(default)]
    pub enable_multiplexing: bool,

    /// Connect timeout for upstream calls, in seconds.
    /// TOML: `gemini.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout for upstream calls, in seconds.
    /// TOML: `gemini.request_timeout_secs`. Default: `600`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            text_model: default_text_model(),
            speech_model: default_speech_model(),
            default_voice: default_voice(),
            proxy: None,
            enable_multiplexing: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://generativelanguage.googleapis.com/v1beta/")
        .expect("default Gemini API url is valid")
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    10 * 60
}
