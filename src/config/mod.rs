mod basic;
mod credentials;
mod gemini;
mod retry;

pub use basic::BasicConfig;
pub use credentials::{ApiKey, CredentialsConfig};
pub use gemini::GeminiConfig;
pub use retry::RetryConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Relay server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Upstream Gemini endpoint and models (see `gemini` table).
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// API keys and failover recovery (see `credentials` table).
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Backoff for transient upstream failures (see `retry` table).
    #[serde(default)]
    pub retry: RetryConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "ATOMLINK_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `ATOMLINK_`-prefixed environment variables (`__` separates tables, e.g.
    /// `ATOMLINK_CREDENTIALS__PRIMARY`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from defaults, `config.toml` (if present) and the environment.
    ///
    /// Missing API keys are not an error here: they surface as a setup-required
    /// error on the first generation call.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Toml;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.basic.listen_port, 8787);
        assert_eq!(cfg.gemini.text_model, "gemini-2.5-flash");
        assert_eq!(cfg.gemini.speech_model, "gemini-2.5-flash-preview-tts");
        assert_eq!(cfg.credentials.recovery_window_secs, 60);
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry.base_delay_ms, 2000);
        assert!(!cfg.retry.server_errors_transient);
        assert!(cfg.credentials.primary.is_none());
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [credentials]
                primary = "key-a"
                secondary = "   "
                recovery_window_secs = 5

                [retry]
                server_errors_transient = true
                "#,
            ))
            .extract()
            .expect("valid config");

        assert_eq!(
            cfg.credentials.primary.as_ref().map(ApiKey::expose),
            Some("key-a")
        );
        assert!(cfg.credentials.secondary.is_none());
        assert_eq!(cfg.credentials.recovery_window_secs, 5);
        assert!(cfg.retry.server_errors_transient);
        assert_eq!(cfg.retry.max_attempts, 3);
    }
}
