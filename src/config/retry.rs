use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff policy for transient upstream failures.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one.
    /// TOML: `retry.max_attempts`. Default: `3`.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Delay before the first retry, in milliseconds; doubles on each retry.
    /// TOML: `retry.base_delay_ms`. Default: `2000`.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Also treat HTTP 500/503 as transient (otherwise only 429 is).
    /// TOML: `retry.server_errors_transient`. Default: `false`.
    #[serde(default)]
    pub server_errors_transient: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            server_errors_transient: false,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

fn default_max_attempts() -> usize {
    3
}

fn default_base_delay_ms() -> u64 {
    2000
}
