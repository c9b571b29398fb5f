use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt, time::Duration};

/// An upstream API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Credential configuration managed by Figment.
///
/// A key that is absent or blank is "not configured"; there is no placeholder value.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialsConfig {
    /// Preferred API key.
    /// TOML: `credentials.primary`. Env: `ATOMLINK_CREDENTIALS__PRIMARY`.
    #[serde(default, deserialize_with = "deserialize_optional_key")]
    pub primary: Option<ApiKey>,

    /// Backup API key used after the primary hits its quota.
    /// TOML: `credentials.secondary`. Env: `ATOMLINK_CREDENTIALS__SECONDARY`.
    #[serde(default, deserialize_with = "deserialize_optional_key")]
    pub secondary: Option<ApiKey>,

    /// Seconds after a failover before the primary key is tried again.
    /// TOML: `credentials.recovery_window_secs`. Default: `60`.
    #[serde(default = "default_recovery_window_secs")]
    pub recovery_window_secs: u64,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            primary: None,
            secondary: None,
            recovery_window_secs: default_recovery_window_secs(),
        }
    }
}

impl CredentialsConfig {
    /// Keys in preference order; unset entries stay in place as `None`.
    pub fn ordered(&self) -> [Option<ApiKey>; 2] {
        [self.primary.clone(), self.secondary.clone()]
    }

    pub fn recovery_window(&self) -> Duration {
        Duration::from_secs(self.recovery_window_secs)
    }
}

/// Accepts a string (or a bare number from env parsing); blank becomes `None`.
fn deserialize_optional_key<'de, D>(deserializer: D) -> Result<Option<ApiKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    let raw = match v {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(serde::de::Error::custom(
                "expected a string for credentials.primary / credentials.secondary",
            ));
        }
    };

    let trimmed = raw.trim();
    Ok((!trimmed.is_empty()).then(|| ApiKey::new(trimmed)))
}

fn default_recovery_window_secs() -> u64 {
    60
}
