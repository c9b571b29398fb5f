use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error as ThisError;

use super::gemini::GeminiErrorBody;

/// Characters of an unstructured upstream body kept for diagnostics.
pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

#[derive(Debug, ThisError)]
pub enum AtomlinkError {
    /// No usable API key is configured; fails before any network attempt.
    #[error(
        "Setup required: no Gemini API key is configured. Set credentials.primary in config.toml or ATOMLINK_CREDENTIALS__PRIMARY."
    )]
    NoCredentialsAvailable,

    #[error("No backup API key is available for failover.")]
    NoBackupAvailable,

    /// Non-success response from the Gemini API.
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        body: Option<GeminiErrorBody>,
    },

    #[error(
        "The request was rejected as invalid (HTTP 400): {detail}. An attachment may be unsupported or too large; try removing it or starting a new conversation."
    )]
    InvalidRequest { detail: String },

    #[error(
        "Access denied (HTTP 403): the API key was rejected. Check that the key is enabled for the Gemini API and is not restricted to other services or referrers."
    )]
    InvalidCredential,

    #[error(
        "The configured API key is not valid. Check it for typos or stray whitespace, or create a new key."
    )]
    MalformedCredential,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Audio payload decode error: {0}")]
    AudioDecode(#[from] base64::DecodeError),

    #[error("Ractor error: {0}")]
    Ractor(String),
}

impl AtomlinkError {
    /// Builds an upstream error from a non-success status and raw body.
    pub fn upstream(status: StatusCode, raw_body: &[u8]) -> Self {
        let body = serde_json::from_slice::<GeminiErrorBody>(raw_body).ok();
        let message = body
            .as_ref()
            .and_then(GeminiErrorBody::message)
            .map(|message| format!("Upstream error {}: {message}", status.as_u16()))
            .unwrap_or_else(|| format!("Upstream returned {status}"));

        if body.is_none() {
            let raw = String::from_utf8_lossy(raw_body);
            tracing::debug!(
                %status,
                body = %format!("{:.len$}", raw, len = UPSTREAM_BODY_PREVIEW_CHARS),
                "Upstream unstructured error"
            );
        }

        AtomlinkError::Upstream {
            status,
            message,
            body,
        }
    }

    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            AtomlinkError::Upstream { status, .. } => Some(*status),
            AtomlinkError::Reqwest(e) => e.status(),
            _ => None,
        }
    }

    /// Quota or rate-limit signal: HTTP 429 or a `RESOURCE_EXHAUSTED` body.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            AtomlinkError::Upstream { status, body, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS
                    || body
                        .as_ref()
                        .is_some_and(|b| b.status() == Some("RESOURCE_EXHAUSTED"))
            }
            _ => self.upstream_status() == Some(StatusCode::TOO_MANY_REQUESTS),
        }
    }

    /// Errors expected to clear after a short wait.
    ///
    /// Rate limits always qualify; 500/503 only when `include_server_errors` is set.
    pub fn is_transient(&self, include_server_errors: bool) -> bool {
        if self.is_rate_limited() {
            return true;
        }
        include_server_errors
            && matches!(
                self.upstream_status(),
                Some(StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE)
            )
    }

    /// Maps request and credential rejections to fixed, user-facing explanations.
    /// Everything else is returned unchanged.
    pub fn into_user_facing(self) -> Self {
        let (status, message, body) = match self {
            AtomlinkError::Upstream {
                status,
                message,
                body,
            } => (status, message, body),
            other => return other,
        };

        if body.as_ref().is_some_and(GeminiErrorBody::is_key_not_valid) {
            return AtomlinkError::MalformedCredential;
        }

        match status {
            StatusCode::FORBIDDEN => AtomlinkError::InvalidCredential,
            StatusCode::BAD_REQUEST => AtomlinkError::InvalidRequest {
                detail: body
                    .as_ref()
                    .and_then(GeminiErrorBody::message)
                    .map(str::to_owned)
                    .unwrap_or_else(|| "no details provided".to_string()),
            },
            _ => AtomlinkError::Upstream {
                status,
                message,
                body,
            },
        }
    }

    fn response_parts(&self) -> (StatusCode, &'static str) {
        match self {
            AtomlinkError::NoCredentialsAvailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "SETUP_REQUIRED")
            }
            AtomlinkError::NoBackupAvailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "NO_BACKUP_CREDENTIAL")
            }
            AtomlinkError::Upstream { status, .. } => match *status {
                StatusCode::TOO_MANY_REQUESTS => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT"),
                _ => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            },
            AtomlinkError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            AtomlinkError::InvalidCredential => (StatusCode::BAD_GATEWAY, "INVALID_CREDENTIAL"),
            AtomlinkError::MalformedCredential => {
                (StatusCode::BAD_GATEWAY, "MALFORMED_CREDENTIAL")
            }
            AtomlinkError::BadRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            AtomlinkError::Reqwest(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNREACHABLE"),
            AtomlinkError::Json(_) | AtomlinkError::AudioDecode(_) => {
                (StatusCode::BAD_GATEWAY, "BAD_UPSTREAM_PAYLOAD")
            }
            AtomlinkError::Url(_) | AtomlinkError::Ractor(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl From<JsonRejection> for AtomlinkError {
    fn from(rejection: JsonRejection) -> Self {
        AtomlinkError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AtomlinkError {
    fn into_response(self) -> Response {
        let (status, code) = self.response_parts();
        let message = match &self {
            AtomlinkError::Url(_) | AtomlinkError::Ractor(_) => {
                "An internal server error occurred.".to_string()
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::warn!(%status, code, error = %self, "Request failed");
        } else {
            tracing::debug!(%status, code, error = %self, "Request rejected");
        }

        let body = ApiErrorBody {
            inner: ApiErrorObject {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Debug, Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
