mod atomlink;
mod gemini;

pub use atomlink::{ApiErrorBody, ApiErrorObject, AtomlinkError, UPSTREAM_BODY_PREVIEW_CHARS};
pub use gemini::{GeminiErrorBody, GeminiErrorObject};
