use crate::persona::{ModeDescriptor, mode_catalog};
use axum::Json;

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn modes_handler() -> Json<Vec<ModeDescriptor>> {
    Json(mode_catalog())
}
