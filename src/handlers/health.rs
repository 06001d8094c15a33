//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    region: String,
    artifact_bucket: String,
    canonical_resolution: String,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        region: state.config.region.clone(),
        artifact_bucket: state.config.artifact_bucket.clone(),
        canonical_resolution: format!(
            "{}x{}",
            state.config.canonical_width, state.config.canonical_height,
        ),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
