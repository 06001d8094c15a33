//! Model lifecycle handlers - thin pass-through to the remote service

use axum::{extract::State, Json};

use crate::models::{ModelStatusResponse, StartModelRequest, StopModelRequest};
use crate::{AppError, AppResult, AppState};

/// Start hosting a model version
pub async fn start_model(
    State(state): State<AppState>,
    Json(req): Json<StartModelRequest>,
) -> AppResult<Json<ModelStatusResponse>> {
    validate_identifiers(&req.project_name, &req.model_version)?;

    tracing::info!(
        "Starting model {}/{} ({} inference units)",
        req.project_name,
        req.model_version,
        req.min_inference_units,
    );

    let status = state
        .detection
        .start_model(
            &req.project_name,
            &req.model_version,
            req.min_inference_units,
            req.max_inference_units,
            req.client_token.as_deref(),
        )
        .await?;

    Ok(Json(status))
}

/// Stop hosting a model version
pub async fn stop_model(
    State(state): State<AppState>,
    Json(req): Json<StopModelRequest>,
) -> AppResult<Json<ModelStatusResponse>> {
    validate_identifiers(&req.project_name, &req.model_version)?;

    tracing::info!("Stopping model {}/{}", req.project_name, req.model_version);

    let status = state
        .detection
        .stop_model(&req.project_name, &req.model_version)
        .await?;

    Ok(Json(status))
}

pub(crate) fn validate_identifiers(project: &str, model_version: &str) -> AppResult<()> {
    if project.trim().is_empty() {
        return Err(AppError::BadRequest("projectName must not be empty".to_string()));
    }
    if model_version.trim().is_empty() {
        return Err(AppError::BadRequest("modelVersion must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(matches!(
            validate_identifiers("", "1"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_identifiers("widgets", "  "),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_identifiers("widgets", "1").is_ok());
    }
}
