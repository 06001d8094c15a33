//! Anomaly detection handler - the full post-processing pipeline
//!
//! multipart upload -> normalize -> remote detect -> (mask present?)
//! composite + publish -> assemble. The upload is validated before any
//! remote call is made.

use axum::extract::{Multipart, State};
use axum::Json;
use tokio::task;

use crate::models::DetectAnomaliesResponse;
use crate::pipeline::{self, COMPOSITE_MIME};
use crate::{AppError, AppResult, AppState};

use super::model::validate_identifiers;

/// Parsed fields of the detect-anomalies form
#[derive(Default)]
struct DetectForm {
    image: Option<Vec<u8>>,
    project_name: String,
    model_version: String,
    content_type: Option<String>,
}

/// Run anomaly detection on an uploaded image
pub async fn detect_anomalies(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DetectAnomaliesResponse>> {
    let form = read_form(multipart).await?;

    let image = form
        .image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("No image file uploaded.".to_string()))?;
    validate_identifiers(&form.project_name, &form.model_version)?;

    let width = state.config.canonical_width;
    let height = state.config.canonical_height;

    // Decode and resample off the async executor.
    let normalized = task::spawn_blocking(move || pipeline::normalize(&image, width, height)).await??;

    let content_type = form
        .content_type
        .unwrap_or_else(|| normalized.mime_type.to_string());

    tracing::debug!(
        "Submitting {} byte {} image to model {}/{}",
        normalized.encoded.len(),
        content_type,
        form.project_name,
        form.model_version,
    );

    let detection = state
        .detection
        .detect(
            &form.project_name,
            &form.model_version,
            normalized.encoded,
            &content_type,
        )
        .await?;

    // The overlay step is best-effort: a composite or publish failure must
    // not discard a successful classification.
    let mut overlay_url = None;
    if let Some(mask) = detection.raw_mask.clone() {
        let pixels = normalized.pixels;
        let composited =
            task::spawn_blocking(move || pipeline::composite(&pixels, &mask, width, height)).await?;

        match composited {
            Ok(composite) => {
                match pipeline::publish(
                    &state.storage,
                    composite,
                    COMPOSITE_MIME,
                    &state.config.artifact_prefix,
                )
                .await
                {
                    Ok(artifact) => {
                        tracing::debug!(
                            "Overlay stored at s3://{}/{}",
                            artifact.bucket,
                            artifact.key,
                        );
                        overlay_url = Some(artifact.url);
                    }
                    Err(e) => {
                        tracing::warn!("Detection succeeded but overlay publish failed: {}", e);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Detection succeeded but mask compositing failed: {}", e);
            }
        }
    }

    tracing::info!(
        "Detection complete for {}/{}: anomalous={} confidence={:.3} overlay={}",
        form.project_name,
        form.model_version,
        detection.is_anomalous,
        detection.confidence,
        overlay_url.is_some(),
    );

    Ok(Json(pipeline::assemble(detection, overlay_url)))
}

async fn read_form(mut multipart: Multipart) -> AppResult<DetectForm> {
    let mut form = DetectForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.image = Some(bytes.to_vec());
            }
            Some("projectName") => {
                form.project_name = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            Some("modelVersion") => {
                form.model_version = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            Some("contentType") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !text.is_empty() {
                    form.content_type = Some(text);
                }
            }
            // Unknown fields are ignored, matching the reference behavior.
            _ => {}
        }
    }

    Ok(form)
}
