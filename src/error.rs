//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Failure taxonomy for the detection pipeline and its HTTP surface.
///
/// Every variant is scoped to a single request; nothing here is fatal to
/// the process. No failure is retried locally.
#[derive(Debug, Error)]
pub enum AppError {
    /// Uploaded bytes are not a decodable raster image.
    #[error("failed to decode input image: {0}")]
    Decode(String),

    /// The remote inference service rejected or failed the request.
    /// Carries the remote status/message verbatim.
    #[error("detection service error: {0}")]
    DetectionService(String),

    /// Anomaly mask byte length does not match the canonical layout.
    #[error("anomaly mask is {actual} bytes, expected {expected}")]
    MaskDecode { expected: usize, actual: usize },

    /// Object storage rejected or failed the publish.
    #[error("storage error: {0}")]
    Storage(String),

    /// Remote start/stop model call failed.
    #[error("model control error: {0}")]
    ModelControl(String),

    /// Malformed client request (missing file, empty identifiers).
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected local failure (blocking task panic, encode failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.to_string();
        match &self {
            AppError::BadRequest(msg) => tracing::debug!("Bad request: {}", msg),
            _ => tracing::error!("Request failed: {}", message),
        }

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}
