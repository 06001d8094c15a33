//! Detection wire types and the outbound response payload
//!
//! Inbound types mirror the remote inference service's JSON shapes
//! (PascalCase field names). The outbound payload is a separate,
//! explicitly assembled structure: the raw anomaly mask has no field on
//! it, so it can never leak to a caller.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

/// Top-level body returned by the remote detect call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectAnomalyResponse {
    pub detect_anomaly_result: Option<RemoteDetectionResult>,
}

/// Raw detection result as returned by the remote service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteDetectionResult {
    #[serde(default)]
    pub source: Option<ImageSource>,

    #[serde(default)]
    pub is_anomalous: bool,

    #[serde(default)]
    pub confidence: f32,

    #[serde(default)]
    pub anomalies: Option<Vec<Anomaly>>,

    /// Base64-encoded raw mask bytes; present only for anomalous results
    /// or when the service emits diagnostic data
    #[serde(default)]
    pub anomaly_mask: Option<String>,
}

/// How the analyzed image was supplied to the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "Type")]
    pub source_type: String,
}

/// A single detected anomaly region
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Anomaly {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_anomaly: Option<PixelAnomaly>,
}

/// Pixel-level statistics for an anomaly region
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PixelAnomaly {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_percentage_area: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Decoded detection result as carried through the pipeline
#[derive(Debug, Clone)]
pub struct Detection {
    pub source: Option<ImageSource>,
    pub is_anomalous: bool,
    pub confidence: f32,
    pub anomalies: Option<Vec<Anomaly>>,
    /// Raw per-pixel mask bytes in canonical-resolution layout, if emitted
    pub raw_mask: Option<Vec<u8>>,
}

impl RemoteDetectionResult {
    /// Decode the base64 mask blob and produce the pipeline-facing result.
    ///
    /// A mask that fails to decode is dropped with a warning rather than
    /// failing the request: the classification already succeeded and the
    /// mask only feeds the optional overlay step.
    pub fn into_detection(self) -> Detection {
        let raw_mask = self.anomaly_mask.and_then(|blob| {
            match BASE64.decode(blob.as_bytes()) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!("Dropping undecodable anomaly mask: {}", e);
                    None
                }
            }
        });

        Detection {
            source: self.source,
            is_anomalous: self.is_anomalous,
            confidence: self.confidence,
            anomalies: self.anomalies,
            raw_mask,
        }
    }
}

/// Caller-facing response for `/detect-anomalies`
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectAnomaliesResponse {
    pub detect_anomaly_result: DetectionPayload,
}

/// Detection fields exposed to the caller; the mask is structurally absent
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ImageSource>,

    pub is_anomalous: bool,

    pub confidence: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<Vec<Anomaly>>,

    /// Retrieval URL of the published overlay artifact, when one was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly_overlay_url: Option<String>,
}
