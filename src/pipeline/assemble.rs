//! Final response assembly
//!
//! The outbound payload is built field by field from the detection
//! result; the raw mask has no field on the payload type, so it is
//! stripped on every path by construction.

use crate::models::{DetectAnomaliesResponse, Detection, DetectionPayload};

/// Merge the detection result with the optional artifact locator URL.
pub fn assemble(detection: Detection, overlay_url: Option<String>) -> DetectAnomaliesResponse {
    DetectAnomaliesResponse {
        detect_anomaly_result: DetectionPayload {
            source: detection.source,
            is_anomalous: detection.is_anomalous,
            confidence: detection.confidence,
            anomalies: detection.anomalies,
            anomaly_overlay_url: overlay_url,
        },
    }
}
