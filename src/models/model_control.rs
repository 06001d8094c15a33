//! Model lifecycle request/response types
//!
//! The remote service owns the model state machine; STARTING / HOSTED /
//! STOPPING and friends are opaque strings reported back as-is.

use serde::{Deserialize, Serialize};

/// Body for `POST /start-model`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartModelRequest {
    pub project_name: String,
    pub model_version: String,
    pub min_inference_units: u32,
    pub max_inference_units: Option<u32>,
    /// Idempotency token; the remote service guarantees that repeated
    /// starts with the same token do not create a second instance
    pub client_token: Option<String>,
}

/// Body for `POST /stop-model`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopModelRequest {
    pub project_name: String,
    pub model_version: String,
}

/// Wire body sent to the remote start call
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartModelBody {
    pub min_inference_units: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_inference_units: Option<u32>,
}

/// Remote status reported by both start and stop
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelStatusResponse {
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_accepts_optional_fields() {
        let body = r#"{"projectName": "widgets", "modelVersion": "1", "minInferenceUnits": 1}"#;
        let req: StartModelRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.project_name, "widgets");
        assert!(req.max_inference_units.is_none());
        assert!(req.client_token.is_none());
    }

    #[test]
    fn start_body_omits_absent_max_units() {
        let body = StartModelBody { min_inference_units: 1, max_inference_units: None };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"MinInferenceUnits":1}"#);

        let body = StartModelBody { min_inference_units: 1, max_inference_units: Some(3) };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""MaxInferenceUnits":3"#));
    }

    #[test]
    fn status_is_passed_through_opaquely() {
        let resp: ModelStatusResponse = serde_json::from_str(r#"{"Status": "STARTING"}"#).unwrap();
        assert_eq!(resp.status.as_deref(), Some("STARTING"));
    }
}
