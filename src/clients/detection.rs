//! Remote inference client
//!
//! Talks to the hosted visual-anomaly-detection REST API: one inference
//! call plus the start/stop model lifecycle calls that share its
//! connection context. Pass-through only - no retries, no local state
//! machine, remote errors surface verbatim.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    DetectAnomalyResponse, Detection, ModelStatusResponse, StartModelBody,
};

use super::sigv4::{amz_date, sha256_hex, Credentials, RequestSigner};

const API_VERSION: &str = "2020-11-20";

/// Long-lived client for the remote detection service
#[derive(Debug, Clone)]
pub struct DetectionClient {
    http: reqwest::Client,
    endpoint: String,
    signer: RequestSigner,
}

impl DetectionClient {
    /// Create the client from configuration and a shared pooled transport.
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        let endpoint = config
            .detection_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://lookoutvision.{}.amazonaws.com", config.region));

        let signer = RequestSigner::new(
            Credentials {
                access_key_id: config.access_key_id.clone(),
                secret_access_key: config.secret_access_key.clone(),
            },
            &config.region,
            "lookoutvision",
        );

        Self { http, endpoint, signer }
    }

    /// Submit a normalized image for anomaly detection.
    ///
    /// The returned mask bytes, if any, are passed through undecoded
    /// beyond the wire encoding; interpreting them is the compositor's
    /// concern.
    pub async fn detect(
        &self,
        project: &str,
        model_version: &str,
        image: Vec<u8>,
        content_type: &str,
    ) -> AppResult<Detection> {
        let url = format!(
            "{}/{}/projects/{}/models/{}/detect",
            self.endpoint, API_VERSION, project, model_version,
        );

        let response = self
            .send_signed(&url, Some(content_type), &[], image)
            .await
            .map_err(AppError::DetectionService)?;

        if response.status().is_success() {
            let body: DetectAnomalyResponse = response
                .json()
                .await
                .map_err(|e| AppError::DetectionService(format!("invalid response body: {e}")))?;
            let result = body.detect_anomaly_result.ok_or_else(|| {
                AppError::DetectionService("response missing DetectAnomalyResult".to_string())
            })?;
            Ok(result.into_detection())
        } else {
            Err(AppError::DetectionService(remote_error(response).await))
        }
    }

    /// Start hosting a model version. Idempotent for a given client token;
    /// the remote service owns that guarantee.
    pub async fn start_model(
        &self,
        project: &str,
        model_version: &str,
        min_units: u32,
        max_units: Option<u32>,
        client_token: Option<&str>,
    ) -> AppResult<ModelStatusResponse> {
        let url = format!(
            "{}/{}/projects/{}/models/{}/start",
            self.endpoint, API_VERSION, project, model_version,
        );

        let body = StartModelBody {
            min_inference_units: min_units,
            max_inference_units: max_units,
        };
        let payload = serde_json::to_vec(&body)
            .map_err(|e| AppError::Internal(format!("failed to encode start request: {e}")))?;

        let mut extra = Vec::new();
        if let Some(token) = client_token {
            extra.push(("x-amzn-client-token", token.to_string()));
        }

        let response = self
            .send_signed(&url, Some("application/json"), &extra, payload)
            .await
            .map_err(AppError::ModelControl)?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| AppError::ModelControl(format!("invalid response body: {e}")))
        } else {
            Err(AppError::ModelControl(remote_error(response).await))
        }
    }

    /// Stop hosting a model version.
    pub async fn stop_model(
        &self,
        project: &str,
        model_version: &str,
    ) -> AppResult<ModelStatusResponse> {
        let url = format!(
            "{}/{}/projects/{}/models/{}/stop",
            self.endpoint, API_VERSION, project, model_version,
        );

        let response = self
            .send_signed(&url, Some("application/json"), &[], Vec::new())
            .await
            .map_err(AppError::ModelControl)?;

        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| AppError::ModelControl(format!("invalid response body: {e}")))
        } else {
            Err(AppError::ModelControl(remote_error(response).await))
        }
    }

    /// Sign and send a POST; errors are stringified for the caller to
    /// wrap in the right taxonomy variant.
    async fn send_signed(
        &self,
        url: &str,
        content_type: Option<&str>,
        extra_headers: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<reqwest::Response, String> {
        let (authorization, headers) = sign_for_transport(
            &self.signer,
            "POST",
            url,
            content_type,
            extra_headers,
            &body,
        )?;

        let mut request = self.http.post(url).body(body);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value);
        }
        request
            .header("authorization", authorization)
            .send()
            .await
            .map_err(|e| e.to_string())
    }
}

/// Build the signed header set for a request and compute its
/// `Authorization` value. Shared with the storage client.
pub(super) fn sign_for_transport(
    signer: &RequestSigner,
    method: &str,
    url: &str,
    content_type: Option<&str>,
    extra_headers: &[(&str, String)],
    body: &[u8],
) -> Result<(String, BTreeMap<String, String>), String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| format!("invalid request URL: {e}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| format!("request URL has no host: {url}"))?;
    let host = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let timestamp = Utc::now();
    let payload_hash = sha256_hex(body);

    let mut headers = BTreeMap::new();
    headers.insert("host".to_string(), host);
    headers.insert("x-amz-date".to_string(), amz_date(timestamp));
    headers.insert("x-amz-content-sha256".to_string(), payload_hash.clone());
    if let Some(ct) = content_type {
        headers.insert("content-type".to_string(), ct.to_string());
    }
    for (name, value) in extra_headers {
        headers.insert((*name).to_string(), value.clone());
    }

    let authorization = signer.authorization(
        method,
        parsed.path(),
        parsed.query().unwrap_or(""),
        &headers,
        &payload_hash,
        timestamp,
    );

    // reqwest sets Host itself; drop it from the outgoing set but keep it
    // in the signature above.
    headers.remove("host");

    Ok((authorization, headers))
}

async fn remote_error(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if text.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {text}")
    }
}
