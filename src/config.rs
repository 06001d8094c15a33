//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region for both the inference service and object storage
    pub region: String,

    /// Access key id for request signing
    pub access_key_id: String,

    /// Secret access key for request signing
    pub secret_access_key: String,

    /// Bucket receiving anomaly overlay artifacts
    pub artifact_bucket: String,

    /// Key prefix inside the artifact bucket
    pub artifact_prefix: String,

    /// Server port
    pub port: u16,

    /// Canonical width every image and mask is normalized to
    pub canonical_width: u32,

    /// Canonical height every image and mask is normalized to
    pub canonical_height: u32,

    /// Override for the inference service endpoint (local testing)
    pub detection_endpoint: Option<String>,

    /// Override for the object storage endpoint (MinIO / local testing)
    pub storage_endpoint: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            region: env::var("AWS_REGION")
                .unwrap_or_else(|_| "us-east-1".to_string()),

            access_key_id: env::var("AWS_ACCESS_KEY_ID")
                .unwrap_or_default(),

            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY")
                .unwrap_or_default(),

            artifact_bucket: env::var("ARTIFACT_BUCKET")
                .unwrap_or_else(|_| "anomaly-gateway-artifacts".to_string()),

            artifact_prefix: env::var("ARTIFACT_PREFIX")
                .unwrap_or_else(|_| "anomaly-overlays".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),

            canonical_width: env::var("CANONICAL_WIDTH")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or(2268),

            canonical_height: env::var("CANONICAL_HEIGHT")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(4032),

            detection_endpoint: env::var("DETECTION_ENDPOINT").ok(),

            storage_endpoint: env::var("STORAGE_ENDPOINT").ok(),
        }
    }
}

#[cfg(test)]
impl Default for Config {
    /// Fixed-value configuration for tests; never reads the environment.
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            artifact_bucket: "test-artifacts".to_string(),
            artifact_prefix: "anomaly-overlays".to_string(),
            port: 0,
            canonical_width: 2268,
            canonical_height: 4032,
            detection_endpoint: None,
            storage_endpoint: None,
        }
    }
}
