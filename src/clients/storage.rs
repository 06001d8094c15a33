//! Object storage client
//!
//! Durable writes to an S3-compatible bucket. Virtual-hosted addressing
//! against AWS, path-style when an endpoint override points at a local
//! store. Retrieval URLs are derived locally from bucket, region, and
//! key - never from a backend redirect.

use crate::config::Config;
use crate::error::{AppError, AppResult};

use super::detection::sign_for_transport;
use super::sigv4::{Credentials, RequestSigner};

/// Long-lived client for the artifact bucket
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    signer: RequestSigner,
}

impl StorageClient {
    /// Create the client from configuration and a shared pooled transport.
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        let signer = RequestSigner::new(
            Credentials {
                access_key_id: config.access_key_id.clone(),
                secret_access_key: config.secret_access_key.clone(),
            },
            &config.region,
            "s3",
        );

        Self {
            http,
            bucket: config.artifact_bucket.clone(),
            region: config.region.clone(),
            endpoint: config.storage_endpoint.clone(),
            signer,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Deterministic retrieval URL for an object key.
    pub fn object_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key),
        }
    }

    /// Write an object durably. Single attempt; failure is the caller's
    /// to handle.
    pub async fn put_object(&self, key: &str, content_type: &str, body: Vec<u8>) -> AppResult<()> {
        let url = self.object_url(key);

        let (authorization, headers) = sign_for_transport(
            &self.signer,
            "PUT",
            &url,
            Some(content_type),
            &[],
            &body,
        )
        .map_err(AppError::Storage)?;

        let mut request = self.http.put(&url).body(body);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value);
        }
        let response = request
            .header("authorization", authorization)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(AppError::Storage(format!("{status}: {text}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_is_virtual_hosted_by_default() {
        let client = StorageClient::new(&Config::default(), reqwest::Client::new());
        assert_eq!(
            client.object_url("anomaly-overlays/anomaly_overlay_1_a.png"),
            "https://test-artifacts.s3.us-east-1.amazonaws.com/anomaly-overlays/anomaly_overlay_1_a.png",
        );
    }

    #[test]
    fn endpoint_override_switches_to_path_style() {
        let config = Config {
            storage_endpoint: Some("http://localhost:9000/".to_string()),
            ..Config::default()
        };
        let client = StorageClient::new(&config, reqwest::Client::new());
        assert_eq!(
            client.object_url("prefix/key.png"),
            "http://localhost:9000/test-artifacts/prefix/key.png",
        );
    }
}
