//! Artifact publishing - collision-free keys and durable storage

use chrono::Utc;
use uuid::Uuid;

use crate::clients::StorageClient;
use crate::error::AppResult;

/// Locator for a published composite; never mutated after creation
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub bucket: String,
    pub key: String,
    pub url: String,
}

/// Build a unique object key for an overlay artifact.
///
/// The token combines a millisecond timestamp with a random UUIDv4, so
/// concurrent publishes never collide and there is no shared counter to
/// contend on.
pub fn object_key(prefix: &str, mime_type: &str) -> String {
    let token = format!("{}_{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple());
    format!(
        "{}/anomaly_overlay_{}.{}",
        prefix.trim_end_matches('/'),
        token,
        extension_for(mime_type),
    )
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        _ => "bin",
    }
}

/// Write a composite to object storage and return its locator.
pub async fn publish(
    storage: &StorageClient,
    composite: Vec<u8>,
    mime_type: &str,
    prefix: &str,
) -> AppResult<StoredArtifact> {
    let key = object_key(prefix, mime_type);
    storage.put_object(&key, mime_type, composite).await?;

    let url = storage.object_url(&key);
    tracing::info!("Published overlay artifact: {}", url);

    Ok(StoredArtifact {
        bucket: storage.bucket().to_string(),
        key,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_follow_the_naming_contract() {
        let key = object_key("anomaly-overlays", "image/png");
        assert!(key.starts_with("anomaly-overlays/anomaly_overlay_"));
        assert!(key.ends_with(".png"));

        let key = object_key("prefix/", "image/jpeg");
        assert!(key.starts_with("prefix/anomaly_overlay_"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn unknown_mime_falls_back_to_bin() {
        assert_eq!(extension_for("application/octet-stream"), "bin");
    }

    #[test]
    fn keys_never_collide() {
        let keys: HashSet<String> = (0..1000)
            .map(|_| object_key("anomaly-overlays", "image/png"))
            .collect();
        assert_eq!(keys.len(), 1000);
    }
}
