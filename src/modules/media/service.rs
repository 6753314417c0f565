use crate::common::error::AppError;
use crate::infrastructure::storage::keys::{self, AssetKind};
use crate::infrastructure::storage::ObjectStore;
use bytes::Bytes;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{info, warn};

/// A stored asset after upload.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    pub key: String,
    pub url: String,
}

pub struct MediaService;

impl MediaService {
    /// Uploads a new episode asset, removing the one it supersedes first.
    ///
    /// Failing to delete the previous object never blocks the upload.
    pub async fn replace_asset(
        store: &dyn ObjectStore,
        kind: AssetKind,
        episode_id: &str,
        filename: &str,
        body: Bytes,
        previous_url: Option<&str>,
    ) -> Result<StoredAsset, AppError> {
        if let Some(previous) = previous_url.filter(|u| !u.trim().is_empty()) {
            Self::discard_previous(store, previous).await;
        }

        let sanitized = keys::sanitize_filename(filename);
        let key = keys::asset_key(kind, episode_id, &sanitized, OffsetDateTime::now_utc());
        let content_type = kind.content_type(&sanitized);

        info!("⬆️ Uploading {} ({} bytes, {}) for episode {}", key, body.len(), content_type, episode_id);
        let url = store.upload(body, &key, &content_type).await?;

        Ok(StoredAsset { key, url })
    }

    async fn discard_previous(store: &dyn ObjectStore, previous_url: &str) {
        let Some(key) = store.key_from_url(previous_url) else {
            warn!("Could not resolve previous asset {} to a key, leaving it in place", previous_url);
            return;
        };

        match store.delete(&key).await {
            Ok(()) => info!("🗑️ Deleted superseded asset {}", key),
            Err(e) => warn!("Failed to delete superseded asset {}: {}", key, e),
        }
    }

    pub async fn presigned_url(store: &dyn ObjectStore, key: &str, ttl_seconds: u64) -> Result<String, AppError> {
        if key.trim().is_empty() {
            return Err(AppError::BadRequest("key must not be empty".to_string()));
        }
        store.presigned_url(key, Duration::from_secs(ttl_seconds)).await
    }
}
