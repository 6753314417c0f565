use super::dto::MasterManifestRequest;
use super::manifest;
use super::model::HlsVariant;
use crate::common::error::AppError;
use crate::infrastructure::storage::{keys, ObjectStore};
use tracing::{debug, warn};

pub struct HlsService;

impl HlsService {
    /// Master manifest for an episode: the stored render if it can be read,
    /// otherwise one regenerated from the stored variants.
    pub async fn master_manifest(store: &dyn ObjectStore, req: &MasterManifestRequest) -> Result<String, AppError> {
        if let Some(url) = &req.hls_manifest_url {
            match store.key_from_url(url) {
                Some(key) => match Self::fetch_manifest(store, &key).await {
                    Ok(text) => {
                        debug!(
                            "Serving stored master manifest {} ({} variants)",
                            key,
                            manifest::parse_master_manifest(&text).len()
                        );
                        return Ok(text);
                    }
                    Err(e) => warn!("Stored master manifest {} unreadable, regenerating: {}", key, e),
                },
                None => warn!("Cannot resolve object key from manifest URL {}", url),
            }
        }

        let Some(stored) = req.hls_variants.as_ref().filter(|v| !v.is_empty()) else {
            return Err(AppError::NotFound("HLS manifest".to_string()));
        };

        let variants: Vec<HlsVariant> = stored
            .values()
            .map(|v| HlsVariant {
                manifest_url: v.manifest_url.clone(),
                resolution: v.resolution.clone(),
                bandwidth: v.bandwidth,
                codecs: v.codecs.clone(),
                frame_rate: v.frame_rate,
            })
            .collect();

        let base_url = req
            .hls_manifest_url
            .as_deref()
            .and_then(|url| url.rfind('/').map(|i| &url[..i]));

        debug!("Regenerating master manifest from {} variants", variants.len());
        Ok(manifest::generate_master_manifest(&variants, base_url))
    }

    /// Manifest text stored at `key`, returned verbatim.
    pub async fn fetch_manifest(store: &dyn ObjectStore, key: &str) -> Result<String, AppError> {
        let bytes = store.download(key).await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::StoreFailure(format!("manifest {} is not valid UTF-8", key)))
    }

    pub async fn episode_manifest(store: &dyn ObjectStore, episode_id: &str, file: &str) -> Result<String, AppError> {
        Self::fetch_manifest(store, &keys::hls_file_key(episode_id, file)).await
    }

    pub async fn variant_manifest(
        store: &dyn ObjectStore,
        episode_id: &str,
        quality: &str,
        file: &str,
    ) -> Result<String, AppError> {
        Self::fetch_manifest(store, &keys::variant_file_key(episode_id, quality, file)).await
    }
}
