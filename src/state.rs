use crate::config::settings::AppConfig;
use crate::infrastructure::storage::ObjectStore;
use crate::modules::transcoding::service::TranscodingService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<dyn ObjectStore>,
    pub transcoder: TranscodingService,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn ObjectStore>, transcoder: TranscodingService) -> Self {
        Self {
            config,
            storage,
            transcoder,
        }
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::common::error::AppError;
    use crate::infrastructure::storage::memory::MemoryStore;
    use crate::modules::transcoding::encoder::{EncodeOutput, EncodeRequest, Encoder};
    use crate::modules::transcoding::service::{TranscodeSettings, SEGMENT_SECONDS};
    use async_trait::async_trait;
    use std::path::Path;

    /// Encoder that always refuses; router tests never need real output.
    pub struct RefusingEncoder;

    #[async_trait]
    impl Encoder for RefusingEncoder {
        async fn encode(&self, _req: EncodeRequest<'_>) -> Result<EncodeOutput, AppError> {
            Err(AppError::EncodeFailure("encoding disabled in tests".to_string()))
        }
    }

    pub fn test_config(scratch: &Path) -> AppConfig {
        AppConfig {
            server_port: 0,
            s3_endpoint: None,
            s3_public_url: None,
            s3_bucket: "media".to_string(),
            aws_region: "us-east-1".to_string(),
            aws_access_key: "test".to_string(),
            aws_secret_key: "test".to_string(),
            scratch_dir: scratch.to_path_buf(),
            ffmpeg_path: "ffmpeg".to_string(),
            presigned_url_ttl: 900,
            max_upload_bytes: 1024 * 1024,
        }
    }

    pub fn test_state(store: Arc<MemoryStore>, scratch: &Path) -> AppState {
        let transcoder = TranscodingService::new(
            store.clone(),
            Arc::new(RefusingEncoder),
            TranscodeSettings {
                scratch_root: scratch.to_path_buf(),
                segment_seconds: SEGMENT_SECONDS,
            },
        );
        AppState::new(test_config(scratch), store, transcoder)
    }
}
