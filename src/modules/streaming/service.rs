use super::range::RangeWindow;
use crate::common::error::AppError;
use crate::infrastructure::storage::{ObjectStore, ObjectStream, DEFAULT_VIDEO_CONTENT_TYPE};
use time::OffsetDateTime;
use tracing::debug;

/// Everything needed to answer a (possibly partial) object request.
pub struct RangeStream {
    pub window: RangeWindow,
    pub content_type: String,
    pub etag: Option<String>,
    pub last_modified: Option<OffsetDateTime>,
    pub body: ObjectStream,
}

pub struct StreamingService;

impl StreamingService {
    pub async fn stream_range(
        store: &dyn ObjectStore,
        key: &str,
        range_header: Option<&str>,
    ) -> Result<RangeStream, AppError> {
        let metadata = store.head_metadata(key).await?;
        if metadata.size == 0 {
            return Err(AppError::EmptyObject(key.to_string()));
        }

        let window = RangeWindow::resolve(metadata.size, range_header)?;
        debug!(
            "Streaming {} bytes {}-{}/{} (partial: {})",
            key, window.start, window.end, window.total, window.is_partial
        );

        let body = store
            .open_range(key, window.is_partial.then(|| window.byte_window()))
            .await?;

        Ok(RangeStream {
            window,
            content_type: metadata
                .content_type
                .unwrap_or_else(|| DEFAULT_VIDEO_CONTENT_TYPE.to_string()),
            etag: metadata.etag,
            last_modified: metadata.last_modified,
            body,
        })
    }
}
