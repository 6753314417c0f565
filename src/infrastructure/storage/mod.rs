//! Object store access.
//!
//! Everything above this layer talks to [`ObjectStore`]; the S3/MinIO client
//! lives in [`s3`], and tests run against the in-memory store.

use crate::common::error::AppError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::time::Duration;
use time::OffsetDateTime;

pub mod keys;
pub mod s3;

#[cfg(test)]
pub mod memory;

/// Lazy byte stream over (part of) an object.
pub type ObjectStream = BoxStream<'static, std::io::Result<Bytes>>;

pub const DEFAULT_VIDEO_CONTENT_TYPE: &str = "video/mp4";
pub const HLS_MANIFEST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
pub const HLS_SEGMENT_CONTENT_TYPE: &str = "video/mp2t";

#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<OffsetDateTime>,
    pub etag: Option<String>,
}

/// Inclusive byte window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteWindow {
    pub start: u64,
    pub end: u64,
}

impl ByteWindow {
    pub fn to_header(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Overwrites `key` and returns the object's public URL.
    async fn upload(&self, body: Bytes, key: &str, content_type: &str) -> Result<String, AppError>;

    async fn download(&self, key: &str) -> Result<Bytes, AppError>;

    /// Best-effort. Callers replacing an asset log the error and move on.
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    async fn head_metadata(&self, key: &str) -> Result<ObjectMetadata, AppError>;

    /// Opens `window` of `key`, or the whole object when `window` is `None`.
    async fn open_range(&self, key: &str, window: Option<ByteWindow>) -> Result<ObjectStream, AppError>;

    async fn presigned_url(&self, key: &str, ttl: Duration) -> Result<String, AppError>;

    fn public_url(&self, key: &str) -> String;

    fn key_from_url(&self, url: &str) -> Option<String>;
}
