use super::{keys, ByteWindow, ObjectMetadata, ObjectStore, ObjectStream};
use crate::common::error::AppError;
use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use bytes::Bytes;
use futures_util::StreamExt;
use std::time::Duration;
use time::OffsetDateTime;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
    pub bucket: String,
    public_base_url: String,
    path_style: bool,
}

pub struct StorageOptions<'a> {
    pub endpoint: Option<&'a str>,
    pub public_url: Option<&'a str>,
    pub region: &'a str,
    pub bucket: &'a str,
    pub access_key: &'a str,
    pub secret_key: &'a str,
}

impl StorageService {
    pub fn new(options: StorageOptions<'_>) -> Self {
        let credentials = Credentials::new(options.access_key, options.secret_key, None, None, "static");

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(options.region.to_string()))
            .credentials_provider(credentials);

        if let Some(endpoint) = options.endpoint {
            builder = builder
                .endpoint_url(endpoint)
                .force_path_style(true); // Required for MinIO
        }

        let client = Client::from_conf(builder.build());
        let public_base_url = public_base_url(&options);

        info!("✅ S3 client ready (bucket {}, public base {})", options.bucket, public_base_url);

        Self {
            client,
            bucket: options.bucket.to_string(),
            public_base_url,
            path_style: options.endpoint.is_some(),
        }
    }
}

fn public_base_url(options: &StorageOptions<'_>) -> String {
    if let Some(public) = options.public_url {
        return public.trim_end_matches('/').to_string();
    }
    match options.endpoint {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), options.bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", options.bucket, options.region),
    }
}

fn store_failure<E>(op: &str, key: &str, err: SdkError<E>) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AppError::StoreFailure(format!("{} {}: {}", op, key, DisplayErrorContext(err)))
}

#[async_trait]
impl ObjectStore for StorageService {
    async fn upload(&self, body: Bytes, key: &str, content_type: &str) -> Result<String, AppError> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| store_failure("upload", key, e))?;

        debug!("Uploaded {} ({} bytes, {})", key, size, content_type);
        Ok(self.public_url(key))
    }

    async fn download(&self, key: &str) -> Result<Bytes, AppError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.is_no_such_key() => AppError::NotFound(format!("Object {}", key)),
                _ => store_failure("download", key, e),
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| AppError::StoreFailure(format!("download {}: {}", key, e)))?;

        Ok(data.into_bytes())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| store_failure("delete", key, e))?;

        Ok(())
    }

    async fn head_metadata(&self, key: &str) -> Result<ObjectMetadata, AppError> {
        let resp = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.is_not_found() => AppError::NotFound(format!("Object {}", key)),
                _ => store_failure("head", key, e),
            })?;

        Ok(ObjectMetadata {
            size: resp.content_length().unwrap_or(0).max(0) as u64,
            content_type: resp.content_type().map(str::to_string),
            last_modified: resp
                .last_modified()
                .and_then(|dt| OffsetDateTime::from_unix_timestamp(dt.secs()).ok()),
            etag: resp.e_tag().map(str::to_string),
        })
    }

    async fn open_range(&self, key: &str, window: Option<ByteWindow>) -> Result<ObjectStream, AppError> {
        let mut req = self.client.get_object().bucket(&self.bucket).key(key);

        if let Some(w) = window {
            req = req.range(w.to_header());
        }

        let resp = req.send().await.map_err(|e| match e.as_service_error() {
            Some(se) if se.is_no_such_key() => AppError::NotFound(format!("Object {}", key)),
            _ => store_failure("get", key, e),
        })?;

        if window.is_none() && resp.content_length() == Some(0) {
            return Err(AppError::EmptyObject(key.to_string()));
        }

        let reader = resp.body.into_async_read();
        Ok(ReaderStream::new(reader).boxed())
    }

    async fn presigned_url(&self, key: &str, ttl: Duration) -> Result<String, AppError> {
        let config = PresigningConfig::expires_in(ttl)
            .map_err(|e| AppError::StoreFailure(format!("presign {}: {}", key, e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| store_failure("presign", key, e))?;

        Ok(request.uri().to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        let bucket = self.path_style.then_some(self.bucket.as_str());
        keys::key_from_url(url, &self.public_base_url, bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options<'a>(endpoint: Option<&'a str>, public_url: Option<&'a str>) -> StorageOptions<'a> {
        bucket_options("media", endpoint, public_url)
    }

    fn bucket_options<'a>(bucket: &'a str, endpoint: Option<&'a str>, public_url: Option<&'a str>) -> StorageOptions<'a> {
        StorageOptions {
            endpoint,
            public_url,
            region: "eu-west-1",
            bucket,
            access_key: "key",
            secret_key: "secret",
        }
    }

    #[test]
    fn aws_public_url_is_virtual_hosted() {
        let storage = StorageService::new(options(None, None));
        let url = storage.public_url("hls/episodes/ep1/master.m3u8");
        assert_eq!(url, "https://media.s3.eu-west-1.amazonaws.com/hls/episodes/ep1/master.m3u8");
        assert_eq!(storage.key_from_url(&url).as_deref(), Some("hls/episodes/ep1/master.m3u8"));
    }

    #[test]
    fn minio_public_url_is_path_style_and_round_trips() {
        let storage = StorageService::new(options(Some("http://localhost:9000/"), None));
        let url = storage.public_url("videos/episodes/ep1/1-a.mp4");
        assert_eq!(url, "http://localhost:9000/media/videos/episodes/ep1/1-a.mp4");
        assert_eq!(storage.key_from_url(&url).as_deref(), Some("videos/episodes/ep1/1-a.mp4"));
    }

    #[test]
    fn configured_public_url_wins() {
        let storage = StorageService::new(options(Some("http://minio:9000"), Some("https://cdn.example.com/")));
        assert_eq!(storage.public_url("a/b.ts"), "https://cdn.example.com/a/b.ts");
        assert_eq!(storage.key_from_url("https://cdn.example.com/a/b.ts").as_deref(), Some("a/b.ts"));
    }

    #[test]
    fn public_url_with_path_round_trips() {
        for endpoint in [None, Some("http://minio:9000")] {
            let storage = StorageService::new(options(endpoint, Some("https://cdn.example.com/media")));
            let url = storage.public_url("hls/episodes/ep1/master.m3u8");
            assert_eq!(url, "https://cdn.example.com/media/hls/episodes/ep1/master.m3u8");
            assert_eq!(storage.key_from_url(&url).as_deref(), Some("hls/episodes/ep1/master.m3u8"));
        }
    }

    #[test]
    fn bucket_named_like_a_key_prefix_round_trips() {
        let aws = StorageService::new(bucket_options("videos", None, None));
        let url = aws.public_url("videos/episodes/ep1/1-a.mp4");
        assert_eq!(aws.key_from_url(&url).as_deref(), Some("videos/episodes/ep1/1-a.mp4"));

        let minio = StorageService::new(bucket_options("videos", Some("http://localhost:9000"), None));
        let url = minio.public_url("videos/episodes/ep1/1-a.mp4");
        assert_eq!(url, "http://localhost:9000/videos/videos/episodes/ep1/1-a.mp4");
        assert_eq!(minio.key_from_url(&url).as_deref(), Some("videos/episodes/ep1/1-a.mp4"));
    }
}
