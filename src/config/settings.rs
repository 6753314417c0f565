use serde::Deserialize;
use std::path::PathBuf;
use crate::config::env::{self, EnvKey};

const DEFAULT_PRESIGNED_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub s3_endpoint: Option<String>,
    pub s3_public_url: Option<String>,
    pub s3_bucket: String,
    pub aws_region: String,
    pub aws_access_key: String,
    pub aws_secret_key: String,
    pub scratch_dir: PathBuf,
    pub ffmpeg_path: String,
    pub presigned_url_ttl: u64,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            s3_endpoint: env::get_opt(EnvKey::S3Endpoint),
            s3_public_url: env::get_opt(EnvKey::S3PublicUrl),
            s3_bucket: env::get(EnvKey::S3Bucket)?,
            aws_region: env::get_or(EnvKey::AwsRegion, "us-east-1"),
            aws_access_key: env::get(EnvKey::AwsAccessKey)?,
            aws_secret_key: env::get(EnvKey::AwsSecretKey)?,
            scratch_dir: env::get_opt(EnvKey::ScratchDir)
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, "ffmpeg"),
            presigned_url_ttl: env::get_parsed(EnvKey::PresignedUrlTtl, DEFAULT_PRESIGNED_TTL_SECS),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}
