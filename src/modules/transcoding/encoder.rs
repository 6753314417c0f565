//! External encoder capability.
//!
//! The orchestrator only sees [`Encoder`]; production uses ffmpeg, tests
//! use a scripted double.

use super::model::QualityProfile;
use crate::common::error::AppError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

const STDERR_TAIL_LINES: usize = 5;

pub struct EncodeRequest<'a> {
    pub input: &'a Path,
    pub output_dir: &'a Path,
    pub profile: &'a QualityProfile,
    pub segment_seconds: u32,
}

/// Files produced for one quality, all inside the request's `output_dir`.
#[derive(Debug, Clone)]
pub struct EncodeOutput {
    pub manifest_path: PathBuf,
    /// In playback order.
    pub segment_paths: Vec<PathBuf>,
}

#[async_trait]
pub trait Encoder: Send + Sync {
    async fn encode(&self, req: EncodeRequest<'_>) -> Result<EncodeOutput, AppError>;
}

pub struct FfmpegEncoder {
    binary: String,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    fn args(req: &EncodeRequest<'_>, manifest_path: &Path) -> Vec<String> {
        let profile = req.profile;
        let segment_pattern = req.output_dir.join("segment_%03d.ts");

        vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            req.input.to_string_lossy().to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:v".to_string(),
            profile.bandwidth.to_string(),
            "-b:a".to_string(),
            "128k".to_string(),
            "-s".to_string(),
            profile.resolution(),
            "-hls_time".to_string(),
            req.segment_seconds.to_string(),
            "-hls_playlist_type".to_string(),
            "vod".to_string(),
            "-hls_segment_filename".to_string(),
            segment_pattern.to_string_lossy().to_string(),
            "-f".to_string(),
            "hls".to_string(),
            manifest_path.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(&self, req: EncodeRequest<'_>) -> Result<EncodeOutput, AppError> {
        let manifest_path = req.output_dir.join(format!("{}.m3u8", req.profile.quality));
        let args = Self::args(&req, &manifest_path);

        debug!("FFmpeg args: {:?}", args);

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AppError::EncodeFailure(format!("failed to execute {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join(" | ");
            return Err(AppError::EncodeFailure(format!(
                "{} exited with {} for {}: {}",
                self.binary, output.status, req.profile.quality, tail
            )));
        }

        let segment_paths = list_segments(req.output_dir).await?;
        Ok(EncodeOutput {
            manifest_path,
            segment_paths,
        })
    }
}

/// `.ts` files in `dir`, sorted by name (`segment_000.ts`, `segment_001.ts`, ...).
pub async fn list_segments(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut segments = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("ts") {
            segments.push(path);
        }
    }

    segments.sort();
    Ok(segments)
}
