use crate::common::error::AppError;
use crate::infrastructure::storage::{keys, ObjectStore, HLS_MANIFEST_CONTENT_TYPE, HLS_SEGMENT_CONTENT_TYPE};
use crate::modules::hls::manifest;
use crate::modules::hls::model::{HlsSegment, VariantPlaylist};
use crate::modules::transcoding::encoder::{EncodeOutput, EncodeRequest, Encoder};
use crate::modules::transcoding::model::QualityProfile;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared collaborators for every transcoding job.
pub struct TranscodeContext {
    pub store: Arc<dyn ObjectStore>,
    pub encoder: Arc<dyn Encoder>,
    pub scratch_root: PathBuf,
    pub segment_seconds: u32,
}

#[derive(Debug, Clone)]
pub struct JobSpec {
    pub job_id: String,
    pub episode_id: String,
    pub source_url: String,
    pub qualities: Vec<String>,
}

/// Runs one job inside its own scratch directory.
///
/// The directory is removed on every exit path; if this future is dropped or
/// panics, the `TempDir` guard removes it instead.
pub async fn process_job(ctx: &TranscodeContext, job: &JobSpec) -> Result<(), AppError> {
    info!("🎥 Processing job {} for episode {}", job.job_id, job.episode_id);

    tokio::fs::create_dir_all(&ctx.scratch_root).await?;
    let scratch = tempfile::Builder::new()
        .prefix(&format!("transcode-{}-", keys::sanitize_filename(&job.episode_id)))
        .tempdir_in(&ctx.scratch_root)?;

    let result = transcode_in(ctx, job, scratch.path()).await;

    // Recursive delete of every rendition; keep it off the async workers.
    let scratch_path = scratch.path().to_path_buf();
    match tokio::task::spawn_blocking(move || scratch.close()).await {
        Ok(Ok(())) => info!("🧹 Cleaned up scratch directory {}", scratch_path.display()),
        Ok(Err(e)) => warn!("Failed to clean up scratch directory {}: {}", scratch_path.display(), e),
        Err(e) => warn!("Cleanup task for scratch directory {} did not finish: {}", scratch_path.display(), e),
    }

    result
}

async fn transcode_in(ctx: &TranscodeContext, job: &JobSpec, scratch: &Path) -> Result<(), AppError> {
    // 1. Download source
    let key = ctx
        .store
        .key_from_url(&job.source_url)
        .ok_or_else(|| AppError::NotFound(format!("Source object for {}", job.source_url)))?;

    info!("⬇️ Downloading source {} for episode {}", key, job.episode_id);
    let data = ctx.store.download(&key).await?;

    let extension = Path::new(&key).extension().and_then(|e| e.to_str()).unwrap_or("mp4");
    let input = scratch.join(format!("input.{}", extension));
    tokio::fs::write(&input, &data).await?;
    info!("⬇️ Downloaded {} bytes, transcoding {} qualities", data.len(), job.qualities.len());
    drop(data);

    // 2. Encode and upload each known quality
    for quality in &job.qualities {
        let Some(profile) = QualityProfile::find(quality) else {
            warn!("Skipping: {}", AppError::UnknownQuality(quality.clone()));
            continue;
        };

        let output_dir = scratch.join(profile.quality);
        tokio::fs::create_dir_all(&output_dir).await?;

        info!(
            "Transcoding {} ({} @ {}bps) for episode {}",
            profile.quality,
            profile.resolution(),
            profile.bandwidth,
            job.episode_id
        );

        let output = ctx
            .encoder
            .encode(EncodeRequest {
                input: &input,
                output_dir: &output_dir,
                profile,
                segment_seconds: ctx.segment_seconds,
            })
            .await?;

        upload_variant(ctx.store.as_ref(), &job.episode_id, profile, &output).await?;
    }

    Ok(())
}

/// Uploads the variant manifest, then each segment it lists, in order.
///
/// The encoder's playlist is re-rendered so that segment URIs are bare file
/// names next to the manifest, and every listed segment must exist on disk.
async fn upload_variant(
    store: &dyn ObjectStore,
    episode_id: &str,
    profile: &QualityProfile,
    output: &EncodeOutput,
) -> Result<(), AppError> {
    let produced: HashMap<&str, &PathBuf> = output
        .segment_paths
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(|n| (n, p)))
        .collect();

    let raw = tokio::fs::read_to_string(&output.manifest_path).await?;
    let mut segments = Vec::new();
    let mut files = Vec::new();
    for listed in manifest::parse_variant_manifest(&raw) {
        let name = listed.url.rsplit(['/', '\\']).next().unwrap_or_default();
        let Some(path) = produced.get(name) else {
            return Err(AppError::EncodeFailure(format!(
                "{} playlist lists {} but no such segment was written",
                profile.quality, listed.url
            )));
        };
        files.push((name.to_string(), *path));
        segments.push(HlsSegment {
            url: name.to_string(),
            ..listed
        });
    }

    if segments.is_empty() {
        return Err(AppError::EncodeFailure(format!("{} playlist lists no segments", profile.quality)));
    }
    if produced.len() > segments.len() {
        warn!(
            "{} of {} segments for {} are not in the playlist and will not be uploaded",
            produced.len() - segments.len(),
            produced.len(),
            profile.quality
        );
    }

    let playlist = VariantPlaylist {
        target_duration: segments
            .iter()
            .map(|s| s.duration.ceil() as u32)
            .max()
            .unwrap_or(1)
            .max(1),
        ..VariantPlaylist::default()
    };
    let manifest_key = keys::variant_manifest_key(episode_id, profile.quality);
    store
        .upload(
            Bytes::from(manifest::generate_variant_manifest(&segments, &playlist)),
            &manifest_key,
            HLS_MANIFEST_CONTENT_TYPE,
        )
        .await?;

    for (file_name, path) in &files {
        let data = tokio::fs::read(path).await?;
        let key = keys::variant_file_key(episode_id, profile.quality, file_name);
        store.upload(Bytes::from(data), &key, HLS_SEGMENT_CONTENT_TYPE).await?;
    }

    info!(
        "✅ Uploaded {} segments for {} of episode {}",
        files.len(),
        profile.quality,
        episode_id
    );
    Ok(())
}
