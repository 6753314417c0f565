use super::dto::{HlsManifestSet, JobResult, JobTicket, VariantInfo};
use super::encoder::Encoder;
use super::jobs::JobTable;
use super::model::{default_qualities, JobStatus, QualityProfile, TranscodingJob};
use crate::common::error::AppError;
use crate::infrastructure::storage::{keys, ObjectStore, HLS_MANIFEST_CONTENT_TYPE};
use crate::modules::hls::manifest;
use crate::modules::hls::model::HlsVariant;
use crate::workers::transcoder::{self, JobSpec, TranscodeContext};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const SEGMENT_SECONDS: u32 = 10;

pub struct TranscodeSettings {
    pub scratch_root: PathBuf,
    pub segment_seconds: u32,
}

#[derive(Clone)]
pub struct TranscodingService {
    ctx: Arc<TranscodeContext>,
    jobs: JobTable,
}

impl TranscodingService {
    pub fn new(store: Arc<dyn ObjectStore>, encoder: Arc<dyn Encoder>, settings: TranscodeSettings) -> Self {
        Self {
            ctx: Arc::new(TranscodeContext {
                store,
                encoder,
                scratch_root: settings.scratch_root,
                segment_seconds: settings.segment_seconds,
            }),
            jobs: JobTable::new(),
        }
    }

    /// Registers a job and runs it in the background.
    ///
    /// The returned ticket reports `pending`; the job itself is already
    /// `processing` in the table. Concurrent jobs for one episode are allowed
    /// and race on the same output keys.
    pub async fn start_job(&self, episode_id: &str, source_url: &str, qualities: Vec<String>) -> JobTicket {
        let qualities = if qualities.is_empty() { default_qualities() } else { qualities };
        let job_id = Uuid::new_v4().to_string();

        let active = self.jobs.active_for_episode(episode_id).await;
        if !active.is_empty() {
            warn!("Episode {} already has running transcoding jobs {:?}", episode_id, active);
        }

        self.jobs
            .register(TranscodingJob::processing(
                job_id.clone(),
                episode_id.to_string(),
                source_url.to_string(),
                qualities.clone(),
            ))
            .await;

        info!("Starting transcoding job {} for episode {}", job_id, episode_id);

        let spec = JobSpec {
            job_id: job_id.clone(),
            episode_id: episode_id.to_string(),
            source_url: source_url.to_string(),
            qualities: qualities.clone(),
        };
        self.spawn(spec);

        JobTicket {
            job_id,
            status: JobStatus::Pending,
            episode_id: episode_id.to_string(),
            input_url: source_url.to_string(),
            output_prefix: keys::hls_prefix(episode_id),
            qualities,
        }
    }

    fn spawn(&self, spec: JobSpec) {
        let ctx = self.ctx.clone();
        let jobs = self.jobs.clone();
        let job_id = spec.job_id.clone();

        let work = tokio::spawn(async move { transcoder::process_job(&ctx, &spec).await });

        // Watches the worker so a panic still lands the job in `failed`.
        tokio::spawn(async move {
            let outcome = match work.await {
                Ok(result) => result,
                Err(e) => Err(AppError::EncodeFailure(format!("transcoding task aborted: {}", e))),
            };

            match outcome {
                Ok(()) => {
                    jobs.complete(&job_id).await;
                    info!("✅ Transcoding job {} completed", job_id);
                }
                Err(e) => {
                    error!("❌ Transcoding job {} failed: {}", job_id, e);
                    jobs.fail(&job_id, e.to_string()).await;
                }
            }
        });
    }

    pub async fn get_job_status(&self, job_id: &str) -> Result<JobResult, AppError> {
        let job = self
            .jobs
            .get(job_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Job {}", job_id)))?;

        match job.status {
            JobStatus::Completed => {
                let manifests = self.generate_hls_manifests(&job.episode_id, &job.qualities).await?;
                Ok(JobResult {
                    job_id: job.job_id,
                    status: JobStatus::Completed,
                    hls_manifest_url: Some(manifests.master_manifest_url),
                    variants: Some(manifests.variants),
                    error: None,
                })
            }
            status => Ok(JobResult {
                job_id: job.job_id,
                status,
                hls_manifest_url: None,
                variants: None,
                error: job.error,
            }),
        }
    }

    /// Renders and uploads `master.m3u8` for the ladder entries in `qualities`.
    pub async fn generate_hls_manifests(&self, episode_id: &str, qualities: &[String]) -> Result<HlsManifestSet, AppError> {
        info!("Generating HLS manifests for episode {} ({})", episode_id, qualities.join(", "));

        let mut variants = Vec::new();
        let mut hls_variants = Vec::new();

        for quality in qualities {
            let Some(profile) = QualityProfile::find(quality) else {
                warn!("Skipping: {}", AppError::UnknownQuality(quality.clone()));
                continue;
            };

            let manifest_url = self
                .ctx
                .store
                .public_url(&keys::variant_manifest_key(episode_id, profile.quality));

            hls_variants.push(HlsVariant {
                manifest_url: manifest_url.clone(),
                resolution: profile.resolution(),
                bandwidth: profile.bandwidth,
                codecs: Some(profile.codecs.to_string()),
                frame_rate: None,
            });
            variants.push(VariantInfo {
                quality: profile.quality.to_string(),
                manifest_url,
                resolution: profile.resolution(),
                bandwidth: profile.bandwidth,
            });
        }

        let master = manifest::generate_master_manifest(&hls_variants, None);
        let master_manifest_url = self
            .ctx
            .store
            .upload(Bytes::from(master), &keys::master_manifest_key(episode_id), HLS_MANIFEST_CONTENT_TYPE)
            .await?;

        Ok(HlsManifestSet {
            master_manifest_url,
            variants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::memory::MemoryStore;
    use crate::modules::hls::model::{HlsSegment, VariantPlaylist};
    use crate::modules::transcoding::encoder::{EncodeOutput, EncodeRequest};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    const SOURCE_KEY: &str = "videos/episodes/ep1/1700000000000-source.mkv";

    /// Writes a small fake rendition; each field scripts one misbehaviour.
    #[derive(Default)]
    struct ScriptedEncoder {
        fail_on: Option<&'static str>,
        panic_on: Option<&'static str>,
        /// List the last segment in the playlist without writing its file.
        skip_last_segment: bool,
        /// Write segment URIs as full scratch paths, like some ffmpeg builds.
        absolute_urls: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Encoder for ScriptedEncoder {
        async fn encode(&self, req: EncodeRequest<'_>) -> Result<EncodeOutput, AppError> {
            self.calls.lock().unwrap().push(req.profile.quality.to_string());
            assert!(req.input.exists(), "source should be downloaded before encoding");

            if self.fail_on == Some(req.profile.quality) {
                return Err(AppError::EncodeFailure("scripted failure".to_string()));
            }
            if self.panic_on == Some(req.profile.quality) {
                panic!("encoder crashed on {}", req.profile.quality);
            }

            let names: Vec<String> = (0..2).map(|i| format!("segment_{:03}.ts", i)).collect();
            let segments: Vec<HlsSegment> = names
                .iter()
                .zip(0u64..)
                .map(|(name, i)| HlsSegment {
                    url: if self.absolute_urls {
                        req.output_dir.join(name).to_string_lossy().to_string()
                    } else {
                        name.clone()
                    },
                    duration: req.segment_seconds as f64,
                    sequence: i,
                })
                .collect();

            let manifest_path = req.output_dir.join(format!("{}.m3u8", req.profile.quality));
            let manifest = manifest::generate_variant_manifest(&segments, &VariantPlaylist::default());
            tokio::fs::write(&manifest_path, manifest).await?;

            let written = if self.skip_last_segment { names.len() - 1 } else { names.len() };
            let mut segment_paths = Vec::new();
            for name in &names[..written] {
                let path = req.output_dir.join(name);
                tokio::fs::write(&path, req.profile.quality.as_bytes()).await?;
                segment_paths.push(path);
            }

            Ok(EncodeOutput {
                manifest_path,
                segment_paths,
            })
        }
    }

    struct Harness {
        store: Arc<MemoryStore>,
        encoder: Arc<ScriptedEncoder>,
        scratch: tempfile::TempDir,
        service: TranscodingService,
    }

    fn harness(fail_on: Option<&'static str>) -> Harness {
        harness_with(ScriptedEncoder {
            fail_on,
            ..Default::default()
        })
    }

    fn harness_with(encoder: ScriptedEncoder) -> Harness {
        let store = Arc::new(MemoryStore::new());
        store.insert(SOURCE_KEY, vec![7u8; 64], "video/mkv");

        let encoder = Arc::new(encoder);
        let scratch = tempfile::tempdir().unwrap();
        let service = TranscodingService::new(
            store.clone(),
            encoder.clone(),
            TranscodeSettings {
                scratch_root: scratch.path().to_path_buf(),
                segment_seconds: SEGMENT_SECONDS,
            },
        );

        Harness {
            store,
            encoder,
            scratch,
            service,
        }
    }

    impl Harness {
        fn source_url(&self) -> String {
            self.store.public_url(SOURCE_KEY)
        }

        fn scratch_entries(&self) -> usize {
            std::fs::read_dir(self.scratch.path()).unwrap().count()
        }

        fn encoder_calls(&self) -> Vec<String> {
            self.encoder.calls.lock().unwrap().clone()
        }
    }

    async fn wait_for_terminal(service: &TranscodingService, job_id: &str) -> JobResult {
        for _ in 0..500 {
            let result = service.get_job_status(job_id).await.unwrap();
            if result.status.is_terminal() {
                return result;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} never reached a terminal state", job_id);
    }

    fn qualities(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|q| q.to_string()).collect()
    }

    #[tokio::test]
    async fn ticket_reports_pending_and_output_prefix() {
        let h = harness(None);
        let ticket = h.service.start_job("ep1", &h.source_url(), Vec::new()).await;

        assert_eq!(ticket.status, JobStatus::Pending);
        assert_eq!(ticket.output_prefix, "hls/episodes/ep1/");
        assert_eq!(ticket.qualities, default_qualities());

        let result = wait_for_terminal(&h.service, &ticket.job_id).await;
        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.variants.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn unknown_qualities_are_skipped() {
        let h = harness(None);
        let ticket = h.service.start_job("ep1", &h.source_url(), qualities(&["360p", "999p"])).await;

        let result = wait_for_terminal(&h.service, &ticket.job_id).await;
        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(h.encoder_calls(), vec!["360p"]);

        let variants = result.variants.unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].quality, "360p");
        assert_eq!(variants[0].resolution, "640x360");
        assert_eq!(
            variants[0].manifest_url,
            "http://storage.test/media/hls/episodes/ep1/360p/360p.m3u8"
        );

        assert_eq!(
            h.store.keys_with_prefix("hls/episodes/ep1/"),
            vec![
                "hls/episodes/ep1/360p/360p.m3u8",
                "hls/episodes/ep1/360p/segment_000.ts",
                "hls/episodes/ep1/360p/segment_001.ts",
                "hls/episodes/ep1/master.m3u8",
            ]
        );
        assert_eq!(
            h.store.content_type("hls/episodes/ep1/360p/segment_000.ts").as_deref(),
            Some("video/mp2t")
        );
        assert_eq!(h.scratch_entries(), 0);
    }

    #[tokio::test]
    async fn master_manifest_is_uploaded_on_completion() {
        let h = harness(None);
        let ticket = h
            .service
            .start_job("ep1", &h.source_url(), qualities(&["1080p", "360p"]))
            .await;

        let result = wait_for_terminal(&h.service, &ticket.job_id).await;
        assert_eq!(
            result.hls_manifest_url.as_deref(),
            Some("http://storage.test/media/hls/episodes/ep1/master.m3u8")
        );

        let master = h.store.get("hls/episodes/ep1/master.m3u8").unwrap();
        let parsed = manifest::parse_master_manifest(std::str::from_utf8(&master).unwrap());
        let summary: Vec<(u64, &str)> = parsed.iter().map(|v| (v.bandwidth, v.resolution.as_str())).collect();
        assert_eq!(summary, vec![(500_000, "360p"), (5_000_000, "1080p")]);
        assert_eq!(parsed[1].codecs.as_deref(), Some("avc1.640028,mp4a.40.2"));
    }

    #[tokio::test]
    async fn encoder_failure_fails_job_and_cleans_scratch() {
        let h = harness(Some("480p"));
        let ticket = h
            .service
            .start_job("ep1", &h.source_url(), qualities(&["360p", "480p", "720p"]))
            .await;

        let result = wait_for_terminal(&h.service, &ticket.job_id).await;
        assert_eq!(result.status, JobStatus::Failed);
        assert!(result.error.unwrap().contains("scripted failure"));
        assert!(result.hls_manifest_url.is_none());

        // Processing stops at the failing quality.
        assert_eq!(h.encoder_calls(), vec!["360p", "480p"]);
        assert_eq!(h.scratch_entries(), 0);
        assert!(h.store.get("hls/episodes/ep1/master.m3u8").is_none());
    }

    #[tokio::test]
    async fn upload_failure_fails_job() {
        let h = harness(None);
        h.store.fail_uploads_matching("segment_001");
        let ticket = h.service.start_job("ep1", &h.source_url(), qualities(&["360p", "720p"])).await;

        let result = wait_for_terminal(&h.service, &ticket.job_id).await;
        assert_eq!(result.status, JobStatus::Failed);
        assert!(result.error.unwrap().contains("Storage operation failed"));
        assert_eq!(h.encoder_calls(), vec!["360p"]);
        assert_eq!(h.scratch_entries(), 0);
    }

    #[tokio::test]
    async fn missing_source_fails_job() {
        let h = harness(None);
        let url = h.store.public_url("videos/episodes/ep1/missing.mp4");
        let ticket = h.service.start_job("ep1", &url, qualities(&["360p"])).await;

        let result = wait_for_terminal(&h.service, &ticket.job_id).await;
        assert_eq!(result.status, JobStatus::Failed);
        assert!(h.encoder_calls().is_empty());
        assert_eq!(h.scratch_entries(), 0);
    }

    #[tokio::test]
    async fn encoder_panic_fails_job_and_cleans_scratch() {
        let h = harness_with(ScriptedEncoder {
            panic_on: Some("720p"),
            ..Default::default()
        });
        let ticket = h
            .service
            .start_job("ep1", &h.source_url(), qualities(&["360p", "720p", "1080p"]))
            .await;

        let result = wait_for_terminal(&h.service, &ticket.job_id).await;
        assert_eq!(result.status, JobStatus::Failed);
        assert!(result.error.is_some());
        assert_eq!(h.encoder_calls(), vec!["360p", "720p"]);
        assert_eq!(h.scratch_entries(), 0);
    }

    #[tokio::test]
    async fn playlist_naming_a_missing_segment_fails_job() {
        let h = harness_with(ScriptedEncoder {
            skip_last_segment: true,
            ..Default::default()
        });
        let ticket = h.service.start_job("ep1", &h.source_url(), qualities(&["360p"])).await;

        let result = wait_for_terminal(&h.service, &ticket.job_id).await;
        assert_eq!(result.status, JobStatus::Failed);
        assert!(result.error.unwrap().contains("segment_001.ts"));
        assert!(h.store.keys_with_prefix("hls/episodes/ep1/").is_empty());
    }

    #[tokio::test]
    async fn uploaded_playlist_references_segments_by_file_name() {
        let h = harness_with(ScriptedEncoder {
            absolute_urls: true,
            ..Default::default()
        });
        let ticket = h.service.start_job("ep1", &h.source_url(), qualities(&["480p"])).await;

        let result = wait_for_terminal(&h.service, &ticket.job_id).await;
        assert_eq!(result.status, JobStatus::Completed);

        let playlist = h.store.get("hls/episodes/ep1/480p/480p.m3u8").unwrap();
        let segments = manifest::parse_variant_manifest(std::str::from_utf8(&playlist).unwrap());
        let urls: Vec<&str> = segments.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["segment_000.ts", "segment_001.ts"]);
        assert!(std::str::from_utf8(&playlist).unwrap().contains("#EXT-X-TARGETDURATION:10\n"));
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let h = harness(None);
        let err = h.service.get_job_status("nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
