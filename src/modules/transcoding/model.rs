use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One rung of the fixed quality ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityProfile {
    pub quality: &'static str,
    pub width: u32,
    pub height: u32,
    pub bandwidth: u64,
    pub codecs: &'static str,
}

pub const QUALITY_LADDER: [QualityProfile; 4] = [
    QualityProfile { quality: "360p", width: 640, height: 360, bandwidth: 500_000, codecs: "avc1.42e01e,mp4a.40.2" },
    QualityProfile { quality: "480p", width: 854, height: 480, bandwidth: 1_000_000, codecs: "avc1.42e01e,mp4a.40.2" },
    QualityProfile { quality: "720p", width: 1280, height: 720, bandwidth: 2_500_000, codecs: "avc1.4d001f,mp4a.40.2" },
    QualityProfile { quality: "1080p", width: 1920, height: 1080, bandwidth: 5_000_000, codecs: "avc1.640028,mp4a.40.2" },
];

impl QualityProfile {
    pub fn find(quality: &str) -> Option<&'static QualityProfile> {
        QUALITY_LADDER.iter().find(|p| p.quality == quality)
    }

    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

pub fn default_qualities() -> Vec<String> {
    QUALITY_LADDER.iter().map(|p| p.quality.to_string()).collect()
}

/// Job record held in the in-memory job table.
#[derive(Debug, Clone)]
pub struct TranscodingJob {
    pub job_id: String,
    pub episode_id: String,
    pub source_url: String,
    pub status: JobStatus,
    pub qualities: Vec<String>,
    pub error: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TranscodingJob {
    pub fn processing(job_id: String, episode_id: String, source_url: String, qualities: Vec<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            job_id,
            episode_id,
            source_url,
            status: JobStatus::Processing,
            qualities,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
