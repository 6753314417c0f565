//! In-memory job table.
//!
//! Created empty at startup; entries never expire and are lost on restart.
//! Callers that need durable history mirror status transitions elsewhere.

use super::model::{JobStatus, TranscodingJob};
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Clone, Default)]
pub struct JobTable {
    jobs: Arc<RwLock<HashMap<String, TranscodingJob>>>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, job: TranscodingJob) {
        self.jobs.write().await.insert(job.job_id.clone(), job);
    }

    pub async fn get(&self, job_id: &str) -> Option<TranscodingJob> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Ids of non-terminal jobs for `episode_id`.
    pub async fn active_for_episode(&self, episode_id: &str) -> Vec<String> {
        self.jobs
            .read()
            .await
            .values()
            .filter(|j| j.episode_id == episode_id && !j.status.is_terminal())
            .map(|j| j.job_id.clone())
            .collect()
    }

    pub async fn complete(&self, job_id: &str) -> bool {
        self.finish(job_id, JobStatus::Completed, None).await
    }

    pub async fn fail(&self, job_id: &str, error: String) -> bool {
        self.finish(job_id, JobStatus::Failed, Some(error)).await
    }

    /// Moves a job into a terminal state. Terminal states are final, so a
    /// second transition is refused.
    async fn finish(&self, job_id: &str, status: JobStatus, error: Option<String>) -> bool {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(job_id) else {
            warn!("Ignoring {:?} for unknown job {}", status, job_id);
            return false;
        };

        if job.status.is_terminal() {
            warn!("Job {} already {:?}, refusing {:?}", job_id, job.status, status);
            return false;
        }

        job.status = status;
        job.error = error;
        job.updated_at = OffsetDateTime::now_utc();
        debug!(
            "Job {} for episode {} ({}) is {:?} after {}s",
            job_id,
            job.episode_id,
            job.source_url,
            job.status,
            (job.updated_at - job.created_at).whole_seconds()
        );
        true
    }
}
