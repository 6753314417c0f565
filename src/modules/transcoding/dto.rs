use super::model::JobStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartTranscodeRequest {
    pub episode_id: String,
    pub source_url: String,
    /// Defaults to the whole ladder.
    #[serde(default)]
    pub qualities: Option<Vec<String>>,
}

/// Immediate acknowledgement of a started job.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobTicket {
    pub job_id: String,
    pub status: JobStatus,
    pub episode_id: String,
    pub input_url: String,
    pub output_prefix: String,
    pub qualities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantInfo {
    pub quality: String,
    pub manifest_url: String,
    pub resolution: String,
    pub bandwidth: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hls_manifest_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<VariantInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HlsManifestSet {
    pub master_manifest_url: String,
    pub variants: Vec<VariantInfo>,
}
