use serde::Deserialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Per-quality variant as stored on an episode record.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredVariant {
    pub manifest_url: String,
    pub resolution: String,
    pub bandwidth: u64,
    pub codecs: Option<String>,
    pub frame_rate: Option<f64>,
}

/// HLS fields of an episode record, supplied by the episode service.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MasterManifestRequest {
    pub hls_manifest_url: Option<String>,
    #[serde(default)]
    pub hls_variants: Option<BTreeMap<String, StoredVariant>>,
}
