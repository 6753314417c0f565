use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One quality rendition as listed in a master manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HlsVariant {
    pub manifest_url: String,
    /// `WIDTHxHEIGHT` or the `"720p"` shorthand.
    pub resolution: String,
    pub bandwidth: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codecs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HlsSegment {
    pub url: String,
    pub duration: f64,
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlaylistType {
    #[default]
    Vod,
    Event,
}

/// Header parameters of a variant (media) playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPlaylist {
    pub target_duration: u32,
    pub media_sequence: u64,
    pub playlist_type: PlaylistType,
}

impl Default for VariantPlaylist {
    fn default() -> Self {
        Self {
            target_duration: 10,
            media_sequence: 0,
            playlist_type: PlaylistType::Vod,
        }
    }
}
