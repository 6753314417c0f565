//! Object key scheme and URL/key conversion.

use std::path::Path;
use time::OffsetDateTime;
use url::Url;

const HLS_PREFIX: &str = "hls/episodes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Thumbnail,
}

impl AssetKind {
    fn prefix(&self) -> &'static str {
        match self {
            AssetKind::Video => "videos/episodes",
            AssetKind::Thumbnail => "thumbnails/episodes",
        }
    }

    /// `video/{ext}` for videos; thumbnails normalise jpg/jpeg to `image/jpeg`.
    pub fn content_type(&self, sanitized_filename: &str) -> String {
        let extension = Path::new(sanitized_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match self {
            AssetKind::Video => format!("video/{}", extension.as_deref().unwrap_or("mp4")),
            AssetKind::Thumbnail => match extension.as_deref() {
                None | Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG.to_string(),
                Some(ext) => format!("image/{}", ext),
            },
        }
    }
}

pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

pub fn asset_key(kind: AssetKind, episode_id: &str, sanitized_filename: &str, at: OffsetDateTime) -> String {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    format!("{}/{}/{}-{}", kind.prefix(), episode_id, millis, sanitized_filename)
}

pub fn hls_prefix(episode_id: &str) -> String {
    format!("{}/{}/", HLS_PREFIX, episode_id)
}

pub fn hls_file_key(episode_id: &str, file: &str) -> String {
    format!("{}/{}/{}", HLS_PREFIX, episode_id, file)
}

pub fn master_manifest_key(episode_id: &str) -> String {
    hls_file_key(episode_id, "master.m3u8")
}

pub fn variant_manifest_key(episode_id: &str, quality: &str) -> String {
    format!("{}/{}/{}/{}.m3u8", HLS_PREFIX, episode_id, quality, quality)
}

pub fn variant_file_key(episode_id: &str, quality: &str, file: &str) -> String {
    format!("{}/{}/{}/{}", HLS_PREFIX, episode_id, quality, file)
}

/// Extracts the object key from a stored URL.
///
/// URLs under `public_base` (what the store hands out on upload) map back to
/// the key after the base. Any other URL falls back to its path, minus a
/// leading `{bucket}/` segment when the store uses path-style addressing
/// (MinIO).
pub fn key_from_url(url: &str, public_base: &str, path_style_bucket: Option<&str>) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    let base = public_base.trim_end_matches('/');
    if !base.is_empty() {
        if let Some(rest) = url.strip_prefix(base).and_then(|r| r.strip_prefix('/')) {
            let key = rest.split(['?', '#']).next().unwrap_or_default();
            return non_empty(key);
        }
    }

    let path = parsed.path().trim_start_matches('/');
    let key = match path_style_bucket.filter(|b| !b.is_empty()) {
        Some(bucket) => path
            .strip_prefix(bucket)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path),
        None => path,
    };

    non_empty(key)
}

fn non_empty(key: &str) -> Option<String> {
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}
