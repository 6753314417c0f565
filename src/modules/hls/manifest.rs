//! M3U8 generation and parsing.
//!
//! Everything here is pure text transformation. Parsers are lenient: lines
//! they cannot make sense of are skipped, so malformed input yields an empty
//! or partial result instead of an error.

use super::model::{HlsSegment, HlsVariant, PlaylistType, VariantPlaylist};
use std::collections::HashMap;
use tracing::debug;

const STREAM_INF: &str = "#EXT-X-STREAM-INF:";
const EXTINF: &str = "#EXTINF:";

pub fn generate_master_manifest(variants: &[HlsVariant], base_url: Option<&str>) -> String {
    let mut lines = vec![
        "#EXTM3U".to_string(),
        "#EXT-X-VERSION:3".to_string(),
        "#EXT-X-INDEPENDENT-SEGMENTS".to_string(),
    ];

    // Stable: equal bandwidths keep their input order.
    let mut sorted: Vec<&HlsVariant> = variants.iter().collect();
    sorted.sort_by_key(|v| v.bandwidth);

    for variant in sorted {
        // Both bandwidth and resolution must be known for a variant to be listed.
        let Some((width, height)) = resolution_dimensions(&variant.resolution) else {
            debug!("Leaving out variant {} with unknown resolution {:?}", variant.manifest_url, variant.resolution);
            continue;
        };
        if variant.bandwidth == 0 {
            debug!("Leaving out variant {} with unknown bandwidth", variant.manifest_url);
            continue;
        }

        let mut attrs = vec![
            format!("BANDWIDTH={}", variant.bandwidth),
            format!("RESOLUTION={}x{}", width, height),
        ];
        if let Some(codecs) = &variant.codecs {
            attrs.push(format!("CODECS=\"{}\"", codecs));
        }
        if let Some(frame_rate) = variant.frame_rate {
            attrs.push(format!("FRAME-RATE={}", frame_rate));
        }

        lines.push(format!("{}{}", STREAM_INF, attrs.join(",")));
        lines.push(match base_url {
            Some(base) => resolve_url(&variant.manifest_url, base),
            None => variant.manifest_url.clone(),
        });
    }

    lines.join("\n") + "\n"
}

pub fn generate_variant_manifest(segments: &[HlsSegment], playlist: &VariantPlaylist) -> String {
    let mut lines = vec![
        "#EXTM3U".to_string(),
        "#EXT-X-VERSION:3".to_string(),
        format!("#EXT-X-TARGETDURATION:{}", playlist.target_duration),
        format!("#EXT-X-MEDIA-SEQUENCE:{}", playlist.media_sequence),
    ];

    let is_vod = playlist.playlist_type == PlaylistType::Vod;
    if is_vod {
        lines.push("#EXT-X-PLAYLIST-TYPE:VOD".to_string());
    }

    for segment in segments {
        lines.push(format!("{}{:.3},", EXTINF, segment.duration));
        lines.push(segment.url.clone());
    }

    if is_vod {
        lines.push("#EXT-X-ENDLIST".to_string());
    }

    lines.join("\n") + "\n"
}

#[derive(Default)]
struct PendingVariant {
    bandwidth: Option<u64>,
    resolution: Option<String>,
    codecs: Option<String>,
    frame_rate: Option<f64>,
}

pub fn parse_master_manifest(text: &str) -> Vec<HlsVariant> {
    let mut variants = Vec::new();
    let mut current: Option<PendingVariant> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(attr_list) = line.strip_prefix(STREAM_INF) {
            let attrs = parse_attributes(attr_list);
            current = Some(PendingVariant {
                bandwidth: attrs.get("BANDWIDTH").and_then(|v| v.parse().ok()).filter(|b| *b > 0),
                resolution: attrs
                    .get("RESOLUTION")
                    .and_then(|v| v.split_once('x'))
                    .and_then(|(_, h)| h.parse::<u32>().ok())
                    .map(|h| format!("{}p", h)),
                codecs: attrs.get("CODECS").map(|v| v.replace('"', "")),
                frame_rate: attrs.get("FRAME-RATE").and_then(|v| v.parse().ok()),
            });
        } else if !line.starts_with('#') {
            let Some(pending) = current.take() else {
                continue;
            };
            if let (Some(bandwidth), Some(resolution)) = (pending.bandwidth, pending.resolution) {
                variants.push(HlsVariant {
                    manifest_url: line.to_string(),
                    resolution,
                    bandwidth,
                    codecs: pending.codecs,
                    frame_rate: pending.frame_rate,
                });
            }
        }
    }

    variants
}

pub fn parse_variant_manifest(text: &str) -> Vec<HlsSegment> {
    let mut segments = Vec::new();
    let mut pending_duration: Option<f64> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(rest) = line.strip_prefix(EXTINF) {
            pending_duration = leading_decimal(rest).filter(|d| *d > 0.0);
        } else if !line.starts_with('#') {
            if let Some(duration) = pending_duration.take() {
                segments.push(HlsSegment {
                    url: line.to_string(),
                    duration,
                    sequence: segments.len() as u64,
                });
            }
        }
    }

    segments
}

/// Joins a relative manifest URL onto `base_url`; absolute URLs pass through.
pub fn resolve_url(url: &str, base_url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!("{}/{}", base_url.trim_end_matches('/'), url.trim_start_matches('/'))
}

/// `"1280x720"` as-is, `"720p"` as 16:9 at that height.
fn resolution_dimensions(resolution: &str) -> Option<(u32, u32)> {
    if let Some((w, h)) = resolution.split_once('x') {
        let width = w.trim().parse::<u32>().ok()?;
        let height = h.trim().trim_end_matches('p').parse::<u32>().ok()?;
        return Some((width, height));
    }

    let height = resolution.trim().trim_end_matches('p').parse::<u32>().ok()?;
    if height == 0 {
        return None;
    }
    let width = (height as f64 * 16.0 / 9.0).round() as u32;
    Some((width, height))
}

/// Splits an attribute list on commas outside double quotes.
fn parse_attributes(attr_list: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let mut in_quotes = false;
    let mut start = 0;

    let mut push = |part: &str| {
        if let Some((key, value)) = part.split_once('=') {
            let (key, value) = (key.trim(), value.trim());
            if !key.is_empty() && !value.is_empty() {
                attrs.insert(key.to_string(), value.to_string());
            }
        }
    };

    for (i, c) in attr_list.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                push(&attr_list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push(&attr_list[start..]);

    attrs
}

fn leading_decimal(s: &str) -> Option<f64> {
    let end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
