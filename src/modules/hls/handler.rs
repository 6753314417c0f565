use super::dto::MasterManifestRequest;
use super::service::HlsService;
use crate::common::error::AppError;
use crate::infrastructure::storage::{keys, HLS_MANIFEST_CONTENT_TYPE};
use crate::modules::streaming::handler::{range_header, range_response};
use crate::modules::streaming::service::StreamingService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};

fn manifest_response(text: String) -> Response {
    ([(header::CONTENT_TYPE, HLS_MANIFEST_CONTENT_TYPE)], text).into_response()
}

/// Master manifest for an episode
/// Served verbatim when a stored render exists, regenerated from variants otherwise
#[utoipa::path(
    post,
    path = "/api/v1/hls/master",
    request_body = MasterManifestRequest,
    responses(
        (status = 200, description = "Master manifest", content_type = "application/vnd.apple.mpegurl", body = String),
        (status = 404, description = "No HLS data for this episode")
    ),
    tag = "HLS"
)]
pub async fn master_manifest(
    State(state): State<AppState>,
    Json(req): Json<MasterManifestRequest>,
) -> Result<Response, AppError> {
    let text = HlsService::master_manifest(state.storage.as_ref(), &req).await?;
    Ok(manifest_response(text))
}

#[utoipa::path(
    get,
    path = "/api/v1/hls/episodes/{episode_id}/{file}",
    params(
        ("episode_id" = String, Path, description = "Episode ID"),
        ("file" = String, Path, description = "Manifest file, e.g. master.m3u8")
    ),
    responses(
        (status = 200, description = "Manifest", content_type = "application/vnd.apple.mpegurl", body = String),
        (status = 404, description = "Not Found")
    ),
    tag = "HLS"
)]
pub async fn episode_file(
    State(state): State<AppState>,
    Path((episode_id, file)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let text = HlsService::episode_manifest(state.storage.as_ref(), &episode_id, &file).await?;
    Ok(manifest_response(text))
}

/// Variant manifest or media segment
/// `.m3u8` files are returned as text, anything else is streamed with Range support
#[utoipa::path(
    get,
    path = "/api/v1/hls/episodes/{episode_id}/{quality}/{file}",
    params(
        ("episode_id" = String, Path, description = "Episode ID"),
        ("quality" = String, Path, description = "Quality label, e.g. 720p"),
        ("file" = String, Path, description = "720p.m3u8 or segment_000.ts")
    ),
    responses(
        (status = 200, description = "Manifest or segment"),
        (status = 206, description = "Partial segment"),
        (status = 404, description = "Not Found"),
        (status = 416, description = "Range Not Satisfiable")
    ),
    tag = "HLS"
)]
pub async fn variant_file(
    State(state): State<AppState>,
    Path((episode_id, quality, file)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if file.ends_with(".m3u8") {
        let text = HlsService::variant_manifest(state.storage.as_ref(), &episode_id, &quality, &file).await?;
        return Ok(manifest_response(text));
    }

    let key = keys::variant_file_key(&episode_id, &quality, &file);
    let range = range_header(&headers);
    let stream = StreamingService::stream_range(state.storage.as_ref(), &key, range.as_deref()).await?;
    Ok(range_response(stream))
}
