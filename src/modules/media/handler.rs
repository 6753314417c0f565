use super::dto::{PresignedUrlQuery, PresignedUrlResponse, ThumbnailUploadResponse, VideoUploadResponse};
use super::service::{MediaService, StoredAsset};
use crate::common::error::AppError;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::infrastructure::storage::keys::AssetKind;
use crate::modules::transcoding::model::default_qualities;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
};
use tracing::info;

/// Fields accepted by the episode upload endpoints.
struct AssetForm {
    filename: String,
    body: Bytes,
    previous_url: Option<String>,
}

async fn read_asset_form(mut multipart: Multipart, default_name: &str) -> Result<AssetForm, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut previous_url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or(default_name).to_string();
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file field: {}", e)))?;
                file = Some((filename, body));
            }
            "previousUrl" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read previousUrl: {}", e)))?;
                previous_url = Some(text);
            }
            _ => {}
        }
    }

    let (filename, body) = file.ok_or_else(|| AppError::BadRequest("No file field found in multipart request".to_string()))?;
    Ok(AssetForm {
        filename,
        body,
        previous_url,
    })
}

async fn store_asset(state: &AppState, kind: AssetKind, episode_id: &str, form: AssetForm) -> Result<StoredAsset, AppError> {
    MediaService::replace_asset(
        state.storage.as_ref(),
        kind,
        episode_id,
        &form.filename,
        form.body,
        form.previous_url.as_deref(),
    )
    .await
}

/// Upload Episode Video
/// Replaces the previous video (if given) and starts a full-ladder transcode
#[utoipa::path(
    post,
    path = "/api/v1/episodes/{episode_id}/video",
    params(
        ("episode_id" = String, Path, description = "Episode ID")
    ),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Upload successful", body = ApiResponse<VideoUploadResponse>),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Media"
)]
pub async fn upload_video(
    State(state): State<AppState>,
    Path(episode_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_asset_form(multipart, "video.mp4").await?;
    let asset = store_asset(&state, AssetKind::Video, &episode_id, form).await?;

    let ticket = state
        .transcoder
        .start_job(&episode_id, &asset.url, default_qualities())
        .await;
    info!("Video for episode {} stored at {}, job {}", episode_id, asset.key, ticket.job_id);

    Ok(ApiSuccess::created(
        VideoUploadResponse {
            video_url: asset.url,
            transcoding_job_id: ticket.job_id,
        },
        "Video uploaded successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/episodes/{episode_id}/thumbnail",
    params(
        ("episode_id" = String, Path, description = "Episode ID")
    ),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Upload successful", body = ApiResponse<ThumbnailUploadResponse>),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Media"
)]
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Path(episode_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_asset_form(multipart, "thumbnail.jpg").await?;
    let asset = store_asset(&state, AssetKind::Thumbnail, &episode_id, form).await?;

    Ok(ApiSuccess::created(
        ThumbnailUploadResponse {
            thumbnail_url: asset.url,
        },
        "Thumbnail uploaded successfully",
    ))
}

/// Presigned GET URL for an object
#[utoipa::path(
    get,
    path = "/api/v1/objects/presigned",
    params(PresignedUrlQuery),
    responses(
        (status = 200, description = "Presigned URL", body = ApiResponse<PresignedUrlResponse>),
        (status = 400, description = "Bad Request")
    ),
    tag = "Media"
)]
pub async fn presigned_url(
    State(state): State<AppState>,
    Query(query): Query<PresignedUrlQuery>,
) -> Result<impl IntoResponse, AppError> {
    let expires_in = query.expires_in.unwrap_or(state.config.presigned_url_ttl);
    let url = MediaService::presigned_url(state.storage.as_ref(), &query.key, expires_in).await?;

    Ok(ApiSuccess::ok(PresignedUrlResponse { url, expires_in }, "Presigned URL generated"))
}
