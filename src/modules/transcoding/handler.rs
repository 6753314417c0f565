use super::dto::{JobResult, JobTicket, StartTranscodeRequest};
use crate::common::error::AppError;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

/// Start a transcoding job
/// Returns immediately; poll the job status endpoint for progress
#[utoipa::path(
    post,
    path = "/api/v1/transcode",
    request_body = StartTranscodeRequest,
    responses(
        (status = 202, description = "Job accepted", body = ApiResponse<JobTicket>),
        (status = 400, description = "Bad Request")
    ),
    tag = "Transcoding"
)]
pub async fn start_transcode(
    State(state): State<AppState>,
    Json(payload): Json<StartTranscodeRequest>,
) -> impl IntoResponse {
    let ticket = state
        .transcoder
        .start_job(&payload.episode_id, &payload.source_url, payload.qualities.unwrap_or_default())
        .await;

    ApiSuccess::accepted(ticket, "Transcoding job started")
}

#[utoipa::path(
    get,
    path = "/api/v1/transcode/{job_id}",
    params(
        ("job_id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job status", body = ApiResponse<JobResult>),
        (status = 404, description = "Job not found")
    ),
    tag = "Transcoding"
)]
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = state.transcoder.get_job_status(&job_id).await?;
    Ok(ApiSuccess::ok(result, "Job status retrieved"))
}
