use axum::Router;
use axum::routing::{get, post};
use crate::state::AppState;

pub mod dto;
pub mod encoder;
pub mod handler;
pub mod jobs;
pub mod model;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transcode", post(handler::start_transcode))
        .route("/transcode/{job_id}", get(handler::get_job_status))
}
