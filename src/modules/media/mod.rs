use axum::Router;
use axum::routing::{get, post};
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/episodes/{episode_id}/video", post(handler::upload_video))
        .route("/episodes/{episode_id}/thumbnail", post(handler::upload_thumbnail))
        .route("/objects/presigned", get(handler::presigned_url))
}
