use axum::Router;
use axum::routing::{get, post};
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod manifest;
pub mod model;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hls/master", post(handler::master_manifest))
        .route("/hls/episodes/{episode_id}/{file}", get(handler::episode_file))
        .route("/hls/episodes/{episode_id}/{quality}/{file}", get(handler::variant_file))
}
