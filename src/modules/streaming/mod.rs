use axum::Router;
use axum::routing::get;
use crate::state::AppState;

pub mod handler;
pub mod range;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new().route("/stream/{*key}", get(handler::stream_object))
}
