use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod routes;
mod state;
mod workers;

use config::settings::AppConfig;
use infrastructure::storage::s3::{StorageOptions, StorageService};
use modules::transcoding::encoder::FfmpegEncoder;
use modules::transcoding::service::{TranscodeSettings, TranscodingService, SEGMENT_SECONDS};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting server...");

    let config = AppConfig::new()?;

    let storage = StorageService::new(StorageOptions {
        endpoint: config.s3_endpoint.as_deref(),
        public_url: config.s3_public_url.as_deref(),
        region: &config.aws_region,
        bucket: &config.s3_bucket,
        access_key: &config.aws_access_key,
        secret_key: &config.aws_secret_key,
    });
    info!("🪣 Object storage ready (bucket: {})", config.s3_bucket);

    match which::which(&config.ffmpeg_path) {
        Ok(path) => info!("🎬 Using encoder at {}", path.display()),
        Err(e) => warn!("Encoder {} not found ({}), transcoding jobs will fail", config.ffmpeg_path, e),
    }

    let storage = Arc::new(storage);
    let transcoder = TranscodingService::new(
        storage.clone(),
        Arc::new(FfmpegEncoder::new(config.ffmpeg_path.clone())),
        TranscodeSettings {
            scratch_root: config.scratch_dir.clone(),
            segment_seconds: SEGMENT_SECONDS,
        },
    );

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(config, storage, transcoder);
    let app = app::create_app(state).await;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
