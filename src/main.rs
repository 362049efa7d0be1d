//! cantoria - Karaoke Scoring Backend
//!
//! Single endpoint service: `POST /analisar` takes an audio upload plus a
//! song title/artist and returns a word-level score report. Providers
//! (ffmpeg, whisper CLI, embedding endpoint, lrclib) are constructed once
//! at startup and shared read-only across requests.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cantoria::config::{Cli, Config};
use cantoria::providers::{
    FfmpegConverter, HttpEmbeddingClient, LrclibClient, WhisperCliTranscriber,
};
use cantoria::services::AnalysisPipeline;
use cantoria::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting cantoria (karaoke scoring backend)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::resolve(&cli)?;

    // The scratch folder must exist before the first upload lands.
    std::fs::create_dir_all(&config.audio_dir)?;
    info!("Audio scratch dir: {}", config.audio_dir.display());
    info!("Lyric cache: {}", config.lyric_cache.display());

    let converter = Arc::new(FfmpegConverter::new(
        config.ffmpeg_binary.clone(),
        Duration::from_secs(config.conversion_timeout_secs),
    ));
    let transcriber = Arc::new(WhisperCliTranscriber::new(
        config.whisper.binary.clone(),
        config.whisper.model.clone(),
        config.whisper.language.clone(),
        Duration::from_secs(config.whisper.timeout_secs),
    ));
    let similarity = Arc::new(HttpEmbeddingClient::new(
        config.embedding.base_url.clone(),
        config.embedding.model.clone(),
        Duration::from_secs(config.embedding.timeout_secs),
    )?);
    let lyric_provider = Arc::new(LrclibClient::new()?);
    info!("Providers initialized");

    let pipeline = AnalysisPipeline::new(
        converter,
        transcriber,
        similarity,
        lyric_provider,
        config.lyric_cache.clone(),
        config.audio_dir.clone(),
    );
    let state = AppState::new(pipeline);
    let app = cantoria::build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
