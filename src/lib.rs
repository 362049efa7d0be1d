//! cantoria - Karaoke Scoring Backend
//!
//! Scores a user's sung performance of a song against its reference
//! lyrics: the uploaded recording is converted to wav, transcribed, and
//! each reference word is matched to its semantically closest sung word.
//! The response carries a per-word report plus an aggregate 0–99 grade.
//!
//! External capabilities (audio conversion, speech-to-text, embeddings,
//! lyric retrieval) sit behind the traits in [`providers`]; the scoring
//! core lives in [`services`].

pub mod api;
pub mod config;
pub mod error;
pub mod providers;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::AnalysisPipeline;

/// Uploaded recordings can be several minutes of audio; the axum default
/// body limit (2 MB) is far too small.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The per-request analysis pipeline with its injected providers
    pub pipeline: Arc<AnalysisPipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: AnalysisPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        // The mobile client is served from a different origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
