//! External capability providers consumed by the scoring pipeline.
//!
//! Each external collaborator sits behind a single-method trait so the
//! pipeline can be exercised with stubs in tests: audio conversion,
//! speech-to-text, text embedding, and lyric retrieval.

pub mod embedding;
pub mod ffmpeg;
pub mod lrclib;
pub mod whisper_cli;

pub use embedding::{cosine_similarity, HttpEmbeddingClient};
pub use ffmpeg::FfmpegConverter;
pub use lrclib::LrclibClient;
pub use whisper_cli::WhisperCliTranscriber;

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// External binary not found on this host
    #[error("Binary not found: {0}")]
    BinaryNotFound(String),

    /// External tool ran but failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Network error talking to an HTTP provider
    #[error("Network error: {0}")]
    Network(String),

    /// Unexpected HTTP status from a provider
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Provider output could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider call exceeded its allotted time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts an uploaded recording into the wav format the speech model
/// expects (mono, 16 kHz, 16-bit PCM).
#[async_trait::async_trait]
pub trait AudioConverter: Send + Sync {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ProviderError>;
}

/// Speech-to-text over one wav file.
#[async_trait::async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe the recording into a flat text string.
    async fn transcribe(&self, wav_path: &Path) -> Result<String, ProviderError>;
}

/// Text embedding for semantic word similarity.
#[async_trait::async_trait]
pub trait SimilarityProvider: Send + Sync {
    /// Embed a word or phrase into a fixed-size vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Online lyric retrieval from a music catalog.
#[async_trait::async_trait]
pub trait LyricProvider: Send + Sync {
    /// Full lyric text for (title, artist), or `None` when the catalog
    /// has no match.
    async fn search_lyrics(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<String>, ProviderError>;
}
