//! Analysis pipeline orchestrator
//!
//! Runs one submission end to end: validate input, persist the upload to
//! scratch, convert it, resolve the reference lyrics, transcribe, align,
//! score, assemble the response. Each request owns uuid-named scratch
//! files which are removed on every exit path, success or error.

use crate::error::{ApiError, ApiResult};
use crate::providers::{AudioConverter, LyricProvider, SimilarityProvider, TranscriptionProvider};
use crate::services::alignment::AlignmentEngine;
use crate::services::lyric_store::LyricStore;
use crate::services::scoring;
use crate::types::AnalysisResponse;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Stages a request moves through, in order. Terminal error states are
/// represented by the returned `ApiError`, tagged with the stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Received,
    AudioSaved,
    AudioConverted,
    LyricsResolved,
    Transcribed,
    Aligned,
    Scored,
    Responded,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisStage::Received => "RECEIVED",
            AnalysisStage::AudioSaved => "AUDIO_SAVED",
            AnalysisStage::AudioConverted => "AUDIO_CONVERTED",
            AnalysisStage::LyricsResolved => "LYRICS_RESOLVED",
            AnalysisStage::Transcribed => "TRANSCRIBED",
            AnalysisStage::Aligned => "ALIGNED",
            AnalysisStage::Scored => "SCORED",
            AnalysisStage::Responded => "RESPONDED",
        };
        write!(f, "{}", name)
    }
}

/// One submission to analyze.
#[derive(Debug)]
pub struct AnalysisRequest {
    pub title: String,
    pub artist: String,
    /// Raw uploaded audio bytes; `None` when the field was absent.
    pub audio: Option<Vec<u8>>,
    /// Client-side file name, used only for its extension.
    pub file_name: Option<String>,
}

/// Per-request scratch files: the uploaded original and the converted wav.
/// Dropping the guard removes whichever of the two exist.
struct AudioScratch {
    original: PathBuf,
    wav: PathBuf,
}

impl AudioScratch {
    fn create(dir: &Path, file_name: Option<&str>, audio: &[u8]) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;

        let token = Uuid::new_v4().simple().to_string();
        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(char::is_alphanumeric))
            .unwrap_or("m4a");

        let original = dir.join(format!("upload_{}.{}", token, extension));
        let wav = dir.join(format!("upload_{}.wav", token));
        std::fs::write(&original, audio)?;

        Ok(Self { original, wav })
    }

    fn original(&self) -> &Path {
        &self.original
    }

    fn wav(&self) -> &Path {
        &self.wav
    }
}

impl Drop for AudioScratch {
    fn drop(&mut self) {
        for path in [&self.original, &self.wav] {
            if path.exists() {
                if let Err(err) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %err, "Failed to remove scratch file");
                }
            }
        }
    }
}

pub struct AnalysisPipeline {
    converter: Arc<dyn AudioConverter>,
    transcriber: Arc<dyn TranscriptionProvider>,
    alignment: AlignmentEngine,
    lyrics: LyricStore,
    audio_dir: PathBuf,
}

impl AnalysisPipeline {
    pub fn new(
        converter: Arc<dyn AudioConverter>,
        transcriber: Arc<dyn TranscriptionProvider>,
        similarity: Arc<dyn SimilarityProvider>,
        lyric_provider: Arc<dyn LyricProvider>,
        lyric_cache: impl Into<PathBuf>,
        audio_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            converter,
            transcriber,
            alignment: AlignmentEngine::new(similarity),
            lyrics: LyricStore::new(lyric_cache, lyric_provider),
            audio_dir: audio_dir.into(),
        }
    }

    /// Run one submission through the whole pipeline.
    pub async fn analyze(&self, request: AnalysisRequest) -> ApiResult<AnalysisResponse> {
        let mut stage = AnalysisStage::Received;
        let title = request.title.trim().to_string();
        let artist = request.artist.trim().to_string();

        // Validation happens before any scratch file exists: a rejected
        // request leaves zero side effects behind.
        let audio = match request.audio.filter(|bytes| !bytes.is_empty()) {
            Some(bytes) => bytes,
            None => {
                return Err(ApiError::MissingInput(
                    "Nenhum arquivo de áudio enviado".to_string(),
                ))
            }
        };
        if title.is_empty() || artist.is_empty() {
            return Err(ApiError::MissingInput(
                "Campos 'titulo' e 'artista' são obrigatórios".to_string(),
            ));
        }

        info!(stage = %stage, title = %title, artist = %artist, "Analysis requested");

        let scratch = AudioScratch::create(&self.audio_dir, request.file_name.as_deref(), &audio)?;
        stage = AnalysisStage::AudioSaved;
        debug!(stage = %stage, path = %scratch.original().display(), "Upload saved");

        if let Err(err) = self.converter.convert(scratch.original(), scratch.wav()).await {
            error!(stage = %stage, title = %title, error = %err, "Audio conversion failed");
            return Err(ApiError::ConversionFailure(err.to_string()));
        }
        stage = AnalysisStage::AudioConverted;
        debug!(stage = %stage, "Audio converted to wav");

        let reference_words = self
            .lyrics
            .resolve(&title, &artist)
            .await
            .map_err(|err| self.internal(stage, &title, err))?
            .ok_or_else(|| ApiError::LyricsNotFound(title.clone()))?;
        stage = AnalysisStage::LyricsResolved;
        debug!(stage = %stage, words = reference_words.len(), "Lyrics resolved");

        let transcript = self
            .transcriber
            .transcribe(scratch.wav())
            .await
            .map_err(|err| self.internal(stage, &title, err.into()))?;
        stage = AnalysisStage::Transcribed;
        debug!(stage = %stage, "Audio transcribed");

        let sung_words: Vec<String> = transcript
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let pairs = self
            .alignment
            .align(&reference_words, &sung_words)
            .await
            .map_err(|err| self.internal(stage, &title, err))?;
        stage = AnalysisStage::Aligned;
        debug!(stage = %stage, pairs = pairs.len(), "Words aligned");

        let report = scoring::score(&pairs, &reference_words, &sung_words);
        stage = AnalysisStage::Scored;
        debug!(stage = %stage, grade = report.grade, "Scoring complete");

        let response = AnalysisResponse {
            success: true,
            title: title.clone(),
            artist,
            grade: report.grade,
            mean_similarity: report.mean_similarity,
            coverage: report.coverage,
            missing_words: report.missing_words,
            details: report.details,
        };

        stage = AnalysisStage::Responded;
        info!(stage = %stage, title = %title, grade = response.grade, "Analysis complete");
        Ok(response)
    }

    fn internal(&self, stage: AnalysisStage, title: &str, err: anyhow::Error) -> ApiError {
        error!(stage = %stage, title = %title, error = %err, "Pipeline step failed");
        ApiError::Internal(err.to_string())
    }
}
