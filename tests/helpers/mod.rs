//! Shared stubs and helpers for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use cantoria::providers::{
    AudioConverter, LyricProvider, ProviderError, SimilarityProvider, TranscriptionProvider,
};
use cantoria::services::AnalysisPipeline;
use cantoria::AppState;

/// Converter stub: "converts" by copying the input file to the output path.
pub struct StubConverter;

#[async_trait::async_trait]
impl AudioConverter for StubConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ProviderError> {
        std::fs::copy(input, output)?;
        Ok(())
    }
}

/// Converter stub that always fails.
pub struct FailingConverter;

#[async_trait::async_trait]
impl AudioConverter for FailingConverter {
    async fn convert(&self, _input: &Path, _output: &Path) -> Result<(), ProviderError> {
        Err(ProviderError::ExecutionFailed("stub conversion failure".to_string()))
    }
}

/// Converter stub reporting an elapsed subprocess timeout.
pub struct TimedOutConverter;

#[async_trait::async_trait]
impl AudioConverter for TimedOutConverter {
    async fn convert(&self, _input: &Path, _output: &Path) -> Result<(), ProviderError> {
        Err(ProviderError::Timeout(std::time::Duration::from_millis(10)))
    }
}

/// Converter stub that records the input path it was handed, then copies.
pub struct RecordingConverter {
    pub seen_input: Mutex<Option<PathBuf>>,
}

impl RecordingConverter {
    pub fn new() -> Self {
        Self {
            seen_input: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl AudioConverter for RecordingConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ProviderError> {
        *self.seen_input.lock().unwrap() = Some(input.to_path_buf());
        std::fs::copy(input, output)?;
        Ok(())
    }
}

/// Transcriber stub returning a fixed transcript.
pub struct StubTranscriber(pub String);

#[async_trait::async_trait]
impl TranscriptionProvider for StubTranscriber {
    async fn transcribe(&self, _wav_path: &Path) -> Result<String, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Transcriber stub reporting an elapsed subprocess timeout.
pub struct TimedOutTranscriber;

#[async_trait::async_trait]
impl TranscriptionProvider for TimedOutTranscriber {
    async fn transcribe(&self, _wav_path: &Path) -> Result<String, ProviderError> {
        Err(ProviderError::Timeout(std::time::Duration::from_millis(10)))
    }
}

/// Embedder stub backed by a fixed word → vector table. Unknown words are
/// an error, like a real backend rejecting bad input.
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn new(entries: Vec<(&str, Vec<f32>)>) -> Self {
        Self {
            table: entries
                .into_iter()
                .map(|(word, vector)| (word.to_string(), vector))
                .collect(),
        }
    }

    /// Vocabulary for the hello/world scenario: sim(hello, hello) = 1.0,
    /// sim(world, word) = 0.7.
    pub fn karaoke() -> Self {
        Self::new(vec![
            ("Hello", vec![1.0, 0.0]),
            ("hello", vec![1.0, 0.0]),
            ("world", vec![0.0, 1.0]),
            ("word", vec![0.714_142_9, 0.7]),
        ])
    }
}

#[async_trait::async_trait]
impl SimilarityProvider for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.table
            .get(text)
            .cloned()
            .ok_or_else(|| ProviderError::Parse(format!("no stub embedding for '{text}'")))
    }
}

/// Lyric provider stub with a call counter.
pub struct StubLyricProvider {
    lyrics: Option<String>,
    pub calls: AtomicUsize,
}

impl StubLyricProvider {
    pub fn new(lyrics: Option<&str>) -> Self {
        Self {
            lyrics: lyrics.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LyricProvider for StubLyricProvider {
    async fn search_lyrics(
        &self,
        _title: &str,
        _artist: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lyrics.clone())
    }
}

/// Per-test scratch environment. Holds the temp dir alive for the test's
/// duration.
pub struct TestEnv {
    pub dir: TempDir,
    pub audio_dir: PathBuf,
    pub cache_path: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let audio_dir = dir.path().join("audios");
        let cache_path = dir.path().join("musicas.csv");
        Self {
            dir,
            audio_dir,
            cache_path,
        }
    }

    /// Files currently present in the audio scratch dir.
    pub fn scratch_files(&self) -> Vec<PathBuf> {
        if !self.audio_dir.exists() {
            return Vec::new();
        }
        std::fs::read_dir(&self.audio_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

/// Pipeline wired with the default stub set: copying converter, fixed
/// transcript, hello/world embedder, counting lyric provider.
pub fn stub_pipeline(
    env: &TestEnv,
    lyrics: Option<&str>,
    transcript: &str,
) -> (AnalysisPipeline, Arc<StubLyricProvider>) {
    let lyric_provider = Arc::new(StubLyricProvider::new(lyrics));
    let pipeline = AnalysisPipeline::new(
        Arc::new(StubConverter),
        Arc::new(StubTranscriber(transcript.to_string())),
        Arc::new(TableEmbedder::karaoke()),
        lyric_provider.clone(),
        env.cache_path.clone(),
        env.audio_dir.clone(),
    );
    (pipeline, lyric_provider)
}

/// App state over a stub pipeline, for router-level tests.
pub fn stub_app_state(
    env: &TestEnv,
    lyrics: Option<&str>,
    transcript: &str,
) -> (AppState, Arc<StubLyricProvider>) {
    let (pipeline, lyric_provider) = stub_pipeline(env, lyrics, transcript);
    (AppState::new(pipeline), lyric_provider)
}

pub const BOUNDARY: &str = "cantoria-test-boundary";

/// Hand-built multipart/form-data body.
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Returns (content-type header value, body bytes).
    pub fn build(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            self.body,
        )
    }
}
