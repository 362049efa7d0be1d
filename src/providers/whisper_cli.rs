//! whisper.cpp CLI transcription provider
//!
//! Runs the whisper.cpp command-line tool against a prepared wav file and
//! captures the plain transcript from stdout (`-nt` strips timestamps,
//! `-np` keeps progress chatter off the output).

use super::{ProviderError, TranscriptionProvider};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

pub struct WhisperCliTranscriber {
    binary: String,
    model: PathBuf,
    language: String,
    timeout: Duration,
}

impl WhisperCliTranscriber {
    pub fn new(
        binary: impl Into<String>,
        model: impl Into<PathBuf>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            language: language.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl TranscriptionProvider for WhisperCliTranscriber {
    async fn transcribe(&self, wav_path: &Path) -> Result<String, ProviderError> {
        debug!(wav = %wav_path.display(), model = %self.model.display(), "Transcribing audio");

        let mut command = Command::new(&self.binary);
        command
            .arg("-m")
            .arg(&self.model)
            .arg("-f")
            .arg(wav_path)
            .args(["-l", &self.language])
            .args(["-nt", "-np"]);

        let result = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?;

        let process_output = result.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ProviderError::BinaryNotFound(self.binary.clone())
            } else {
                ProviderError::Io(err)
            }
        })?;

        if !process_output.status.success() {
            let stderr = String::from_utf8_lossy(&process_output.stderr);
            let tail: String = stderr.lines().rev().take(3).collect::<Vec<_>>().join(" | ");
            return Err(ProviderError::ExecutionFailed(format!(
                "whisper exited with {:?}: {}",
                process_output.status.code(),
                tail
            )));
        }

        let transcript = String::from_utf8_lossy(&process_output.stdout)
            .trim()
            .to_string();
        info!(words = transcript.split_whitespace().count(), "Transcription complete");

        Ok(transcript)
    }
}
