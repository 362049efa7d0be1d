//! ffmpeg audio converter
//!
//! Invokes the ffmpeg command-line tool to normalize whatever the client
//! uploaded (m4a, mp4, ogg, ...) into mono 16 kHz 16-bit PCM wav, the
//! format the speech model expects. Video streams are dropped so phone
//! recordings in MP4 containers work too.

use super::{AudioConverter, ProviderError};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error};

pub struct FfmpegConverter {
    binary: String,
    timeout: Duration,
}

impl FfmpegConverter {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ProviderError> {
        debug!(
            input = %input.display(),
            output = %output.display(),
            "Converting audio with ffmpeg"
        );

        let mut command = Command::new(&self.binary);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-vn")
            .args(["-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
            .arg(output);

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
            error!(status = ?process_output.status.code(), "ffmpeg failed: {}", tail);
            return Err(ProviderError::ExecutionFailed(format!(
                "ffmpeg exited with {:?}: {}",
                process_output.status.code(),
                tail
            )));
        }

        debug!(output = %output.display(), "Conversion complete");
        Ok(())
    }
}
