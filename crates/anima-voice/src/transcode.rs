//! External audio transcoder wrapper (ffmpeg).

use crate::error::VoiceError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Default timeout for one transcoder run.
const TRANSCODE_TIMEOUT: Duration = Duration::from_secs(60);

/// Converts one staged audio artifact into another container format.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), VoiceError>;
}

/// ffmpeg-based transcoder, mp3 in / wav out as inferred from the path
/// extensions ffmpeg is given.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: TRANSCODE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
        debug!(input = %input.display(), output = %output.display(), "transcoding audio");

        let mut command = Command::new(&self.binary);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command
            .spawn()
            .map_err(|e| VoiceError::Transcode(format!("failed to spawn transcoder: {}", e)))?;

        let result = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| VoiceError::Timeout {
                stage: "transcode",
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| VoiceError::Transcode(format!("failed to wait for transcoder: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(VoiceError::Transcode(format!(
                "transcoder exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
