//! External viseme-extraction tool wrapper (Rhubarb Lip Sync).

use crate::error::VoiceError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Default timeout for one extraction run. Extraction is the slowest stage,
/// so it gets more headroom than the transcoder.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// Recognizer the extraction tool uses to align mouth shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Phonetic recognizer: faster, less accurate.
    #[default]
    Phonetic,
    /// PocketSphinx recognizer: slower, more accurate.
    PocketSphinx,
}

impl ExtractionMode {
    /// The `-r` argument value the tool expects.
    pub fn as_arg(self) -> &'static str {
        match self {
            Self::Phonetic => "phonetic",
            Self::PocketSphinx => "pocketSphinx",
        }
    }
}

/// Produces a timed mouth-shape JSON document from a wav artifact.
#[async_trait]
pub trait VisemeExtractor: Send + Sync {
    /// Checks the tool can run at all. Surfaced before any per-request work
    /// so a missing binary fails fast with its expected path.
    fn check_available(&self) -> Result<(), VoiceError>;

    /// Runs the tool on `input`, writing the viseme JSON to `output`.
    async fn extract(&self, input: &Path, output: &Path) -> Result<(), VoiceError>;
}

/// Rhubarb Lip Sync wrapper: `rhubarb -f json -o <out> <in> -r <mode>`.
#[derive(Debug, Clone)]
pub struct RhubarbExtractor {
    binary: PathBuf,
    mode: ExtractionMode,
    timeout: Duration,
}

impl RhubarbExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            mode: ExtractionMode::default(),
            timeout: EXTRACTION_TIMEOUT,
        }
    }

    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured binary path, for diagnostics.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

#[async_trait]
impl VisemeExtractor for RhubarbExtractor {
    fn check_available(&self) -> Result<(), VoiceError> {
        if self.binary.is_file() {
            Ok(())
        } else {
            Err(VoiceError::VisemeToolMissing(self.binary.clone()))
        }
    }

    async fn extract(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
        self.check_available()?;

        debug!(
            input = %input.display(),
            output = %output.display(),
            mode = self.mode.as_arg(),
            "extracting visemes"
        );

        let mut command = Command::new(&self.binary);
        command
            .arg("-f")
            .arg("json")
            .arg("-o")
            .arg(output)
            .arg(input)
            .arg("-r")
            .arg(self.mode.as_arg())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command.spawn().map_err(|e| {
            VoiceError::VisemeExtraction(format!("failed to spawn viseme tool: {}", e))
        })?;

        let result = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| VoiceError::Timeout {
                stage: "viseme extraction",
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| {
                VoiceError::VisemeExtraction(format!("failed to wait for viseme tool: {}", e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(VoiceError::VisemeExtraction(format!(
                "viseme tool exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
