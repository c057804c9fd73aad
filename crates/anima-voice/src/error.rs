use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    /// The speech-synthesis service could not be reached or rejected the
    /// request.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// The synthesis call reported success but no audio file landed at the
    /// expected path.
    #[error("speech synthesis produced no output at {0}")]
    SynthesisOutputMissing(PathBuf),

    /// The voice catalog endpoint could not be reached or rejected the
    /// request.
    #[error("voice catalog request failed: {0}")]
    Catalog(String),

    /// The transcoder process exited non-zero or could not be spawned.
    #[error("audio transcode failed: {0}")]
    Transcode(String),

    /// The viseme tool binary does not exist at its configured path.
    #[error("viseme tool not found at {0}")]
    VisemeToolMissing(PathBuf),

    /// The viseme tool exists but failed on this input, or its output was
    /// malformed.
    #[error("viseme extraction failed: {0}")]
    VisemeExtraction(String),

    /// An external call exceeded its bounded timeout.
    #[error("{stage} timed out after {seconds} seconds")]
    Timeout { stage: &'static str, seconds: u64 },
}
