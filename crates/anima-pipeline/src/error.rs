use anima_dialogue::DialogueError;
use anima_voice::VoiceError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Speech,
    Transcode,
    Viseme,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Speech => "speech",
            Stage::Transcode => "transcode",
            Stage::Viseme => "viseme",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Dialogue generation failed; no drafts, no batch.
    #[error(transparent)]
    Dialogue(#[from] DialogueError),

    /// A per-slot stage failed. The batch is aborted at this slot.
    #[error("{stage} stage failed for slot {slot}: {source}")]
    Stage {
        slot: usize,
        stage: Stage,
        source: VoiceError,
    },

    /// The request-scoped staging directory could not be created.
    #[error("failed to create staging directory {path}: {source}")]
    Staging {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A staged artifact that earlier stages produced could not be read
    /// back. Treated as an invariant violation, not a user error.
    #[error("failed to read staged artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A pre-authored canned artifact is missing or unreadable.
    #[error("failed to load canned reply artifact {path}: {detail}")]
    Canned { path: PathBuf, detail: String },
}

impl PipelineError {
    /// True when the failure is the collaborator's fault (HTTP 502
    /// territory) rather than this service's environment (HTTP 500).
    pub fn is_upstream(&self) -> bool {
        match self {
            PipelineError::Dialogue(DialogueError::Service(_)) => true,
            PipelineError::Dialogue(DialogueError::Parse(_)) => false,
            PipelineError::Stage { source, .. } => matches!(
                source,
                VoiceError::Synthesis(_)
                    | VoiceError::SynthesisOutputMissing(_)
                    | VoiceError::Timeout {
                        stage: "speech synthesis",
                        ..
                    }
            ),
            _ => false,
        }
    }

    /// Short machine-oriented tag for the error response body.
    pub fn tag(&self) -> &'static str {
        match self {
            PipelineError::Dialogue(DialogueError::Service(_)) => "dialogue request failed",
            PipelineError::Dialogue(DialogueError::Parse(_)) => {
                "failed to parse dialogue response"
            }
            PipelineError::Stage { source, .. } => match source {
                VoiceError::Synthesis(_) => "text-to-speech failed",
                VoiceError::SynthesisOutputMissing(_) => "text-to-speech output missing",
                VoiceError::Catalog(_) => "voice catalog unavailable",
                VoiceError::Transcode(_) => "audio transcode failed",
                VoiceError::VisemeToolMissing(_) => "viseme tool not found",
                VoiceError::VisemeExtraction(_) => "viseme extraction failed",
                VoiceError::Timeout { .. } => "stage timed out",
            },
            PipelineError::Staging { .. } => "staging directory unavailable",
            PipelineError::ArtifactRead { .. } => "staged artifact unreadable",
            PipelineError::Canned { .. } => "canned reply unavailable",
        }
    }
}
