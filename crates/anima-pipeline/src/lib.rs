//! Reply-generation pipeline for the anima avatar service.
//!
//! One user message becomes a batch of avatar replies through an ordered
//! sequence of stages per draft message:
//!
//! 1. dialogue generation (drafts with expression/animation tags),
//! 2. speech synthesis into a staged mp3,
//! 3. transcode to wav for the viseme tool,
//! 4. viseme extraction into a timed mouth-shape track,
//! 5. assembly into a reply unit with inline base64 audio.
//!
//! Slots run strictly in draft order; the first stage failure aborts the
//! whole batch and nothing partial is surfaced. Intermediate artifacts live
//! in a request-scoped staging directory managed by [`TranscriptStore`] and
//! are removed when the request finishes, successfully or not.

pub mod assembler;
pub mod canned;
pub mod error;
pub mod orchestrator;
pub mod staging;

pub use canned::CannedReplies;
pub use error::{PipelineError, Stage};
pub use orchestrator::Orchestrator;
pub use staging::{AudioArtifact, AudioFormat, TranscriptStore};
