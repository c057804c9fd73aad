//! Voice tooling for the anima avatar service.
//!
//! Three collaborators live here, each behind a trait seam so the pipeline
//! can be exercised with fakes:
//!
//! - [`SpeechSynthesizer`] — HTTP text-to-speech, writing an mp3 artifact to
//!   a staging path ([`ElevenLabsClient`]).
//! - [`AudioTranscoder`] — external transcoder process converting mp3 to the
//!   wav format the viseme tool requires ([`FfmpegTranscoder`]).
//! - [`VisemeExtractor`] — external lip-sync tool producing a timed
//!   mouth-shape JSON document ([`RhubarbExtractor`]).
//!
//! Every external call runs under a bounded timeout; process failures carry
//! the tool's stderr rather than swallowing it.

pub mod error;
pub mod transcode;
pub mod tts;
pub mod viseme;

pub use error::VoiceError;
pub use transcode::{AudioTranscoder, FfmpegTranscoder};
pub use tts::{ElevenLabsClient, SpeechSynthesizer};
pub use viseme::{ExtractionMode, RhubarbExtractor, VisemeExtractor};
