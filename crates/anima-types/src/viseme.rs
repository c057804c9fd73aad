//! Viseme timing track definitions.
//!
//! The extraction tool emits a JSON document with an optional metadata block
//! and an ordered list of mouth cues. The wire shape here matches that output
//! so tracks pass through to the avatar client unmodified.

use serde::{Deserialize, Serialize};

/// A single mouth-shape cue: hold `value` from `start` to `end` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisemeCue {
    pub start: f64,
    pub end: f64,
    /// Mouth-shape category (the extraction tool's A-H / X alphabet).
    pub value: String,
}

/// Metadata block the extraction tool writes alongside the cues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// An ordered viseme track. Cue start times are non-decreasing; an empty
/// track is valid (silence).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisemeTrack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TrackMetadata>,
    #[serde(rename = "mouthCues", default)]
    pub mouth_cues: Vec<VisemeCue>,
}

impl VisemeTrack {
    /// Returns true when cue start times never decrease.
    pub fn is_ordered(&self) -> bool {
        self.mouth_cues.windows(2).all(|w| w[0].start <= w[1].start)
    }
}
