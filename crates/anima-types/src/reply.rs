//! Draft and reply message definitions.
//!
//! A [`DraftMessage`] is what the dialogue service produces: text plus the
//! expression and animation tags the avatar client understands. A
//! [`ReplyUnit`] is the same message after audio synthesis and viseme
//! extraction, carrying inline base64 audio and a lip-sync track.

use crate::viseme::VisemeTrack;
use serde::{Deserialize, Serialize};

/// Maximum number of messages per reply batch. The dialogue service is
/// prompted to return at most this many drafts; anything past it is dropped.
pub const MAX_MESSAGES: usize = 3;

/// Facial expression tags supported by the avatar client.
///
/// Unknown tags from the dialogue service deserialize as [`Default`](Self::Default)
/// rather than failing the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum FacialExpression {
    Smile,
    Sad,
    Angry,
    Surprised,
    FunnyFace,
    #[default]
    Default,
}

impl From<String> for FacialExpression {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "smile" => Self::Smile,
            "sad" => Self::Sad,
            "angry" => Self::Angry,
            "surprised" => Self::Surprised,
            "funnyFace" => Self::FunnyFace,
            _ => Self::Default,
        }
    }
}

/// Body animation tags supported by the avatar client.
///
/// Serialized names match the client's animation clip names exactly, so the
/// `Talking_*` variants carry explicit renames. Unknown tags fall back to
/// [`Idle`](Self::Idle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Animation {
    #[serde(rename = "Talking_0")]
    Talking0,
    #[serde(rename = "Talking_1")]
    Talking1,
    #[serde(rename = "Talking_2")]
    Talking2,
    Crying,
    Laughing,
    Rumba,
    #[default]
    Idle,
    Terrified,
    Angry,
}

impl From<String> for Animation {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Talking_0" => Self::Talking0,
            "Talking_1" => Self::Talking1,
            "Talking_2" => Self::Talking2,
            "Crying" => Self::Crying,
            "Laughing" => Self::Laughing,
            "Rumba" => Self::Rumba,
            "Terrified" => Self::Terrified,
            "Angry" => Self::Angry,
            _ => Self::Idle,
        }
    }
}

/// A single message draft from the dialogue service, before audio enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMessage {
    /// The spoken text. Non-empty by contract with the dialogue service.
    pub text: String,
    /// Facial expression to hold while this message plays.
    #[serde(rename = "facialExpression", default)]
    pub facial_expression: FacialExpression,
    /// Body animation to play alongside the message.
    #[serde(default)]
    pub animation: Animation,
}

impl DraftMessage {
    pub fn new(
        text: impl Into<String>,
        facial_expression: FacialExpression,
        animation: Animation,
    ) -> Self {
        Self {
            text: text.into(),
            facial_expression,
            animation,
        }
    }
}

/// A fully-populated avatar reply: every field is present before a unit is
/// surfaced to a client. Partial units are never constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyUnit {
    pub text: String,
    #[serde(rename = "facialExpression")]
    pub facial_expression: FacialExpression,
    pub animation: Animation,
    /// Standard base64 encoding of the delivered audio bytes.
    pub audio: String,
    /// Frame-aligned mouth-shape track for this unit's audio.
    pub lipsync: VisemeTrack,
}

/// An ordered batch of reply units, in draft order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyBatch {
    pub messages: Vec<ReplyUnit>,
}

impl ReplyBatch {
    pub fn new(messages: Vec<ReplyUnit>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
