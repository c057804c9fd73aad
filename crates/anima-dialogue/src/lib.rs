//! Dialogue generation for the anima avatar service.
//!
//! Wraps an OpenAI-compatible chat-completions endpoint behind the
//! [`DialogueProvider`] trait: given the user's message, it returns a bounded
//! list of [`DraftMessage`]s (text plus expression and animation tags) for
//! the reply pipeline to enrich with audio and visemes.

pub mod client;
pub mod error;

pub use client::{DialogueProvider, OpenAiDialogue};
pub use error::DialogueError;
