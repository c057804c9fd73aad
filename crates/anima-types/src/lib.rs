//! Shared types for the anima avatar reply service.
//!
//! This crate defines the data model that flows through the reply pipeline:
//! draft messages produced by the dialogue service, viseme timing tracks
//! produced by the extraction tool, and the fully-assembled reply units the
//! HTTP layer returns to clients.
//!
//! No crate in the workspace depends on anything *except* `anima-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

pub mod reply;
pub mod viseme;

pub use reply::{Animation, DraftMessage, FacialExpression, ReplyBatch, ReplyUnit, MAX_MESSAGES};
pub use viseme::{TrackMetadata, VisemeCue, VisemeTrack};
