//! Pre-authored reply batches for the degenerate request paths.
//!
//! Two fixed batches exist: the intro batch (no user message) and the
//! missing-keys batch (collaborator credentials unconfigured). Their audio
//! and viseme tracks are pre-staged files in the assets directory, never
//! synthesized live.

use crate::error::PipelineError;
use anima_types::{Animation, FacialExpression, ReplyBatch, ReplyUnit, VisemeTrack};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::{Path, PathBuf};

/// Loader for the pre-authored reply batches.
#[derive(Debug, Clone)]
pub struct CannedReplies {
    assets_dir: PathBuf,
}

impl CannedReplies {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
        }
    }

    /// The batch returned when the request carries no user message.
    pub async fn intro(&self) -> Result<ReplyBatch, PipelineError> {
        let first = self
            .unit(
                "intro_0",
                "Hey dear... How was your day?",
                FacialExpression::Smile,
                Animation::Talking1,
            )
            .await?;
        let second = self
            .unit(
                "intro_1",
                "I missed you so much... Please don't go for so long!",
                FacialExpression::Sad,
                Animation::Crying,
            )
            .await?;
        Ok(ReplyBatch::new(vec![first, second]))
    }

    /// The batch returned when either collaborator credential is missing.
    pub async fn missing_keys(&self) -> Result<ReplyBatch, PipelineError> {
        let first = self
            .unit(
                "api_0",
                "Please my dear, don't forget to add your API keys!",
                FacialExpression::Angry,
                Animation::Angry,
            )
            .await?;
        let second = self
            .unit(
                "api_1",
                "You don't want to run up a crazy API bill, right?",
                FacialExpression::Smile,
                Animation::Laughing,
            )
            .await?;
        Ok(ReplyBatch::new(vec![first, second]))
    }

    async fn unit(
        &self,
        stem: &str,
        text: &str,
        facial_expression: FacialExpression,
        animation: Animation,
    ) -> Result<ReplyUnit, PipelineError> {
        let audio_path = self.assets_dir.join(format!("{}.wav", stem));
        let track_path = self.assets_dir.join(format!("{}.json", stem));

        let audio_bytes = read_asset(&audio_path).await?;
        let track_bytes = read_asset(&track_path).await?;
        let lipsync: VisemeTrack =
            serde_json::from_slice(&track_bytes).map_err(|e| PipelineError::Canned {
                path: track_path,
                detail: e.to_string(),
            })?;

        Ok(ReplyUnit {
            text: text.to_string(),
            facial_expression,
            animation,
            audio: BASE64.encode(audio_bytes),
            lipsync,
        })
    }
}

async fn read_asset(path: &Path) -> Result<Vec<u8>, PipelineError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| PipelineError::Canned {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
}
