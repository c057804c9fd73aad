//! Stage sequencing over one request's draft messages.

use crate::assembler;
use crate::error::{PipelineError, Stage};
use crate::staging::{AudioArtifact, AudioFormat, TranscriptStore};
use anima_dialogue::DialogueProvider;
use anima_types::{DraftMessage, ReplyBatch, VisemeTrack};
use anima_voice::{AudioTranscoder, SpeechSynthesizer, VisemeExtractor, VoiceError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs the per-message sub-pipeline (speech, transcode, visemes, assembly)
/// over the drafts the dialogue service produces.
///
/// Slots run strictly sequentially in draft order. The first failing stage
/// aborts the batch: nothing partial ever reaches the caller, and the
/// request's staging directory is removed either way.
pub struct Orchestrator {
    dialogue: Arc<dyn DialogueProvider>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    transcoder: Arc<dyn AudioTranscoder>,
    extractor: Arc<dyn VisemeExtractor>,
    staging_root: PathBuf,
}

impl Orchestrator {
    pub fn new(
        dialogue: Arc<dyn DialogueProvider>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcoder: Arc<dyn AudioTranscoder>,
        extractor: Arc<dyn VisemeExtractor>,
        staging_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dialogue,
            synthesizer,
            transcoder,
            extractor,
            staging_root: staging_root.into(),
        }
    }

    /// Turns one user message into a full reply batch.
    pub async fn run(&self, user_text: &str) -> Result<ReplyBatch, PipelineError> {
        // Fail fast if the viseme tool is gone; no point paying for
        // dialogue and synthesis first.
        self.extractor
            .check_available()
            .map_err(|source| PipelineError::Stage {
                slot: 0,
                stage: Stage::Viseme,
                source,
            })?;

        let drafts = self.dialogue.generate(user_text).await?;
        info!(drafts = drafts.len(), "dialogue produced drafts");
        if drafts.is_empty() {
            return Ok(ReplyBatch::default());
        }

        let store = TranscriptStore::create(&self.staging_root).await?;
        let result = self.run_slots(&store, &drafts).await;
        store.cleanup().await;
        result
    }

    async fn run_slots(
        &self,
        store: &TranscriptStore,
        drafts: &[DraftMessage],
    ) -> Result<ReplyBatch, PipelineError> {
        let mut units = Vec::with_capacity(drafts.len());
        for (slot, draft) in drafts.iter().enumerate() {
            let started = Instant::now();

            let raw = self.synthesize_slot(store, slot, &draft.text).await?;
            let transcoded = self.transcode_slot(store, slot, &raw).await?;
            let track = self.extract_slot(store, slot, &transcoded).await?;
            let unit = assembler::assemble(draft, &raw, track).await?;

            info!(
                slot,
                request_id = %store.request_id(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "slot pipeline complete"
            );
            units.push(unit);
        }
        Ok(ReplyBatch::new(units))
    }

    /// Speech stage. The synthesizer's success return is not trusted on its
    /// own: the artifact must actually exist afterwards, so "service said
    /// no" and "service said yes but lied" stay distinguishable.
    async fn synthesize_slot(
        &self,
        store: &TranscriptStore,
        slot: usize,
        text: &str,
    ) -> Result<AudioArtifact, PipelineError> {
        let path = store.raw_path(slot);
        self.synthesizer
            .synthesize(text, &path)
            .await
            .map_err(|source| PipelineError::Stage {
                slot,
                stage: Stage::Speech,
                source,
            })?;

        let landed = tokio::fs::try_exists(&path).await.unwrap_or(false);
        if !landed {
            warn!(slot, path = %path.display(), "synthesis reported success but no file landed");
            return Err(PipelineError::Stage {
                slot,
                stage: Stage::Speech,
                source: VoiceError::SynthesisOutputMissing(path),
            });
        }

        Ok(AudioArtifact {
            path,
            format: AudioFormat::Raw,
        })
    }

    async fn transcode_slot(
        &self,
        store: &TranscriptStore,
        slot: usize,
        raw: &AudioArtifact,
    ) -> Result<AudioArtifact, PipelineError> {
        let path = store.transcoded_path(slot);
        self.transcoder
            .transcode(&raw.path, &path)
            .await
            .map_err(|source| PipelineError::Stage {
                slot,
                stage: Stage::Transcode,
                source,
            })?;

        Ok(AudioArtifact {
            path,
            format: AudioFormat::Transcoded,
        })
    }

    /// Viseme stage: run the tool, then parse and validate its output. A
    /// track whose cue start times decrease is the tool misbehaving, so it
    /// is rejected here rather than shipped to the client.
    async fn extract_slot(
        &self,
        store: &TranscriptStore,
        slot: usize,
        transcoded: &AudioArtifact,
    ) -> Result<VisemeTrack, PipelineError> {
        let path = store.track_path(slot);
        self.extractor
            .extract(&transcoded.path, &path)
            .await
            .map_err(|source| PipelineError::Stage {
                slot,
                stage: Stage::Viseme,
                source,
            })?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| PipelineError::ArtifactRead {
                path: path.clone(),
                source,
            })?;

        let track: VisemeTrack =
            serde_json::from_slice(&bytes).map_err(|e| PipelineError::Stage {
                slot,
                stage: Stage::Viseme,
                source: VoiceError::VisemeExtraction(format!(
                    "tool output is not a valid viseme track: {}",
                    e
                )),
            })?;

        if !track.is_ordered() {
            return Err(PipelineError::Stage {
                slot,
                stage: Stage::Viseme,
                source: VoiceError::VisemeExtraction(
                    "tool output has decreasing cue start times".to_string(),
                ),
            });
        }

        Ok(track)
    }
}
