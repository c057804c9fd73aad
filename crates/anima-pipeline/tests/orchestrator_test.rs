//! End-to-end pipeline tests with fake collaborators.

use anima_dialogue::{DialogueError, DialogueProvider};
use anima_pipeline::{Orchestrator, PipelineError, Stage};
use anima_types::{Animation, DraftMessage, FacialExpression};
use anima_voice::{AudioTranscoder, SpeechSynthesizer, VisemeExtractor, VoiceError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FakeDialogue {
    drafts: Vec<DraftMessage>,
    calls: AtomicUsize,
}

impl FakeDialogue {
    fn new(drafts: Vec<DraftMessage>) -> Self {
        Self {
            drafts,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DialogueProvider for FakeDialogue {
    async fn generate(&self, _user_text: &str) -> Result<Vec<DraftMessage>, DialogueError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.drafts.clone())
    }
}

/// Writes per-slot audio bytes; optionally fails or silently skips the write
/// starting at a given call index.
struct FakeSynthesizer {
    fail_at: Option<usize>,
    skip_write_at: Option<usize>,
    calls: AtomicUsize,
}

impl FakeSynthesizer {
    fn ok() -> Self {
        Self {
            fail_at: None,
            skip_write_at: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_at(slot: usize) -> Self {
        Self {
            fail_at: Some(slot),
            skip_write_at: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn skipping_write_at(slot: usize) -> Self {
        Self {
            fail_at: None,
            skip_write_at: Some(slot),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), VoiceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(call) {
            return Err(VoiceError::Synthesis("service said no".to_string()));
        }
        if self.skip_write_at == Some(call) {
            // Success return without committing any bytes.
            return Ok(());
        }
        tokio::fs::write(output, format!("mp3:{}", text))
            .await
            .map_err(|e| VoiceError::Synthesis(e.to_string()))
    }
}

struct FakeTranscoder;

#[async_trait]
impl AudioTranscoder for FakeTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
        tokio::fs::copy(input, output)
            .await
            .map(|_| ())
            .map_err(|e| VoiceError::Transcode(e.to_string()))
    }
}

struct FakeExtractor {
    available: bool,
    track_json: String,
}

impl FakeExtractor {
    fn with_track(json: &str) -> Self {
        Self {
            available: true,
            track_json: json.to_string(),
        }
    }

    fn missing() -> Self {
        Self {
            available: false,
            track_json: String::new(),
        }
    }
}

#[async_trait]
impl VisemeExtractor for FakeExtractor {
    fn check_available(&self) -> Result<(), VoiceError> {
        if self.available {
            Ok(())
        } else {
            Err(VoiceError::VisemeToolMissing(PathBuf::from("bin/rhubarb")))
        }
    }

    async fn extract(&self, _input: &Path, output: &Path) -> Result<(), VoiceError> {
        tokio::fs::write(output, &self.track_json)
            .await
            .map_err(|e| VoiceError::VisemeExtraction(e.to_string()))
    }
}

const TRACK_JSON: &str = r#"{
    "metadata": {"soundFile": "message_0.wav"},
    "mouthCues": [
        {"start": 0.0, "end": 0.3, "value": "X"},
        {"start": 0.3, "end": 0.5, "value": "B"}
    ]
}"#;

fn drafts() -> Vec<DraftMessage> {
    vec![
        DraftMessage::new("First!", FacialExpression::Smile, Animation::Talking0),
        DraftMessage::new("Second.", FacialExpression::Surprised, Animation::Talking2),
        DraftMessage::new("Third?", FacialExpression::Sad, Animation::Crying),
    ]
}

fn orchestrator_with(
    dialogue: Arc<FakeDialogue>,
    synth: Arc<FakeSynthesizer>,
    extractor: Arc<FakeExtractor>,
    staging_root: &Path,
) -> Orchestrator {
    Orchestrator::new(
        dialogue,
        synth,
        Arc::new(FakeTranscoder),
        extractor,
        staging_root,
    )
}

#[tokio::test]
async fn batch_matches_draft_count_and_order() {
    let root = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator_with(
        Arc::new(FakeDialogue::new(drafts())),
        Arc::new(FakeSynthesizer::ok()),
        Arc::new(FakeExtractor::with_track(TRACK_JSON)),
        root.path(),
    );

    let batch = orchestrator.run("hello").await.unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.messages[0].text, "First!");
    assert_eq!(batch.messages[1].text, "Second.");
    assert_eq!(batch.messages[2].text, "Third?");
    assert_eq!(batch.messages[1].animation, Animation::Talking2);
}

#[tokio::test]
async fn every_unit_is_fully_populated() {
    let root = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator_with(
        Arc::new(FakeDialogue::new(drafts())),
        Arc::new(FakeSynthesizer::ok()),
        Arc::new(FakeExtractor::with_track(TRACK_JSON)),
        root.path(),
    );

    let batch = orchestrator.run("hello").await.unwrap();
    for (slot, unit) in batch.messages.iter().enumerate() {
        assert!(!unit.text.is_empty());
        assert!(!unit.audio.is_empty(), "slot {} has empty audio", slot);
        assert_eq!(unit.lipsync.mouth_cues.len(), 2);
        assert!(unit.lipsync.is_ordered());
    }
    // Audio is the base64 of what the synthesizer staged for that slot.
    assert_eq!(batch.messages[0].audio, BASE64.encode(b"mp3:First!"));
    assert_eq!(batch.messages[2].audio, BASE64.encode(b"mp3:Third?"));
}

#[tokio::test]
async fn synthesis_failure_aborts_whole_batch() {
    let root = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator_with(
        Arc::new(FakeDialogue::new(drafts())),
        Arc::new(FakeSynthesizer::failing_at(1)),
        Arc::new(FakeExtractor::with_track(TRACK_JSON)),
        root.path(),
    );

    let err = orchestrator.run("hello").await.unwrap_err();
    match err {
        PipelineError::Stage { slot, stage, .. } => {
            assert_eq!(slot, 1);
            assert_eq!(stage, Stage::Speech);
        }
        other => panic!("expected Stage error, got {:?}", other),
    }
}

#[tokio::test]
async fn silent_synthesis_is_output_missing_not_service_error() {
    let root = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator_with(
        Arc::new(FakeDialogue::new(drafts())),
        Arc::new(FakeSynthesizer::skipping_write_at(0)),
        Arc::new(FakeExtractor::with_track(TRACK_JSON)),
        root.path(),
    );

    let err = orchestrator.run("hello").await.unwrap_err();
    match err {
        PipelineError::Stage {
            slot: 0,
            stage: Stage::Speech,
            source: VoiceError::SynthesisOutputMissing(path),
        } => assert!(path.ends_with("message_0.mp3")),
        other => panic!("expected SynthesisOutputMissing, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_viseme_tool_fails_before_dialogue_runs() {
    let root = tempfile::tempdir().unwrap();
    let dialogue = Arc::new(FakeDialogue::new(drafts()));
    let orchestrator = orchestrator_with(
        dialogue.clone(),
        Arc::new(FakeSynthesizer::ok()),
        Arc::new(FakeExtractor::missing()),
        root.path(),
    );

    let err = orchestrator.run("hello").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Stage {
            source: VoiceError::VisemeToolMissing(_),
            ..
        }
    ));
    assert_eq!(dialogue.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn disordered_track_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let bad_track = r#"{"mouthCues":[
        {"start": 0.5, "end": 0.6, "value": "A"},
        {"start": 0.1, "end": 0.2, "value": "B"}
    ]}"#;
    let orchestrator = orchestrator_with(
        Arc::new(FakeDialogue::new(drafts())),
        Arc::new(FakeSynthesizer::ok()),
        Arc::new(FakeExtractor::with_track(bad_track)),
        root.path(),
    );

    let err = orchestrator.run("hello").await.unwrap_err();
    match err {
        PipelineError::Stage {
            stage: Stage::Viseme,
            source: VoiceError::VisemeExtraction(msg),
            ..
        } => assert!(msg.contains("decreasing"), "got: {}", msg),
        other => panic!("expected VisemeExtraction error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_track_is_a_viseme_error() {
    let root = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator_with(
        Arc::new(FakeDialogue::new(drafts())),
        Arc::new(FakeSynthesizer::ok()),
        Arc::new(FakeExtractor::with_track("not json at all")),
        root.path(),
    );

    let err = orchestrator.run("hello").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Stage {
            stage: Stage::Viseme,
            source: VoiceError::VisemeExtraction(_),
            ..
        }
    ));
}

#[tokio::test]
async fn staging_root_is_empty_after_success_and_failure() {
    let root = tempfile::tempdir().unwrap();

    let ok = orchestrator_with(
        Arc::new(FakeDialogue::new(drafts())),
        Arc::new(FakeSynthesizer::ok()),
        Arc::new(FakeExtractor::with_track(TRACK_JSON)),
        root.path(),
    );
    ok.run("hello").await.unwrap();

    let failing = orchestrator_with(
        Arc::new(FakeDialogue::new(drafts())),
        Arc::new(FakeSynthesizer::failing_at(2)),
        Arc::new(FakeExtractor::with_track(TRACK_JSON)),
        root.path(),
    );
    failing.run("hello").await.unwrap_err();

    let mut entries = tokio::fs::read_dir(root.path()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn empty_draft_list_yields_empty_batch() {
    let root = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator_with(
        Arc::new(FakeDialogue::new(Vec::new())),
        Arc::new(FakeSynthesizer::ok()),
        Arc::new(FakeExtractor::with_track(TRACK_JSON)),
        root.path(),
    );

    let batch = orchestrator.run("hello").await.unwrap();
    assert!(batch.is_empty());
}

#[tokio::test]
async fn identical_drafts_produce_identical_tracks() {
    // With deterministic collaborators, running the same text twice yields
    // byte-identical viseme sequences.
    let root = tempfile::tempdir().unwrap();
    let one = vec![DraftMessage::new(
        "Same text",
        FacialExpression::Default,
        Animation::Idle,
    )];
    let orchestrator = orchestrator_with(
        Arc::new(FakeDialogue::new(one)),
        Arc::new(FakeSynthesizer::ok()),
        Arc::new(FakeExtractor::with_track(TRACK_JSON)),
        root.path(),
    );

    let first = orchestrator.run("hello").await.unwrap();
    let second = orchestrator.run("hello").await.unwrap();
    assert_eq!(
        first.messages[0].lipsync, second.messages[0].lipsync,
        "viseme tracks should be deterministic for identical inputs"
    );
    assert_eq!(first.messages[0].audio, second.messages[0].audio);
}
