//! Final reply assembly: draft metadata + staged audio + viseme track.

use crate::error::PipelineError;
use crate::staging::AudioArtifact;
use anima_types::{DraftMessage, ReplyUnit, VisemeTrack};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Merges a draft with its delivered audio artifact and viseme track into a
/// fully-populated [`ReplyUnit`].
///
/// The only I/O is reading the artifact bytes; a read failure here means an
/// earlier stage lied about producing the artifact.
pub async fn assemble(
    draft: &DraftMessage,
    audio: &AudioArtifact,
    lipsync: VisemeTrack,
) -> Result<ReplyUnit, PipelineError> {
    let bytes = tokio::fs::read(&audio.path)
        .await
        .map_err(|source| PipelineError::ArtifactRead {
            path: audio.path.clone(),
            source,
        })?;

    Ok(ReplyUnit {
        text: draft.text.clone(),
        facial_expression: draft.facial_expression,
        animation: draft.animation,
        audio: BASE64.encode(bytes),
        lipsync,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::AudioFormat;
    use anima_types::{Animation, FacialExpression, VisemeCue};

    #[tokio::test]
    async fn assembles_all_fields_from_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message_0.mp3");
        tokio::fs::write(&path, b"mp3-bytes").await.unwrap();

        let draft = DraftMessage::new("Hey!", FacialExpression::Smile, Animation::Talking1);
        let artifact = AudioArtifact {
            path,
            format: AudioFormat::Raw,
        };
        let track = VisemeTrack {
            metadata: None,
            mouth_cues: vec![VisemeCue {
                start: 0.0,
                end: 0.2,
                value: "X".to_string(),
            }],
        };

        let unit = assemble(&draft, &artifact, track.clone()).await.unwrap();
        assert_eq!(unit.text, "Hey!");
        assert_eq!(unit.facial_expression, FacialExpression::Smile);
        assert_eq!(unit.animation, Animation::Talking1);
        assert_eq!(unit.audio, BASE64.encode(b"mp3-bytes"));
        assert_eq!(unit.lipsync, track);
    }

    #[tokio::test]
    async fn missing_artifact_is_an_artifact_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.mp3");

        let draft = DraftMessage::new("Hey!", FacialExpression::Default, Animation::Idle);
        let artifact = AudioArtifact {
            path: path.clone(),
            format: AudioFormat::Raw,
        };

        let result = assemble(&draft, &artifact, VisemeTrack::default()).await;
        match result {
            Err(PipelineError::ArtifactRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ArtifactRead, got {:?}", other),
        }
    }
}
