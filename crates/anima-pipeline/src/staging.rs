//! Request-scoped staging area for intermediate audio artifacts.
//!
//! Each request gets its own directory under the staging root, named by a
//! fresh request id, so concurrent requests can never collide on artifact
//! paths. Within a request, artifacts are keyed by slot index.

use crate::error::PipelineError;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// Format tag for a staged audio artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// As produced by speech synthesis (mp3).
    Raw,
    /// As required by the viseme tool (wav).
    Transcoded,
}

/// A staged audio artifact: a path inside the request directory plus its
/// format tag. Owned by the [`TranscriptStore`] for the life of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub format: AudioFormat,
}

/// The staging area for one request's intermediate artifacts.
#[derive(Debug)]
pub struct TranscriptStore {
    request_id: Uuid,
    dir: PathBuf,
}

impl TranscriptStore {
    /// Creates the request directory under `root` (creating `root` itself
    /// if needed).
    pub async fn create(root: &Path) -> Result<Self, PipelineError> {
        let request_id = Uuid::new_v4();
        let dir = root.join(request_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| PipelineError::Staging {
                path: dir.clone(),
                source,
            })?;
        Ok(Self { request_id, dir })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a slot's raw synthesis output.
    pub fn raw_path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("message_{}.mp3", slot))
    }

    /// Path for a slot's transcoded audio.
    pub fn transcoded_path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("message_{}.wav", slot))
    }

    /// Path for a slot's viseme track JSON.
    pub fn track_path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("message_{}.json", slot))
    }

    /// Removes the request directory and everything in it. Best effort:
    /// cleanup failures are logged and never override the pipeline result.
    pub async fn cleanup(self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            warn!(
                request_id = %self.request_id,
                dir = %self.dir.display(),
                "failed to clean up staging directory: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_distinct_request_directories() {
        let root = tempfile::tempdir().unwrap();
        let a = TranscriptStore::create(root.path()).await.unwrap();
        let b = TranscriptStore::create(root.path()).await.unwrap();

        assert_ne!(a.dir(), b.dir());
        assert!(a.dir().is_dir());
        assert!(b.dir().is_dir());
    }

    #[tokio::test]
    async fn slot_paths_are_keyed_by_index() {
        let root = tempfile::tempdir().unwrap();
        let store = TranscriptStore::create(root.path()).await.unwrap();

        assert!(store.raw_path(0).ends_with("message_0.mp3"));
        assert!(store.transcoded_path(1).ends_with("message_1.wav"));
        assert!(store.track_path(2).ends_with("message_2.json"));
        assert_ne!(store.raw_path(0), store.raw_path(1));
    }

    #[tokio::test]
    async fn cleanup_removes_the_request_directory() {
        let root = tempfile::tempdir().unwrap();
        let store = TranscriptStore::create(root.path()).await.unwrap();
        let dir = store.dir().to_path_buf();
        tokio::fs::write(store.raw_path(0), b"bytes").await.unwrap();

        store.cleanup().await;
        assert!(!dir.exists());
    }
}
