//! HTTP text-to-speech client (ElevenLabs-compatible API).

use crate::error::VoiceError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.elevenlabs.io/v1";
const DEFAULT_MODEL_ID: &str = "eleven_monolingual_v1";

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion
/// from oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

/// Timeout for one synthesis HTTP request.
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(60);

/// Produces spoken audio for a piece of text, writing it to a staging path.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` and writes the audio bytes to `output`.
    ///
    /// A success return means the service accepted the request and the bytes
    /// were written; callers still verify the artifact landed before relying
    /// on it.
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), VoiceError>;
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// Client for an ElevenLabs-compatible text-to-speech API.
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    api_key: String,
    voice_id: String,
    model_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl ElevenLabsClient {
    pub fn new(api_key: impl Into<String>, voice_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SYNTHESIS_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.into().trim().to_string(),
            voice_id: voice_id.into(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            client,
        }
    }

    /// Overrides the synthesis model.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Overrides the API base URL (for compatible providers and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetches the service's voice catalog as raw JSON, forwarded verbatim
    /// to clients.
    pub async fn voices(&self) -> Result<serde_json::Value, VoiceError> {
        let url = format!("{}/voices", self.base_url);
        let res = self
            .client
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| VoiceError::Catalog(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Catalog(format!(
                "voice catalog API error {}: {}",
                status, body
            )));
        }

        res.json().await.map_err(|e| VoiceError::Catalog(e.to_string()))
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), VoiceError> {
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Synthesis(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice_id);
        let body = SynthesisRequest {
            text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        };

        let res = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VoiceError::Timeout {
                        stage: "speech synthesis",
                        seconds: SYNTHESIS_TIMEOUT.as_secs(),
                    }
                } else {
                    VoiceError::Synthesis(e.to_string())
                }
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(VoiceError::Synthesis(format!(
                "synthesis API error {}: {}",
                status, body
            )));
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| VoiceError::Synthesis(e.to_string()))?;

        debug!(bytes = bytes.len(), path = %output.display(), "writing synthesized audio");
        tokio::fs::write(output, &bytes)
            .await
            .map_err(|e| VoiceError::Synthesis(format!("failed to write audio file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn oversized_text_is_rejected_without_a_request() {
        // Base URL points nowhere; the size check must fire first.
        let client =
            ElevenLabsClient::new("key", "voice").with_base_url("http://127.0.0.1:1/v1");
        let text = "a".repeat(MAX_TTS_INPUT_BYTES + 1);
        let dir = tempfile::tempdir().unwrap();

        let result = client.synthesize(&text, &dir.path().join("out.mp3")).await;
        match result {
            Err(VoiceError::Synthesis(msg)) => {
                assert!(msg.contains("maximum size"), "got: {}", msg)
            }
            other => panic!("expected Synthesis error, got {:?}", other),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ElevenLabsClient::new("key", "voice").with_base_url("http://host/v1/");
        assert_eq!(client.base_url, "http://host/v1");
    }
}
