//! OpenAI-compatible chat-completions client producing reply drafts.

use crate::error::DialogueError;
use anima_types::{DraftMessage, MAX_MESSAGES};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo-1106";

/// HTTP timeout for a single completion request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The draft contract the model is held to: a JSON array of at most
/// [`MAX_MESSAGES`] messages, each carrying the tags the avatar client knows.
const SYSTEM_PROMPT: &str = "\
You are a friendly virtual avatar.
You will always reply with a JSON array of messages. With a maximum of 3 messages.
Each message has a text, facialExpression, and animation property.
The different facial expressions are: smile, sad, angry, surprised, funnyFace, and default.
The different animations are: Talking_0, Talking_1, Talking_2, Crying, Laughing, Rumba, Idle, Terrified, and Angry.";

/// A source of reply drafts for one user message.
#[async_trait]
pub trait DialogueProvider: Send + Sync {
    /// Produces at most [`MAX_MESSAGES`] drafts for `user_text`, in the
    /// order they should be spoken.
    async fn generate(&self, user_text: &str) -> Result<Vec<DraftMessage>, DialogueError>;
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Dialogue client for an OpenAI-compatible chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiDialogue {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiDialogue {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.into().trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            client,
        }
    }

    /// Overrides the completion model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API base URL (for compatible providers and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl DialogueProvider for OpenAiDialogue {
    async fn generate(&self, user_text: &str) -> Result<Vec<DraftMessage>, DialogueError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_text.to_string(),
                },
            ],
            max_tokens: 1000,
            temperature: 0.6,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| DialogueError::Service(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(DialogueError::Service(format!(
                "dialogue API error {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| DialogueError::Parse(e.to_string()))?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| DialogueError::Parse("completion had no choices".to_string()))?;

        debug!(bytes = content.len(), "received dialogue completion");
        parse_drafts(content)
    }
}

/// Parses the completion content into drafts.
///
/// The model sometimes wraps the array in a `{"messages": [...]}` object and
/// sometimes returns the bare array; both are accepted. Drafts past
/// [`MAX_MESSAGES`] are dropped.
pub fn parse_drafts(content: &str) -> Result<Vec<DraftMessage>, DialogueError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| DialogueError::Parse(e.to_string()))?;

    let array = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("messages") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(DialogueError::Parse(
                    "completion object has no messages array".to_string(),
                ))
            }
        },
        other => {
            return Err(DialogueError::Parse(format!(
                "expected array or object, got {}",
                kind_name(&other)
            )))
        }
    };

    let mut drafts: Vec<DraftMessage> = array
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<_, _>>()
        .map_err(|e| DialogueError::Parse(e.to_string()))?;

    drafts.truncate(MAX_MESSAGES);
    Ok(drafts)
}

fn kind_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
