//! Chat and voice-catalog API handlers.

use crate::AppState;
use anima_pipeline::PipelineError;
use anima_types::ReplyBatch;
use anima_voice::VoiceError;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

/// API error response: `{error, details}` with a status distinguishing
/// collaborator failures (502) from environment/internal failures (500).
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    details: String,
}

impl ApiError {
    pub fn internal(error: &'static str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error,
            details: details.into(),
        }
    }

    pub fn bad_gateway(error: &'static str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            error,
            details: details.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        let status = if e.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            error: e.tag(),
            details: e.to_string(),
        }
    }
}

impl From<VoiceError> for ApiError {
    fn from(e: VoiceError) -> Self {
        match e {
            VoiceError::Catalog(_) => ApiError::bad_gateway("voice catalog unavailable", e.to_string()),
            other => ApiError::internal("voice service error", other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.error,
            "details": self.details,
        }));
        (self.status, body).into_response()
    }
}

/// Handler for `POST /chat`.
///
/// Empty or absent message short-circuits to the canned intro batch; missing
/// credentials short-circuit to the canned keys batch. Otherwise the full
/// pipeline runs and its first failure aborts the request.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ReplyBatch>, ApiError> {
    let message = payload.message.as_deref().map(str::trim).unwrap_or("");

    if message.is_empty() {
        let batch = state.canned.intro().await.map_err(log_and_convert)?;
        return Ok(Json(batch));
    }

    if !state.live_enabled {
        let batch = state.canned.missing_keys().await.map_err(log_and_convert)?;
        return Ok(Json(batch));
    }

    let batch = state
        .orchestrator
        .run(message)
        .await
        .map_err(log_and_convert)?;
    Ok(Json(batch))
}

/// Handler for `GET /voices` — proxies the synthesis service's catalog.
pub async fn voices_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let catalog = state.speech.voices().await.map_err(|e| {
        error!("voice catalog request failed: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(catalog))
}

fn log_and_convert(e: PipelineError) -> ApiError {
    // PipelineError's Display already carries slot and stage context.
    error!("chat pipeline failed: {}", e);
    ApiError::from(e)
}
