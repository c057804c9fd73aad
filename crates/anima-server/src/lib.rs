//! HTTP layer for the anima avatar service.
//!
//! Three routes: a liveness check, a voice-catalog proxy, and the `/chat`
//! endpoint that runs the reply pipeline. All state the handlers need lives
//! in [`AppState`], injected as an axum `Extension`.

pub mod api;
pub mod config;

use anima_pipeline::{CannedReplies, Orchestrator};
use anima_voice::ElevenLabsClient;
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The reply-generation pipeline.
    pub orchestrator: Arc<Orchestrator>,
    /// Pre-authored fallback batches.
    pub canned: CannedReplies,
    /// Speech client, also used for the voice-catalog proxy.
    pub speech: Arc<ElevenLabsClient>,
    /// Whether both collaborator credentials are configured. Decided once at
    /// startup: when false, every `/chat` call gets the canned keys batch;
    /// when true, collaborator failures surface as 502s and never fall back
    /// to canned replies.
    pub live_enabled: bool,
}

/// Liveness handler for `GET /`.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    // Browser clients talk to this from arbitrary origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/voices", get(api::voices_handler))
        .route("/chat", post(api::chat_handler))
        .layer(Extension(Arc::new(state)))
        .layer(cors)
}
