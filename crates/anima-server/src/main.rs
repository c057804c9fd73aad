//! anima server binary — turns chat messages into talking-avatar replies.
//!
//! Starts an axum HTTP server with structured logging, wires the dialogue,
//! synthesis, transcode, and viseme collaborators into the reply pipeline,
//! and shuts down gracefully on SIGTERM/SIGINT.

use anima_dialogue::OpenAiDialogue;
use anima_pipeline::{CannedReplies, Orchestrator};
use anima_server::config;
use anima_server::{app, AppState};
use anima_voice::{ElevenLabsClient, FfmpegTranscoder, RhubarbExtractor, VisemeExtractor};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("ANIMA_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Staging root must exist before the first request stages anything.
    std::fs::create_dir_all(&config.pipeline.staging_dir)
        .expect("failed to create staging directory — check pipeline.staging_dir in config");

    let live_enabled =
        !config.dialogue.api_key.trim().is_empty() && !config.speech.api_key.trim().is_empty();
    if !live_enabled {
        tracing::warn!(
            "collaborator credentials missing; /chat will serve the canned keys batch"
        );
    }

    let mut dialogue =
        OpenAiDialogue::new(&config.dialogue.api_key).with_model(&config.dialogue.model);
    if let Some(base_url) = &config.dialogue.base_url {
        dialogue = dialogue.with_base_url(base_url);
    }

    let mut speech = ElevenLabsClient::new(&config.speech.api_key, &config.speech.voice_id)
        .with_model_id(&config.speech.model_id);
    if let Some(base_url) = &config.speech.base_url {
        speech = speech.with_base_url(base_url);
    }
    let speech = Arc::new(speech);

    let transcoder = FfmpegTranscoder::new(&config.pipeline.ffmpeg_path)
        .with_timeout(Duration::from_secs(config.pipeline.transcode_timeout_secs));

    let extractor = RhubarbExtractor::new(&config.pipeline.rhubarb_path)
        .with_mode(config.pipeline.extraction_mode)
        .with_timeout(Duration::from_secs(config.pipeline.extraction_timeout_secs));
    if let Err(e) = extractor.check_available() {
        // Startup warning only; the pipeline re-checks per request so the
        // tool can be installed without a restart.
        tracing::warn!("viseme tool not available yet: {}", e);
    }

    let orchestrator = Orchestrator::new(
        Arc::new(dialogue),
        speech.clone(),
        Arc::new(transcoder),
        Arc::new(extractor),
        &config.pipeline.staging_dir,
    );

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        canned: CannedReplies::new(&config.pipeline.assets_dir),
        speech,
        live_enabled,
    };

    // Build application
    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting anima server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address — is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("anima server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
