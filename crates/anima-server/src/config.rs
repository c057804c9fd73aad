//! Server configuration loading from file and environment variables.

use anima_voice::ExtractionMode;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Dialogue collaborator settings.
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Speech-synthesis collaborator settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Pipeline tool and staging settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Dialogue service configuration. An empty API key routes `/chat` to the
/// canned keys batch instead of failing.
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    #[serde(default)]
    pub api_key: String,

    /// Completion model identifier.
    #[serde(default = "default_dialogue_model")]
    pub model: String,

    /// Override for the API base URL (compatible providers, tests).
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Speech-synthesis service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub api_key: String,

    /// Fixed voice identifier used for every synthesis call.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// Synthesis model identifier.
    #[serde(default = "default_speech_model")]
    pub model_id: String,

    /// Override for the API base URL (compatible providers, tests).
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Staging paths and external tool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Root directory for request-scoped staging subdirectories.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,

    /// Directory holding the pre-authored canned reply artifacts.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    /// Transcoder binary path or name.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Viseme tool binary path.
    #[serde(default = "default_rhubarb_path")]
    pub rhubarb_path: String,

    /// Viseme recognizer: `phonetic` (fast) or `pocket_sphinx` (precise).
    #[serde(default)]
    pub extraction_mode: ExtractionMode,

    /// Timeout for one transcoder run, in seconds.
    #[serde(default = "default_transcode_timeout_secs")]
    pub transcode_timeout_secs: u64,

    /// Timeout for one viseme-extraction run, in seconds.
    #[serde(default = "default_extraction_timeout_secs")]
    pub extraction_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "anima_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_dialogue_model() -> String {
    "gpt-3.5-turbo-1106".to_string()
}

fn default_voice_id() -> String {
    "kgG7dCoKCfLehAPWkJOE".to_string()
}

fn default_speech_model() -> String {
    "eleven_monolingual_v1".to_string()
}

fn default_staging_dir() -> String {
    "audios".to_string()
}

fn default_assets_dir() -> String {
    "assets/canned".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_rhubarb_path() -> String {
    "bin/rhubarb".to_string()
}

fn default_transcode_timeout_secs() -> u64 {
    60
}

fn default_extraction_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_dialogue_model(),
            base_url: None,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            voice_id: default_voice_id(),
            model_id: default_speech_model(),
            base_url: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            assets_dir: default_assets_dir(),
            ffmpeg_path: default_ffmpeg_path(),
            rhubarb_path: default_rhubarb_path(),
            extraction_mode: ExtractionMode::default(),
            transcode_timeout_secs: default_transcode_timeout_secs(),
            extraction_timeout_secs: default_extraction_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `OPENAI_API_KEY` overrides `dialogue.api_key`
/// - `ELEVEN_LABS_API_KEY` overrides `speech.api_key`
/// - `ANIMA_VOICE_ID` overrides `speech.voice_id`
/// - `ANIMA_HOST` overrides `server.host`
/// - `ANIMA_PORT` overrides `server.port`
/// - `ANIMA_STAGING_DIR` overrides `pipeline.staging_dir`
/// - `ANIMA_ASSETS_DIR` overrides `pipeline.assets_dir`
/// - `ANIMA_FFMPEG_PATH` overrides `pipeline.ffmpeg_path`
/// - `ANIMA_RHUBARB_PATH` overrides `pipeline.rhubarb_path`
/// - `ANIMA_LOG_LEVEL` overrides `logging.level`
/// - `ANIMA_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        config.dialogue.api_key = key;
    }
    if let Ok(key) = std::env::var("ELEVEN_LABS_API_KEY") {
        config.speech.api_key = key;
    }
    if let Ok(voice_id) = std::env::var("ANIMA_VOICE_ID") {
        if !voice_id.trim().is_empty() {
            config.speech.voice_id = voice_id;
        }
    }
    if let Ok(host) = std::env::var("ANIMA_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("ANIMA_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(dir) = std::env::var("ANIMA_STAGING_DIR") {
        if !dir.trim().is_empty() {
            config.pipeline.staging_dir = dir;
        }
    }
    if let Ok(dir) = std::env::var("ANIMA_ASSETS_DIR") {
        if !dir.trim().is_empty() {
            config.pipeline.assets_dir = dir;
        }
    }
    if let Ok(path) = std::env::var("ANIMA_FFMPEG_PATH") {
        if !path.trim().is_empty() {
            config.pipeline.ffmpeg_path = path;
        }
    }
    if let Ok(path) = std::env::var("ANIMA_RHUBARB_PATH") {
        if !path.trim().is_empty() {
            config.pipeline.rhubarb_path = path;
        }
    }
    if let Ok(level) = std::env::var("ANIMA_LOG_LEVEL") {
        if !level.trim().is_empty() {
            config.logging.level = level;
        }
    }
    if let Ok(json) = std::env::var("ANIMA_LOG_JSON") {
        config.logging.json = json == "true";
    }

    Ok(config)
}
