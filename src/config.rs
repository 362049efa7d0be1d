//! Configuration resolution for cantoria.
//!
//! Priority order: command-line argument > environment variable > TOML
//! config file > compiled default. Clap handles the first two tiers
//! (`env` feature), the TOML file fills the rest.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

/// Command-line interface
#[derive(Debug, Parser)]
#[command(name = "cantoria", about = "Karaoke scoring backend", version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "CANTORIA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "CANTORIA_PORT")]
    pub port: Option<u16>,

    /// Directory for per-request temp audio files
    #[arg(long, env = "CANTORIA_AUDIO_DIR")]
    pub audio_dir: Option<PathBuf>,

    /// Path of the lyric word cache (CSV)
    #[arg(long, env = "CANTORIA_LYRIC_CACHE")]
    pub lyric_cache: Option<PathBuf>,
}

/// Whisper CLI transcription settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    /// whisper.cpp CLI binary name or path
    pub binary: String,
    /// GGML model file
    pub model: PathBuf,
    /// Spoken language ("auto" lets the model detect it)
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            binary: "whisper-cli".to_string(),
            model: PathBuf::from("models/ggml-base.bin"),
            language: "auto".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Embedding endpoint settings (Ollama-compatible `/api/embeddings`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "all-minilm".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    /// Directory for per-request temp audio files
    pub audio_dir: PathBuf,
    /// Lyric word cache (CSV, append-only)
    pub lyric_cache: PathBuf,
    /// ffmpeg binary name or path
    pub ffmpeg_binary: String,
    pub conversion_timeout_secs: u64,
    pub whisper: WhisperConfig,
    pub embedding: EmbeddingConfig,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            audio_dir: data_dir.join("audios"),
            lyric_cache: data_dir.join("musicas.csv"),
            ffmpeg_binary: "ffmpeg".to_string(),
            conversion_timeout_secs: 60,
            whisper: WhisperConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// OS-dependent default data folder (`~/.local/share/cantoria` on Linux)
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cantoria"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default config file location (`~/.config/cantoria/cantoria.toml`)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cantoria").join("cantoria.toml"))
}

impl Config {
    /// Resolve the effective configuration from CLI, environment and TOML.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("read config file {}", path.display()))?;
                let config: Config = toml::from_str(&content)
                    .with_context(|| format!("parse config file {}", path.display()))?;
                info!("Config loaded from {}", path.display());
                config
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("read config file {}", path.display()))?;
                    let config: Config = toml::from_str(&content)
                        .with_context(|| format!("parse config file {}", path.display()))?;
                    info!("Config loaded from {}", path.display());
                    config
                }
                None => Config::default(),
            },
        };

        // CLI / env overrides (clap resolves env vars into the Cli struct)
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(audio_dir) = &cli.audio_dir {
            config.audio_dir = audio_dir.clone();
        }
        if let Some(lyric_cache) = &cli.lyric_cache {
            config.lyric_cache = lyric_cache.clone();
        }

        Ok(config)
    }
}
