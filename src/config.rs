use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ElevateConfig {
    pub general: GeneralConfig,
    pub storage: StorageConfig,
    pub ai: AiConfig,
    pub memory_capture: MemoryCaptureConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub default_model: String,
    pub tts_model: String,
    pub image_model: String,
    pub request_timeout_secs: u64,
}

/// Thresholds for writing `auto` memories out of chat exchanges.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryCaptureConfig {
    pub enabled: bool,
    pub min_reply_chars: usize,
    pub keyword: String,
    pub reply_preview_chars: usize,
    pub input_preview_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AudioConfig {
    /// Command that plays a WAV file passed as its last argument. Empty disables playback.
    pub player: String,
    pub output_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_elevate_dir()
            .join("elevate.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            default_model: "gemini-3-flash-preview".into(),
            tts_model: "gemini-2.5-flash-preview-tts".into(),
            image_model: "gemini-2.5-flash-image".into(),
            request_timeout_secs: 120,
        }
    }
}

impl Default for MemoryCaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_reply_chars: 100,
            keyword: "remember".into(),
            reply_preview_chars: 50,
            input_preview_chars: 200,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        let output_dir = default_elevate_dir()
            .join("audio")
            .to_string_lossy()
            .into_owned();
        Self {
            player: "aplay".into(),
            output_dir,
        }
    }
}

/// Returns `~/.elevate/`
pub fn default_elevate_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".elevate")
}

/// Returns the default config file path: `~/.elevate/config.toml`
pub fn default_config_path() -> PathBuf {
    default_elevate_dir().join("config.toml")
}

impl ElevateConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            ElevateConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (ELEVATE_DB, ELEVATE_LOG_LEVEL, ELEVATE_AI_BASE_URL, ELEVATE_AUDIO_PLAYER).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ELEVATE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("ELEVATE_LOG_LEVEL") {
            self.general.log_level = val;
        }
        if let Ok(val) = std::env::var("ELEVATE_AI_BASE_URL") {
            self.ai.base_url = val;
        }
        if let Ok(val) = std::env::var("ELEVATE_AUDIO_PLAYER") {
            self.audio.player = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_audio_dir(&self) -> PathBuf {
        expand_tilde(&self.audio.output_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
