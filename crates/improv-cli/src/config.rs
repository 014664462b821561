//! Configuration management for the improv CLI
//!
//! Stores service endpoints, the project root and an optional ElevenLabs
//! API key in ~/.config/improv/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use improv::PipelineError;
use improv_pipeline::adapters::elevenlabs::API_KEY_ENV;

const CONFIG_DIR: &str = "improv";
const CONFIG_FILE: &str = "config.toml";

/// CLI Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_image_api_url")]
    pub image_api_url: String,
    #[serde(default = "default_speech_api_url")]
    pub speech_api_url: String,
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,
    #[serde(default = "default_speech_timeout")]
    pub speech_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_image_api_url() -> String {
    improv_pipeline::adapters::sd_webui::DEFAULT_BASE_URL.to_string()
}

fn default_speech_api_url() -> String {
    improv_pipeline::adapters::elevenlabs::DEFAULT_BASE_URL.to_string()
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_tts_model() -> String {
    improv::domain::DEFAULT_TTS_MODEL.to_string()
}

fn default_image_timeout() -> u64 {
    600
}

fn default_speech_timeout() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_api_url: default_image_api_url(),
            speech_api_url: default_speech_api_url(),
            project_root: default_project_root(),
            tts_model: default_tts_model(),
            image_timeout_secs: default_image_timeout(),
            speech_timeout_secs: default_speech_timeout(),
            api_key: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {:?}", dir))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Set API key
    pub fn set_api_key(&mut self, key: String) {
        self.api_key = Some(key);
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn speech_timeout(&self) -> Duration {
        Duration::from_secs(self.speech_timeout_secs)
    }
}

/// Resolve the speech API key
///
/// Order: the project's `.env`, then the process environment, then the
/// key stored in the config file.
pub fn resolve_api_key(
    from_env: Option<String>,
    env_file: &Path,
    stored: Option<&str>,
) -> Result<String, PipelineError> {
    read_env_file(env_file)
        .or_else(|| from_env.filter(|k| !k.trim().is_empty()))
        .or_else(|| stored.filter(|k| !k.trim().is_empty()).map(str::to_string))
        .map(|k| k.trim().to_string())
        .ok_or_else(|| {
            PipelineError::Configuration(format!(
                "{API_KEY_ENV} not set. Export it, add it to {}, or run 'improv login'",
                env_file.display()
            ))
        })
}

/// Look up the key in a dotenv file without touching the process environment
fn read_env_file(path: &Path) -> Option<String> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "No usable .env file");
            return None;
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .find(|(key, value)| key == API_KEY_ENV && !value.trim().is_empty())
        .map(|(_, value)| value)
}
