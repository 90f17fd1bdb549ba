//! Configuration
//!
//! Loaded with a two-layer resolution:
//! 1. Explicit path, else `~/.local/share/dailyspend/config.toml` if present
//! 2. Fall back to the embedded default (`config/dailyspend.toml`)
//!
//! Environment variables are applied on top of whichever file was used.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::BackendKind;
use crate::error::{Error, Result};

/// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("../../../config/dailyspend.toml");

pub const ENV_USE_REMOTE: &str = "DAILYSPEND_USE_REMOTE";
pub const ENV_API_KEY: &str = "DAILYSPEND_API_KEY";
pub const ENV_BASE_URL: &str = "DAILYSPEND_BASE_URL";
pub const ENV_MODEL: &str = "DAILYSPEND_MODEL";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub use_remote: bool,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub simulated_latency_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            use_remote: false,
            api_key: String::new(),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout_secs: 20,
            simulated_latency_ms: 0,
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let key = self.api_key.trim();
        if key.is_empty() {
            return "(not set)".to_string();
        }
        let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        format!("****{}", tail)
    }
}

impl Config {
    /// Load configuration and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration without consulting the environment
    pub fn load_file(path: Option<&Path>) -> Result<Self> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let content = match resolved {
            Some(ref p) if p.exists() => {
                debug!("Loading config from {}", p.display());
                fs::read_to_string(p)
                    .map_err(|e| Error::Config(format!("Failed to read {}: {}", p.display(), e)))?
            }
            _ => DEFAULT_CONFIG.to_string(),
        };

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))
    }

    /// Apply `DAILYSPEND_*` overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_USE_REMOTE) {
            match parse_flag(&value) {
                Some(flag) => self.ai.use_remote = flag,
                None => warn!("Ignoring {}={:?}: expected true/false", ENV_USE_REMOTE, value),
            }
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.ai.api_key = key;
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.ai.base_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.ai.model = model;
        }
    }

    /// Effective backend for this configuration
    ///
    /// Remote is used only when it is enabled and a non-blank key is set.
    pub fn backend_kind(&self) -> BackendKind {
        if !self.ai.use_remote {
            return BackendKind::RuleBased;
        }
        if !self.ai.has_api_key() {
            warn!("Remote AI is enabled but no API key is configured; using rule-based insights");
            return BackendKind::RuleBased;
        }
        BackendKind::LanguageModel
    }

    /// Directory holding the ledger documents
    pub fn data_dir(&self) -> Result<PathBuf> {
        match self.storage.data_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => default_data_dir()
                .ok_or_else(|| Error::Config("Could not determine a data directory".into())),
        }
    }

    /// Write the configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write {}: {}", path.display(), e)))
    }
}

/// Default data directory (`~/.local/share/dailyspend`)
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("dailyspend"))
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("config.toml"))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
