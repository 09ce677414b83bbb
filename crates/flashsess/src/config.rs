//! Configuration management for flashsess.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Command-line flags (--session, --dir)
//! 2. Environment variables (FLASHSESS_SESSION, FLASHSESS_DIR)
//! 3. Config file (FLASHSESS_CONFIG or ~/.flashsess/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flashsess_core::{FlashConfig, SessionConfig};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Environment variable overriding `storage.session_dir`.
pub const SESSION_DIR_ENV: &str = "FLASHSESS_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Flash bookkeeping layout inside each session
    #[serde(default)]
    pub flash: FlashConfig,

    /// Where sessions are kept
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per session
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,

    /// Session used when --session is not given
    #[serde(default = "default_session")]
    pub default_session: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_dir: default_session_dir(),
            default_session: default_session(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".flashsess")
}

fn default_session_dir() -> PathBuf {
    default_data_dir().join("sessions")
}

fn default_session() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flash: FlashConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.override_session_dir(std::env::var_os(SESSION_DIR_ENV).map(PathBuf::from));
        Ok(config)
    }

    /// Replace the session directory if an override is given.
    pub fn override_session_dir(&mut self, dir: Option<PathBuf>) {
        if let Some(dir) = dir {
            self.storage.session_dir = dir;
        }
    }

    /// Load configuration from a specific file, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config: Config = if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).context("Failed to read config file")?;
            toml::from_str(&content)
                .map_err(CliError::from)
                .context("Failed to parse config file")?
        } else {
            Config::default()
        };

        config.session_config().validate().map_err(CliError::from)?;
        Ok(config)
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("FLASHSESS_CONFIG") {
            PathBuf::from(path)
        } else {
            default_data_dir().join("config.toml")
        }
    }

    /// Core session configuration derived from this file.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default().with_flash(self.flash.clone())
    }
}
