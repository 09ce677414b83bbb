//! Session configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! [flash]
//! namespace = "flash"
//! new_key = "new"
//! old_key = "old"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::SessionPath;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Flash bookkeeping configuration
    #[serde(default)]
    pub flash: FlashConfig,
}

/// Where the flash registry lives inside the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashConfig {
    /// Reserved top-level namespace (default: "flash")
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Key under the namespace holding keys flashed this request (default: "new")
    #[serde(default = "default_new_key")]
    pub new_key: String,

    /// Key under the namespace holding keys expiring after this request (default: "old")
    #[serde(default = "default_old_key")]
    pub old_key: String,
}

fn default_namespace() -> String {
    "flash".to_string()
}

fn default_new_key() -> String {
    "new".to_string()
}

fn default_old_key() -> String {
    "old".to_string()
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            new_key: default_new_key(),
            old_key: default_old_key(),
        }
    }
}

impl FlashConfig {
    /// Full dotted path of the "new" list, e.g. `flash.new`.
    pub fn new_path(&self) -> String {
        format!("{}.{}", self.namespace, self.new_key)
    }

    /// Full dotted path of the "old" list, e.g. `flash.old`.
    pub fn old_path(&self) -> String {
        format!("{}.{}", self.namespace, self.old_key)
    }
}

impl SessionConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Set the flash configuration
    pub fn with_flash(mut self, flash: FlashConfig) -> Self {
        self.flash = flash;
        self
    }

    /// Set the reserved flash namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.flash.namespace = namespace.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        self.flash.validate()
    }
}

impl FlashConfig {
    /// Check that the namespace is a path and both keys are distinct single segments.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if SessionPath::parse(&self.namespace).is_err() {
            return Err(ConfigValidationError::InvalidValue {
                field: "flash.namespace".into(),
                message: "must be a non-empty dotted path".into(),
            });
        }

        for (field, key) in [("flash.new_key", &self.new_key), ("flash.old_key", &self.old_key)] {
            if key.is_empty() || key.contains('.') {
                return Err(ConfigValidationError::InvalidValue {
                    field: field.into(),
                    message: "must be a single non-empty segment".into(),
                });
            }
        }

        if self.new_key == self.old_key {
            return Err(ConfigValidationError::InvalidValue {
                field: "flash.old_key".into(),
                message: "must differ from flash.new_key".into(),
            });
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.flash.namespace, "flash");
        assert_eq!(config.flash.new_path(), "flash.new");
        assert_eq!(config.flash.old_path(), "flash.old");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = SessionConfig::from_toml_str("[flash]\nnamespace = \"_flash\"\n").unwrap();
        assert_eq!(config.flash.new_path(), "_flash.new");
        assert_eq!(config.flash.old_key, "old");
    }

    #[test]
    fn test_config_validation() {
        let mut config = SessionConfig::default().with_namespace("");
        assert!(config.validate().is_err());

        config = config.with_namespace("app.flash");
        assert!(config.validate().is_ok());

        config.flash.old_key = "new".into();
        assert!(config.validate().is_err());

        config.flash.old_key = "a.b".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(SessionConfig::from_toml_str("[flash]\nnew_key = \"\"\n").is_err());
        assert!(SessionConfig::from_toml_str("[flash\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");

        let loaded = SessionConfig::load(&path).expect("Failed to load default config");
        assert_eq!(loaded, SessionConfig::default());

        std::fs::write(&path, "[flash]\nold_key = \"expiring\"\n").unwrap();
        let loaded = SessionConfig::load(&path).expect("Failed to load config");
        assert_eq!(loaded.flash.old_path(), "flash.expiring");
    }
}
