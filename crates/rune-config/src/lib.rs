//! Rune Draw configuration system
//!
//! This crate provides centralized configuration for the list transition
//! coordinator, loading settings from `rune.toml` with environment variable
//! overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors produced while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid TOML for [`RuneConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuneConfig {
    /// Per-category transition timing
    pub transitions: TransitionConfig,
    /// Consistency checking and diagnostics
    pub diagnostics: DiagnosticsConfig,
}

/// Transition durations in milliseconds, one per animation category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransitionConfig {
    /// Fade-in duration for inserted items
    pub insert_ms: u64,
    /// Fade-out duration for removed items
    pub remove_ms: u64,
    /// Slide duration for items that changed position
    pub reposition_ms: u64,
    /// Cross-fade duration for replaced items
    pub replace_ms: u64,
}

/// Diagnostics configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Panic on active-set consistency violations even in release builds.
    ///
    /// The coordinator cancels tweens synchronously, so a violation can only
    /// come from a tween driver or hook that breaks the lifecycle contract.
    pub strict_consistency: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            insert_ms: 120,
            remove_ms: 150,
            reposition_ms: 150,
            replace_ms: 250,
        }
    }
}

impl TransitionConfig {
    pub fn insert_duration(&self) -> Duration {
        Duration::from_millis(self.insert_ms)
    }

    pub fn remove_duration(&self) -> Duration {
        Duration::from_millis(self.remove_ms)
    }

    pub fn reposition_duration(&self) -> Duration {
        Duration::from_millis(self.reposition_ms)
    }

    pub fn replace_duration(&self) -> Duration {
        Duration::from_millis(self.replace_ms)
    }
}

impl RuneConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the rune.toml configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from the default location (rune.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        let millis = |name: &str| std::env::var(name).ok().and_then(|v| v.parse::<u64>().ok());

        if let Some(ms) = millis("RUNE_INSERT_MS") {
            self.transitions.insert_ms = ms;
        }
        if let Some(ms) = millis("RUNE_REMOVE_MS") {
            self.transitions.remove_ms = ms;
        }
        if let Some(ms) = millis("RUNE_REPOSITION_MS") {
            self.transitions.reposition_ms = ms;
        }
        if let Some(ms) = millis("RUNE_REPLACE_MS") {
            self.transitions.replace_ms = ms;
        }

        if let Ok(val) = std::env::var("RUNE_STRICT_CONSISTENCY") {
            self.diagnostics.strict_consistency = val == "1" || val.eq_ignore_ascii_case("true");
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
