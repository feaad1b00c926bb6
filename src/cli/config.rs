//! Configuration management for PandemicNet
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.pandemicnet/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assistant::AssistantConfig;
use crate::cli::Verbosity;
use crate::errors::{AssistantError, Result};

/// Longest simulated reply delay accepted from config
pub const MAX_RESPONSE_DELAY_MS: u64 = 60_000;

/// Complete configuration for PandemicNet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assistant: AssistantSection,
    pub display: DisplayConfig,
    pub paths: PathsConfig,
}

/// Assistant behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSection {
    pub response_delay_ms: u64,
    pub greeting: bool,
}

/// Terminal display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color_output: bool,
    pub show_spinner: bool,
    pub verbosity: String,
}

/// File system paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: String,
}

impl Default for AssistantSection {
    fn default() -> Self {
        Self {
            response_delay_ms: 1000,
            greeting: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: true,
            show_spinner: true,
            verbosity: "normal".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: "~/.pandemicnet".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AssistantError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| AssistantError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Config::default())
    }

    /// `~/.pandemicnet/config.toml`, when a home directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pandemicnet").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.assistant.response_delay_ms > MAX_RESPONSE_DELAY_MS {
            return Err(AssistantError::ConfigError(format!(
                "response_delay_ms must be at most {}",
                MAX_RESPONSE_DELAY_MS
            )));
        }

        if Verbosity::from_name(&self.display.verbosity).is_none() {
            return Err(AssistantError::ConfigError(format!(
                "Invalid verbosity level: {}",
                self.display.verbosity
            )));
        }

        if self.paths.state_dir.trim().is_empty() {
            return Err(AssistantError::ConfigError(
                "state_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AssistantError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AssistantError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AssistantError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as TOML for `pandemicnet config`
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AssistantError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get state directory path
    pub fn state_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.state_dir)
    }

    /// Key-value store file inside the state directory
    pub fn store_path(&self) -> PathBuf {
        self.state_dir().join("store.json")
    }

    /// REPL line history file inside the state directory
    pub fn history_path(&self) -> PathBuf {
        self.state_dir().join("history")
    }

    /// Verbosity from the config file; validated, so falls back only on bad input
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_name(&self.display.verbosity).unwrap_or(Verbosity::Normal)
    }

    /// Orchestrator settings, with an optional CLI delay override
    ///
    /// The delay is capped at [`MAX_RESPONSE_DELAY_MS`].
    pub fn to_assistant_config(&self, delay_override: Option<u64>) -> AssistantConfig {
        let delay_ms = delay_override
            .unwrap_or(self.assistant.response_delay_ms)
            .min(MAX_RESPONSE_DELAY_MS);
        AssistantConfig {
            response_delay: Duration::from_millis(delay_ms),
            greeting: self.assistant.greeting,
        }
    }
}
