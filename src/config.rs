//! Configuration management for SchoolFinder
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SchoolfinderError};
use crate::storage::conversations::{
    StoreSettings, DEFAULT_MAX_CONVERSATIONS, DEFAULT_PREVIEW_MAX_CHARS, DEFAULT_STORAGE_KEY,
    DEFAULT_TITLE_MAX_CHARS,
};
use crate::view_mode::ViewMode;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for SchoolFinder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Conversation storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Conversation storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the sled database; defaults to the platform data dir
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Key of the slot holding the conversation collection
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Retention cap applied when a conversation is created
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,

    /// Title truncation length in characters
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    /// Preview truncation length in characters
    #[serde(default = "default_preview_max_chars")]
    pub preview_max_chars: usize,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_max_conversations() -> usize {
    DEFAULT_MAX_CONVERSATIONS
}

fn default_title_max_chars() -> usize {
    DEFAULT_TITLE_MAX_CHARS
}

fn default_preview_max_chars() -> usize {
    DEFAULT_PREVIEW_MAX_CHARS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            storage_key: default_storage_key(),
            max_conversations: default_max_conversations(),
            title_max_chars: default_title_max_chars(),
            preview_max_chars: default_preview_max_chars(),
        }
    }
}

impl StorageConfig {
    /// Store tunables derived from this configuration
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            storage_key: self.storage_key.clone(),
            max_conversations: self.max_conversations,
            title_max_chars: self.title_max_chars,
            preview_max_chars: self.preview_max_chars,
        }
    }
}

/// Interactive chat configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Mode shown at startup: "assistant" or "classic"
    #[serde(default = "default_mode")]
    pub default_mode: String,

    /// Simulated assistant response delay (milliseconds)
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,

    /// First assistant message of every new conversation
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Reply produced by the built-in responder
    #[serde(default = "default_reply")]
    pub reply: String,
}

fn default_mode() -> String {
    "assistant".to_string()
}

fn default_response_delay_ms() -> u64 {
    1000
}

fn default_welcome_message() -> String {
    "Welcome to SchoolFinder Q&A! I'm here to answer your questions about finding the right \
     school for your child. Ask me anything to get started."
        .to_string()
}

fn default_reply() -> String {
    "I'd be happy to help you find the right school. Could you tell me more about the area, \
     age group, or type of school you're looking for?"
        .to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            response_delay_ms: default_response_delay_ms(),
            welcome_message: default_welcome_message(),
            reply: default_reply(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(SchoolfinderError::Io)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config = serde_yaml::from_str(&contents)
            .map_err(SchoolfinderError::Yaml)
            .with_context(|| format!("Failed to parse config {}", path))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(path) = std::env::var("SCHOOLFINDER_STORE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(key) = std::env::var("SCHOOLFINDER_STORAGE_KEY") {
            self.storage.storage_key = key;
        }

        if let Ok(max) = std::env::var("SCHOOLFINDER_MAX_CONVERSATIONS") {
            if let Ok(value) = max.parse() {
                self.storage.max_conversations = value;
            } else {
                tracing::warn!("Invalid SCHOOLFINDER_MAX_CONVERSATIONS: {}", max);
            }
        }

        if let Ok(delay) = std::env::var("SCHOOLFINDER_RESPONSE_DELAY_MS") {
            if let Ok(value) = delay.parse() {
                self.chat.response_delay_ms = value;
            } else {
                tracing::warn!("Invalid SCHOOLFINDER_RESPONSE_DELAY_MS: {}", delay);
            }
        }

        if let Ok(mode) = std::env::var("SCHOOLFINDER_DEFAULT_MODE") {
            self.chat.default_mode = mode;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.store_path {
            self.storage.path = Some(path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.storage.storage_key.trim().is_empty() {
            return Err(
                SchoolfinderError::Config("storage.storage_key cannot be empty".to_string()).into(),
            );
        }

        if self.storage.max_conversations == 0 {
            return Err(SchoolfinderError::Config(
                "storage.max_conversations must be greater than 0".to_string(),
            )
            .into());
        }

        if self.storage.title_max_chars == 0 || self.storage.preview_max_chars == 0 {
            return Err(SchoolfinderError::Config(
                "storage title/preview lengths must be greater than 0".to_string(),
            )
            .into());
        }

        ViewMode::parse_str(&self.chat.default_mode).map_err(SchoolfinderError::Config)?;

        if self.chat.response_delay_ms > 60_000 {
            return Err(SchoolfinderError::Config(
                "chat.response_delay_ms must be less than or equal to 60000".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
