//! Error types for SchoolFinder
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for SchoolFinder operations
///
/// Covers configuration loading, key-value backend access, serialization
/// of persisted conversations, and interactive command handling.
#[derive(Error, Debug)]
pub enum SchoolfinderError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value backend errors (open, read, write, flush)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A write would exceed the backend's byte quota
    #[error("Storage quota exceeded: limit={limit} bytes, requested={requested} bytes")]
    QuotaExceeded {
        /// The configured quota in bytes
        limit: usize,
        /// Size the backend would have held after the write
        requested: usize,
    },

    /// Interactive or CLI command errors
    #[error("Command error: {0}")]
    Command(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for SchoolFinder operations
///
/// Uses `anyhow::Error` so callers can attach context while propagating.
pub type Result<T> = anyhow::Result<T>;
