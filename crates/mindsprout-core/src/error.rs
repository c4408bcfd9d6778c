//! Core error types for mindsprout-core.
//!
//! This module defines the error hierarchy using thiserror for better
//! error handling and reporting across the library.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for mindsprout-core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A session was recorded with a non-positive duration.
    /// Rejected at the API boundary, never retried.
    #[error("Invalid session duration: {minutes} minutes (must be > 0)")]
    InvalidDuration { minutes: u64 },

    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Store-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The shared store could not be opened. The gateway handles this by
    /// falling back to a process-local store (degraded mode).
    #[error("Shared store unavailable at {path}: {message}")]
    Unavailable { path: PathBuf, message: String },

    /// A persisted record failed to decode. Readers skip the record and
    /// continue with the remaining valid data.
    #[error("Corrupt record under key '{key}': {message}")]
    CorruptRecord { key: String, message: String },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A value could not be serialized for storage
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Milestone threshold tables must be non-empty, strictly increasing,
    /// and start at zero minutes.
    #[error("Invalid milestone table: {0}")]
    InvalidMilestones(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError::Store(err.into())
    }
}

/// Result type alias for EngineError
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
