//! Core error types for eyerest-core.
//!
//! Errors are grouped by the concern that raises them. Alert errors are
//! produced by the audio/haptic/visual capabilities and never leave the
//! alert emitter; configuration and validation errors surface to the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for eyerest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Alert capability errors
    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON rendering errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration directory could not be determined or created
    #[error("Configuration directory unavailable at {path}: {message}")]
    DirUnavailable { path: PathBuf, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Errors raised by the alert capabilities (audio, haptics, indicator).
#[derive(Error, Debug)]
pub enum AlertError {
    /// The capability does not exist in this environment
    #[error("{capability} is not available: {message}")]
    Unavailable {
        capability: &'static str,
        message: String,
    },

    /// The audio resource is suspended and could not be resumed
    #[error("audio output is suspended")]
    Suspended,

    /// Starting or stopping playback failed
    #[error("playback failed: {0}")]
    Playback(String),

    /// IO failure while talking to the capability
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A countdown string is not in `mm:ss` form
    #[error("Invalid clock '{input}': {reason}")]
    InvalidClock { input: String, reason: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
