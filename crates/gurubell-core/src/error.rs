//! Core error types for the Gurubell application.
//!
//! This module defines the central error type shared by the subsystems and the
//! configuration error type.

use thiserror::Error;

/// Central error type for Gurubell operations.
#[derive(Error, Debug)]
pub enum GuruError {
    /// An operation that needs a bearer token was called without one.
    ///
    /// Raised synchronously, before any network call is made.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Configuration errors (file loading, parsing, validation)
    #[error("config file error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `GuruError`.
pub type Result<T> = std::result::Result<T, GuruError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
