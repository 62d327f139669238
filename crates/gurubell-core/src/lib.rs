//! Gurubell Core - Foundation crate for the Gurubell job watcher.
//!
//! This crate provides the shared job types, the events emitted by the poll
//! scheduler, error handling, and configuration management that all other
//! Gurubell crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Job records, the bearer token newtype and notification preferences
//! - [`events`] - Events emitted towards the UI layer and the notification dispatcher
//!
//! # Example
//!
//! ```rust
//! use gurubell_core::{AppConfig, BearerToken};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(config.polling.interval_secs, 5);
//!
//! let token = BearerToken::new("abc123")?;
//! assert_eq!(token.expose(), "abc123");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod events;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, NotificationsConfig, PollingConfig, RemindersConfig, SourceConfig, StorageConfig,
};
pub use error::{ConfigError, ConfigResult, GuruError, Result};
pub use events::{NewJobsPayload, TokenExpiredPayload, TokenReminderPayload, WatchEvent};
pub use types::{BearerToken, JobRecord, JobSet, NotificationPreferences, ProjectId, TokenValidity};
