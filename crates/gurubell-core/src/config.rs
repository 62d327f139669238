//! Configuration management for Gurubell.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/gurubell/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Job search endpoint settings
    pub source: SourceConfig,
    /// Poll timer settings
    pub polling: PollingConfig,
    /// Expired-token reminder settings
    pub reminders: RemindersConfig,
    /// Desktop alert settings
    pub notifications: NotificationsConfig,
    /// Settings store location
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if missing.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `GURUBELL_BASE_URL`: Override the job board base URL
    /// - `GURUBELL_POLL_INTERVAL_SECS`: Override the poll interval
    /// - `GURUBELL_DATABASE_PATH`: Override the settings database location
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `GURUBELL_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GURUBELL_BASE_URL") {
            if !val.trim().is_empty() {
                tracing::debug!("Override source.base_url from env: {}", val);
                self.source.base_url = val;
            }
        }

        if let Ok(val) = std::env::var("GURUBELL_POLL_INTERVAL_SECS") {
            if let Ok(secs) = val.parse() {
                self.polling.interval_secs = secs;
                tracing::debug!("Override polling.interval_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("GURUBELL_DATABASE_PATH") {
            tracing::debug!("Override storage.database_path from env: {}", val);
            self.storage.database_path = Some(PathBuf::from(val));
        }
    }

    /// Reject values that would make the watcher misbehave.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if self.polling.interval_secs == 0 {
            return Err(invalid("polling.interval_secs", "must be greater than zero"));
        }
        if self.reminders.cadence_minutes == 0 {
            return Err(invalid("reminders.cadence_minutes", "must be greater than zero"));
        }
        if self.notifications.preview_titles == 0 {
            return Err(invalid("notifications.preview_titles", "must be greater than zero"));
        }
        if self.source.base_url.trim().is_empty() {
            return Err(invalid("source.base_url", "must not be empty"));
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> ConfigResult<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/gurubell/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/gurubell`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Resolve where the settings database lives.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("settings.db")),
        }
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "gurubell", "gurubell").ok_or(ConfigError::NoConfigDir)
}

/// Job search endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Site root, the search endpoint is `<base_url>/api/search/job`
    pub base_url: String,
    /// Value of the `Category.Id` query parameter
    pub category_id: u32,
    /// Only records with this `CategoryName` are surfaced
    pub category_name: String,
    /// Value of the `SortOrder` query parameter
    pub sort_order: String,
    /// Value of the `Page` query parameter
    pub page: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl SourceConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.guru.com".to_string(),
            category_id: 1,
            category_name: "Programming & Development".to_string(),
            sort_order: "recent".to_string(),
            page: 1,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

/// Poll timer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between ticks
    pub interval_secs: u64,
}

impl PollingConfig {
    /// Tick period as a `Duration`.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

/// Expired-token reminder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindersConfig {
    /// Delay before the first reminder after an expiry
    pub initial_delay_minutes: u64,
    /// Delay between subsequent reminders
    pub cadence_minutes: u64,
    /// Delay before the first reminder after "Remind Me Later"
    pub snooze_minutes: u64,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            initial_delay_minutes: 15,
            cadence_minutes: 15,
            snooze_minutes: 30,
        }
    }
}

/// Desktop alert settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Number of titles listed in a new-jobs alert
    pub preview_titles: usize,
    /// Auto-dismiss delay of new-jobs alerts
    pub job_alert_timeout_secs: u64,
    /// Auto-dismiss delay of the token saved confirmation
    pub token_saved_timeout_secs: u64,
    /// Auto-dismiss delay of token reminders
    pub reminder_timeout_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            preview_titles: 3,
            job_alert_timeout_secs: 10,
            token_saved_timeout_secs: 5,
            reminder_timeout_secs: 8,
        }
    }
}

/// Settings store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file holding the key-value settings; defaults to `<data_dir>/settings.db`
    pub database_path: Option<PathBuf>,
}
