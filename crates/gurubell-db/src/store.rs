//! Key-value settings store and the typed settings built on it.
//!
//! The application only talks to [`SettingsStore`]; the `SQLite` table is one
//! implementation, an in-memory map is the other.

use crate::error::Result;
use crate::settings::{delete_setting, get_setting, set_setting};
use crate::Database;
use async_trait::async_trait;
use gurubell_core::{BearerToken, NotificationPreferences};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Key of the stored bearer token.
pub const KEY_BEARER_TOKEN: &str = "bearerToken";
/// Key of the "system notifications" toggle.
pub const KEY_SYSTEM_NOTIFICATIONS: &str = "systemNotifications";
/// Key of the "sound" toggle.
pub const KEY_SOUND_ENABLED: &str = "soundEnabled";
/// Key of the "show job titles" toggle.
pub const KEY_SHOW_JOB_TITLES: &str = "showJobTitles";

/// Opaque key-value persistence.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a value, `None` if never written.
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    /// Insert or replace a value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
    /// Remove a value.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Settings store backed by the `settings` table.
#[derive(Debug)]
pub struct SqliteSettingsStore {
    db: Database,
}

impl SqliteSettingsStore {
    /// Wrap a database whose migrations have run.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The wrapped database.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        get_setting(self.db.pool(), key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        set_setting(self.db.pool(), key, &value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        delete_setting(self.db.pool(), key).await
    }
}

/// Non-persistent settings store, used by tests and `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemorySettingsStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

/// Load the stored token. Missing, empty or non-string values yield `None`.
pub async fn load_token(store: &dyn SettingsStore) -> Result<Option<BearerToken>> {
    Ok(match store.get(KEY_BEARER_TOKEN).await? {
        Some(Value::String(raw)) => BearerToken::new(raw).ok(),
        Some(other) => {
            tracing::warn!(kind = value_kind(&other), "Ignoring non-string bearer token");
            None
        }
        None => None,
    })
}

/// Persist `token`, or clear the stored token when `None`.
pub async fn save_token(store: &dyn SettingsStore, token: Option<&BearerToken>) -> Result<()> {
    match token {
        Some(token) => {
            store
                .set(KEY_BEARER_TOKEN, Value::String(token.expose().to_string()))
                .await
        }
        None => store.delete(KEY_BEARER_TOKEN).await,
    }
}

/// Load notification preferences; each missing toggle defaults to on.
pub async fn load_preferences(store: &dyn SettingsStore) -> Result<NotificationPreferences> {
    let defaults = NotificationPreferences::default();
    Ok(NotificationPreferences {
        system_notifications_enabled: load_flag(
            store,
            KEY_SYSTEM_NOTIFICATIONS,
            defaults.system_notifications_enabled,
        )
        .await?,
        sound_enabled: load_flag(store, KEY_SOUND_ENABLED, defaults.sound_enabled).await?,
        show_job_titles: load_flag(store, KEY_SHOW_JOB_TITLES, defaults.show_job_titles).await?,
    })
}

/// Persist all three notification toggles.
pub async fn save_preferences(
    store: &dyn SettingsStore,
    preferences: &NotificationPreferences,
) -> Result<()> {
    store
        .set(
            KEY_SYSTEM_NOTIFICATIONS,
            Value::Bool(preferences.system_notifications_enabled),
        )
        .await?;
    store
        .set(KEY_SOUND_ENABLED, Value::Bool(preferences.sound_enabled))
        .await?;
    store
        .set(KEY_SHOW_JOB_TITLES, Value::Bool(preferences.show_job_titles))
        .await
}

async fn load_flag(store: &dyn SettingsStore, key: &str, default: bool) -> Result<bool> {
    Ok(match store.get(key).await? {
        Some(Value::Bool(flag)) => flag,
        Some(other) => {
            tracing::warn!(key, kind = value_kind(&other), "Ignoring non-boolean setting");
            default
        }
        None => default,
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
