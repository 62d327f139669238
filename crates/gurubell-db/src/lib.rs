//! Gurubell Database Layer
//!
//! Persists the bearer token and the notification toggles in a small `SQLite`
//! key-value table. Migrations are embedded with `SQLx` and run on open.
//!
//! # Example
//!
//! ```ignore
//! use gurubell_db::{load_preferences, Database, SqliteSettingsStore};
//!
//! let db = Database::open("gurubell.db").await?;
//! let store = SqliteSettingsStore::new(db);
//! let prefs = load_preferences(&store).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod settings;
pub mod store;

// Re-export commonly used types
pub use connection::SettingsPool;
pub use error::{DatabaseError, Result};
pub use store::{
    load_preferences, load_token, save_preferences, save_token, MemorySettingsStore,
    SettingsStore, SqliteSettingsStore,
};

use std::path::Path;

/// Settings database: a connection pool plus its migrations.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SettingsPool,
}

impl Database {
    /// Open the database without running migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = SettingsPool::new(path).await?;
        Ok(Self { pool })
    }

    /// Open the database and bring its schema up to date.
    ///
    /// # Errors
    /// Returns `DatabaseError` if opening or migrating fails.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::new(path).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending database migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool.pool()).await
    }

    /// Version of the newest applied migration.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(self.pool.pool()).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
