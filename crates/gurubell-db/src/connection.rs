//! Connection pool management.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// `SQLite` connection pool for the settings database.
///
/// `:memory:` opens a private in-memory database shared by all connections
/// of the pool.
#[derive(Debug, Clone)]
pub struct SettingsPool {
    pool: Pool<Sqlite>,
}

impl SettingsPool {
    /// Open (or create) the database at `path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the path is not UTF-8, the directory cannot
    /// be created, or the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_str().ok_or_else(|| {
            DatabaseError::Open("invalid database path: not valid UTF-8".to_string())
        })?;

        if path_str != ":memory:" {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to open {path_str}: {e}")))?;

        tracing::info!("Settings database opened at {}", path_str);

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Settings database closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_pool() {
        let pool = SettingsPool::new(":memory:").await.expect("open pool");
        sqlx::query("SELECT 1")
            .execute(pool.pool())
            .await
            .expect("query");
        pool.close().await;
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("gurubell.db");

        let pool = SettingsPool::new(&path).await.expect("open pool");
        assert!(path.exists());
        pool.close().await;
    }
}
