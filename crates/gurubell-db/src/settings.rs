//! Raw access to the `settings` table.
//!
//! Values are stored as JSON text so booleans and strings round-trip with
//! their type.

use crate::error::{DatabaseError, Result};
use serde_json::Value;
use sqlx::SqlitePool;

/// Insert or replace a setting.
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &Value) -> Result<()> {
    let value_str = serde_json::to_string(value)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

    sqlx::query(
        r"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        ",
    )
    .bind(key)
    .bind(value_str)
    .execute(pool)
    .await?;

    Ok(())
}

/// Read a setting, `None` if it was never written.
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<Value>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    row.map(|(value_str,)| {
        serde_json::from_str(&value_str)
            .map_err(|e| DatabaseError::SerializationError(format!("setting '{key}': {e}")))
    })
    .transpose()
}

/// Remove a setting. Removing a missing key is not an error.
pub async fn delete_setting(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Database;
    use serde_json::json;

    async fn create_test_db() -> Database {
        let db = Database::new(":memory:").await.expect("create test database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    #[tokio::test]
    async fn test_set_and_get_setting() {
        let db = create_test_db().await;
        let pool = db.pool();

        set_setting(pool, "soundEnabled", &json!(false)).await.unwrap();
        let retrieved = get_setting(pool, "soundEnabled").await.unwrap();
        assert_eq!(retrieved, Some(json!(false)));
    }

    #[tokio::test]
    async fn test_get_nonexistent_setting() {
        let db = create_test_db().await;
        let result = get_setting(db.pool(), "does_not_exist").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_overwrite_setting() {
        let db = create_test_db().await;
        let pool = db.pool();

        set_setting(pool, "bearerToken", &json!("first")).await.unwrap();
        set_setting(pool, "bearerToken", &json!("second")).await.unwrap();

        let retrieved = get_setting(pool, "bearerToken").await.unwrap();
        assert_eq!(retrieved, Some(json!("second")));
    }

    #[tokio::test]
    async fn test_delete_setting() {
        let db = create_test_db().await;
        let pool = db.pool();

        set_setting(pool, "bearerToken", &json!("abc")).await.unwrap();
        delete_setting(pool, "bearerToken").await.unwrap();
        assert_eq!(get_setting(pool, "bearerToken").await.unwrap(), None);

        delete_setting(pool, "bearerToken").await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_value_is_an_error() {
        let db = create_test_db().await;
        sqlx::query("INSERT INTO settings (key, value) VALUES ('broken', '{not json')")
            .execute(db.pool())
            .await
            .unwrap();

        let err = get_setting(db.pool(), "broken").await.unwrap_err();
        assert!(matches!(err, DatabaseError::SerializationError(_)));
    }
}
