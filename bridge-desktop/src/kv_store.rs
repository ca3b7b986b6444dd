//! Key-value storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::KeyValueStore,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
"#;

/// SQLite-backed key-value store
///
/// One row per key; values are stored verbatim. Writes are upserts so a
/// `set` on an existing key replaces its value and bumps `updated_at`.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Open (or create) a store backed by the database file at `db_path`.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::Storage(format!("Failed to connect to DB: {}", e)))?;

        Self::create_table(&pool).await?;
        debug!(path = ?db_path, "Initialized key-value store");

        Ok(Self { pool })
    }

    /// Create an in-memory store (for testing)
    ///
    /// Limited to a single connection: every SQLite `:memory:` connection
    /// opens its own private database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::Storage(format!("Failed to connect to DB: {}", e)))?;

        Self::create_table(&pool).await?;
        Ok(Self { pool })
    }

    async fn create_table(pool: &SqlitePool) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(pool)
            .await
            .map_err(|e| BridgeError::Storage(format!("Failed to create table: {}", e)))?;
        Ok(())
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::Storage(format!("Failed to read '{}': {}", key, e)))?;

        Ok(row.map(|row| row.get(0)))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Self::now())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::Storage(format!("Failed to write '{}': {}", key, e)))?;

        debug!(key = key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::Storage(format!("Failed to remove '{}': {}", key, e)))?;

        debug!(key = key, "Removed value");
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::Storage(format!("Failed to list keys: {}", e)))?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| BridgeError::Storage(format!("Failed to begin transaction: {}", e)))?;

        for key in keys {
            sqlx::query("DELETE FROM kv_store WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    BridgeError::Storage(format!("Failed to remove '{}': {}", key, e))
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| BridgeError::Storage(format!("Failed to commit: {}", e)))?;

        debug!(count = keys.len(), "Removed values");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_remove() {
        let store = SqliteKeyValueStore::in_memory().await.unwrap();

        assert_eq!(store.get("@frequency_favorites").await.unwrap(), None);

        store.set("@frequency_favorites", "[]").await.unwrap();
        assert_eq!(
            store.get("@frequency_favorites").await.unwrap(),
            Some("[]".to_string())
        );

        store.set("@frequency_favorites", "[1]").await.unwrap();
        assert_eq!(
            store.get("@frequency_favorites").await.unwrap(),
            Some("[1]".to_string())
        );

        store.remove("@frequency_favorites").await.unwrap();
        assert_eq!(store.get("@frequency_favorites").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_keys_sorted() {
        let store = SqliteKeyValueStore::in_memory().await.unwrap();

        store.set("b", "2").await.unwrap();
        store.set("a", "1").await.unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_remove_many_in_transaction() {
        let store = SqliteKeyValueStore::in_memory().await.unwrap();

        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("c", "3").await.unwrap();

        store.remove_many(&["a", "c", "missing"]).await.unwrap();
        assert_eq!(store.list_keys().await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = std::env::temp_dir().join(format!("kv-store-test-{}", std::process::id()));
        let path = dir.join("nested").join("store.db");

        {
            let store = SqliteKeyValueStore::new(path.clone()).await.unwrap();
            store.set("@app_settings", "{}").await.unwrap();
        }

        let reopened = SqliteKeyValueStore::new(path).await.unwrap();
        assert_eq!(
            reopened.get("@app_settings").await.unwrap(),
            Some("{}".to_string())
        );

        let _ = std::fs::remove_dir_all(dir);
    }
}
