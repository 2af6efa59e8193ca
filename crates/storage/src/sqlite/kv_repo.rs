use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{KeyValueStore, StorageError, StoredValue};

use super::SqliteRepository;

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteRepository {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT value
            FROM kv_entries
            WHERE key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row.try_get("value").map_err(ser)?;
        serde_json::from_str(&raw).map(Some).map_err(ser)
    }

    async fn set_many(&self, entries: &[(&str, StoredValue)]) -> Result<(), StorageError> {
        let updated_at = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for (key, value) in entries {
            let raw = serde_json::to_string(value).map_err(ser)?;
            sqlx::query(
                r"
                INSERT INTO kv_entries (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(*key)
            .bind(raw)
            .bind(updated_at.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for key in keys {
            sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
