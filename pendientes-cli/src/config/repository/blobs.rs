//! Key-value blob storage
//!
//! The item collection is persisted as one serialized value under a named
//! slot. Reads and writes always move the whole value.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

/// Whole-value storage keyed by slot name
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a slot, `None` if it was never written
    async fn get(&self, slot: &str) -> Result<Option<String>>;

    /// Replace a slot's value
    async fn put(&self, slot: &str, value: &str) -> Result<()>;
}

/// SQLite-backed blob store
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    /// Open (creating if needed) a database file
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        let store = Self { pool };
        store.migrate().await?;
        log::debug!("Opened blob store at {}", path.display());
        Ok(store)
    }

    /// Private in-memory database, gone when the store is dropped
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let options: SqliteConnectOptions = "sqlite::memory:".parse()?;

        // A single connection that never expires keeps the database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blobs (
                slot TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create blobs table")?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn get(&self, slot: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM blobs WHERE slot = ?")
            .bind(slot)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read slot '{}'", slot))?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn put(&self, slot: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO blobs (slot, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(slot) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(slot)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write slot '{}'", slot))?;
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryBlobStore;
