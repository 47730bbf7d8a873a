//! SQLite persistent storage for the pool registry
//!
//! Provides durable storage for pool state that survives service restarts.
//! Uses connection pooling via r2d2 for concurrent access. `save_pool`
//! attempts an `UPDATE` first and falls back to `INSERT` only when no row
//! was touched, so repeated saves of the same pool never race a
//! unique-constraint error.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use super::traits::{PoolInfo, PoolStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};

/// SQLite-backed pool store with connection pooling.
pub struct SqlitePoolStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqlitePoolStore {
    /// Open (or create) a database file and run migrations.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;
        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        self.pool
            .get()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn run_migrations(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS noids (
                name TEXT PRIMARY KEY,
                template TEXT NOT NULL,
                used INTEGER NOT NULL DEFAULT 0,
                max INTEGER NOT NULL DEFAULT -1,
                closed INTEGER NOT NULL DEFAULT 0,
                last_mint TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    fn row_to_info(row: &rusqlite::Row) -> rusqlite::Result<PoolInfo> {
        let last_mint_raw: String = row.get("last_mint")?;
        let last_mint = DateTime::parse_from_rfc3339(&last_mint_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(PoolInfo {
            name: row.get("name")?,
            template: row.get("template")?,
            used: row.get("used")?,
            max: row.get("max")?,
            closed: row.get::<_, i64>("closed")? != 0,
            last_mint,
        })
    }

    fn save_pool_sync(&self, info: &PoolInfo) -> StorageResult<()> {
        let conn = self.conn()?;
        let last_mint = info.last_mint.to_rfc3339();

        let updated = conn
            .execute(
                "UPDATE noids SET template = ?1, used = ?2, max = ?3, closed = ?4, last_mint = ?5 WHERE name = ?6",
                params![info.template, info.used, info.max, info.closed as i64, last_mint, info.name],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        if updated == 0 {
            conn.execute(
                "INSERT INTO noids (name, template, used, max, closed, last_mint) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![info.name, info.template, info.used, info.max, info.closed as i64, last_mint],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        Ok(())
    }

    fn load_all_pools_sync(&self) -> StorageResult<Vec<PoolInfo>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT name, template, used, max, closed, last_mint FROM noids")
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_info)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }
        Ok(out)
    }

    #[allow(dead_code)]
    fn get_by_name_sync(&self, name: &str) -> StorageResult<Option<PoolInfo>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT name, template, used, max, closed, last_mint FROM noids WHERE name = ?1",
            params![name],
            Self::row_to_info,
        )
        .optional()
        .map_err(|e| StorageError::Database(e.to_string()))
    }
}

#[async_trait]
impl PoolStore for SqlitePoolStore {
    async fn save_pool(&self, info: &PoolInfo) -> StorageResult<()> {
        self.save_pool_sync(info)
    }

    async fn load_all_pools(&self) -> StorageResult<Vec<PoolInfo>> {
        self.load_all_pools_sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> PoolInfo {
        PoolInfo {
            name: name.to_string(),
            template: ".sddd".to_string(),
            used: 0,
            max: 1000,
            closed: false,
            last_mint: Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = SqlitePoolStore::in_memory().unwrap();
        store.save_pool(&sample("alpha")).await.unwrap();

        let all = store.load_all_pools().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "alpha");
        assert_eq!(all[0].max, 1000);
    }

    #[tokio::test]
    async fn repeated_save_updates_in_place() {
        let store = SqlitePoolStore::in_memory().unwrap();
        let mut info = sample("beta");
        store.save_pool(&info).await.unwrap();

        info.used = 42;
        info.closed = true;
        store.save_pool(&info).await.unwrap();

        let all = store.load_all_pools().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].used, 42);
        assert!(all[0].closed);
    }

    #[tokio::test]
    async fn load_all_pools_returns_every_saved_pool() {
        let store = SqlitePoolStore::in_memory().unwrap();
        store.save_pool(&sample("one")).await.unwrap();
        store.save_pool(&sample("two")).await.unwrap();
        store.save_pool(&sample("three")).await.unwrap();

        let all = store.load_all_pools().await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
