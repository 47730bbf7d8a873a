//! Storage trait definitions
//!
//! Defines the abstract durable-store interface a pool registry saves
//! through, with three concrete backends: SQLite, a directory of JSON
//! files, and a no-op sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// (De)serialize a `DateTime<Utc>` as an RFC 3339 string, since chrono's
/// `serde` feature is not part of the dependency set.
mod rfc3339 {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("io error: {0}")]
    Io(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The durable representation of a pool, mirroring the registry's in-memory
/// view. Field names and casing (`Name`, `Template`, `Used`, `Max`,
/// `Closed`, `LastMint`) are fixed since this type doubles as the JSON body
/// for `GET /pools/{poolname}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolInfo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Template")]
    pub template: String,
    #[serde(rename = "Used")]
    pub used: i64,
    #[serde(rename = "Max")]
    pub max: i64,
    #[serde(rename = "Closed")]
    pub closed: bool,
    #[serde(rename = "LastMint", with = "rfc3339")]
    pub last_mint: DateTime<Utc>,
}

/// Durable pool store interface.
///
/// Implementations:
/// - `SqlitePoolStore` - relational storage via r2d2 + rusqlite
/// - `DirectoryPoolStore` - one JSON file per pool under a root directory
/// - `NullPoolStore` - discards writes, returns no pools on load
#[async_trait]
pub trait PoolStore: Send + Sync {
    /// Persist (insert or overwrite) one pool's durable state.
    async fn save_pool(&self, info: &PoolInfo) -> StorageResult<()>;

    /// Load every pool known to the store, for registry startup.
    async fn load_all_pools(&self) -> StorageResult<Vec<PoolInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_info_serializes_with_capitalized_field_names() {
        let info = PoolInfo {
            name: "test".to_string(),
            template: ".sddd".to_string(),
            used: 3,
            max: 1000,
            closed: false,
            last_mint: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"Name\":\"test\""));
        assert!(json.contains("\"Template\":\".sddd\""));
        assert!(json.contains("\"Used\":3"));
        assert!(json.contains("\"Max\":1000"));
        assert!(json.contains("\"Closed\":false"));
    }
}
