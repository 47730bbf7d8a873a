//! Directory-of-JSON-files pool store
//!
//! Serializes each pool as one JSON file under a root directory. The only
//! subtlety worth keeping is name sanitization, since a pool name is
//! free-form user input and must not be allowed to escape the root via
//! `..` or `/`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::traits::{PoolInfo, PoolStore, StorageError, StorageResult};

/// Stores one pool per JSON file under `root`.
pub struct DirectoryPoolStore {
    root: PathBuf,
}

impl DirectoryPoolStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(sanitize_name(name))
    }
}

/// Replace path-escaping sequences with `_` so a pool name can never write
/// outside the store's root directory.
fn sanitize_name(name: &str) -> String {
    name.replace("..", "_").replace('/', "_")
}

#[async_trait]
impl PoolStore for DirectoryPoolStore {
    async fn save_pool(&self, info: &PoolInfo) -> StorageResult<()> {
        let path = self.path_for(&info.name);
        let json = serde_json::to_string_pretty(info)
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn load_all_pools(&self) -> StorageResult<Vec<PoolInfo>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| StorageError::Io(e.to_string()))?;

        let mut pools = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::Io(e.to_string()))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            pools.push(load_one(&entry.path())?);
        }
        Ok(pools)
    }
}

fn load_one(path: &Path) -> StorageResult<PoolInfo> {
    let raw = std::fs::read_to_string(path).map_err(|e| StorageError::Io(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| StorageError::InvalidData(e.to_string()))
}
