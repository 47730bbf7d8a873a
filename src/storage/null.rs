//! No-op pool store
//!
//! Discards writes and reports no pools on load. Useful for local
//! development and for tests that don't care about durability.

use async_trait::async_trait;

use super::traits::{PoolInfo, PoolStore, StorageResult};

#[derive(Debug, Default)]
pub struct NullPoolStore;

#[async_trait]
impl PoolStore for NullPoolStore {
    async fn save_pool(&self, info: &PoolInfo) -> StorageResult<()> {
        tracing::debug!(pool = %info.name, "save (null store)");
        Ok(())
    }

    async fn load_all_pools(&self) -> StorageResult<Vec<PoolInfo>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn save_succeeds_and_load_returns_nothing() {
        let store = NullPoolStore;
        let info = PoolInfo {
            name: "x".to_string(),
            template: ".sddd".to_string(),
            used: 0,
            max: 1000,
            closed: false,
            last_mint: Utc::now(),
        };
        store.save_pool(&info).await.unwrap();
        assert!(store.load_all_pools().await.unwrap().is_empty());
    }
}
