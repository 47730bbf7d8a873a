//! Pool
//!
//! Wraps one minter with its bookkeeping fields: `closed`, `empty`,
//! `lastMint`, `name`, and a reference to the durable store used for its
//! snapshots. Every operation that reads or mutates a pool holds `state`'s
//! exclusive lock for the call's entire duration, including the store
//! write, using `tokio::sync::Mutex` so the guard can span the async store
//! call.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::minter::Minter;
use crate::storage::{PoolInfo, PoolStore};

/// Outcome of a mutating pool operation: the caller-visible result plus an
/// optional store error. A store failure never invalidates the in-memory
/// mutation — it is reported alongside it.
pub struct Mutation<T> {
    pub value: T,
    pub save_error: Option<String>,
}

/// A named minter plus the bookkeeping the registry and store need.
pub struct Pool {
    name: String,
    store: Arc<dyn PoolStore>,
    state: Mutex<PoolState>,
}

struct PoolState {
    minter: Minter,
    closed: bool,
    empty: bool,
    last_mint: chrono::DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SetClosedError {
    PoolEmpty,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MintError {
    PoolClosed,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AdvancePastError {
    InvalidId,
}

impl Pool {
    /// Construct a fresh pool from a template string. Returns `None` if the
    /// template fails to parse.
    pub fn new(name: impl Into<String>, template: &str, store: Arc<dyn PoolStore>) -> Option<Self> {
        let minter = Minter::new(template)?;
        Some(Self {
            name: name.into(),
            store,
            state: Mutex::new(PoolState {
                minter,
                closed: false,
                empty: false,
                last_mint: Utc::now(),
            }),
        })
    }

    /// Reconstruct a pool from a persisted `PoolInfo`, used during startup
    /// reload. The template string carries the saved position via its
    /// `+<position>` extension.
    pub fn from_info(info: &PoolInfo, store: Arc<dyn PoolStore>) -> Option<Self> {
        let minter = Minter::new(&info.template)?;
        let (used, max) = minter.count();
        Some(Self {
            name: info.name.clone(),
            store,
            state: Mutex::new(PoolState {
                minter,
                closed: info.closed,
                empty: max >= 0 && used == max,
                last_mint: info.last_mint,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot this pool's current state as a `PoolInfo`.
    pub async fn info(&self) -> PoolInfo {
        let guard = self.state.lock().await;
        Self::snapshot(&self.name, &guard)
    }

    fn snapshot(name: &str, state: &PoolState) -> PoolInfo {
        let (used, max) = state.minter.count();
        PoolInfo {
            name: name.to_string(),
            template: state.minter.render(),
            used,
            max,
            closed: state.closed,
            last_mint: state.last_mint,
        }
    }

    async fn save(&self, info: &PoolInfo) -> Option<String> {
        self.store.save_pool(info).await.err().map(|e| e.to_string())
    }

    /// Set the closed flag. Fails with `PoolEmpty` if a reopen was
    /// requested on an exhausted pool.
    pub async fn set_closed(&self, closed: bool) -> Result<Mutation<PoolInfo>, SetClosedError> {
        let mut guard = self.state.lock().await;
        if !closed && guard.empty {
            return Err(SetClosedError::PoolEmpty);
        }

        let mut save_error = None;
        if guard.closed != closed {
            guard.closed = closed;
            let snapshot = Self::snapshot(&self.name, &guard);
            save_error = self.save(&snapshot).await;
        }

        Ok(Mutation {
            value: Self::snapshot(&self.name, &guard),
            save_error,
        })
    }

    /// Mint up to `count` identifiers. Fails with `PoolClosed` if the pool
    /// is already closed.
    pub async fn mint(&self, count: usize) -> Result<Mutation<Vec<String>>, MintError> {
        let mut guard = self.state.lock().await;
        if guard.closed {
            return Err(MintError::PoolClosed);
        }

        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            let id = guard.minter.mint();
            if id.is_empty() {
                guard.empty = true;
                guard.closed = true;
                break;
            }
            result.push(id);
        }

        let mut save_error = None;
        if !result.is_empty() {
            guard.last_mint = Utc::now();
            let snapshot = Self::snapshot(&self.name, &guard);
            save_error = self.save(&snapshot).await;
        }

        Ok(Mutation {
            value: result,
            save_error,
        })
    }

    /// Resolve `id` to a sequence index and, if it is at or past the
    /// current position, advance past it. Fails with `InvalidId` if `id`
    /// does not validate against this pool's template.
    pub async fn advance_past(&self, id: &str) -> Result<Mutation<PoolInfo>, AdvancePastError> {
        let mut guard = self.state.lock().await;
        let idx = guard.minter.index(id);
        if idx < 0 {
            return Err(AdvancePastError::InvalidId);
        }

        let mut save_error = None;
        let (position, _) = guard.minter.count();
        if idx >= position {
            guard.minter.advance_to(idx + 1);
            guard.last_mint = Utc::now();
            let snapshot = Self::snapshot(&self.name, &guard);
            save_error = self.save(&snapshot).await;
        }

        Ok(Mutation {
            value: Self::snapshot(&self.name, &guard),
            save_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NullPoolStore;

    fn store() -> Arc<dyn PoolStore> {
        Arc::new(NullPoolStore)
    }

    #[tokio::test]
    async fn new_pool_starts_open_and_not_empty() {
        let p = Pool::new("abc", ".sddd", store()).unwrap();
        let info = p.info().await;
        assert_eq!(info.used, 0);
        assert!(!info.closed);
        assert_eq!(info.max, 1000);
    }

    #[tokio::test]
    async fn mint_produces_ids_and_saves() {
        let p = Pool::new("abc", ".sddd", store()).unwrap();
        let m = p.mint(5).await.unwrap();
        assert_eq!(m.value, vec!["000", "001", "002", "003", "004"]);
        assert!(m.save_error.is_none());
    }

    #[tokio::test]
    async fn mint_on_closed_pool_errors() {
        let p = Pool::new("abc", ".sddd", store()).unwrap();
        p.set_closed(true).await.unwrap();
        assert_eq!(p.mint(1).await.err(), Some(MintError::PoolClosed));
    }

    #[tokio::test]
    async fn exhaustion_closes_pool_permanently() {
        let p = Pool::new("abc", ".sdd", store()).unwrap();
        p.mint(100).await.unwrap();
        let m = p.mint(1).await.unwrap();
        assert!(m.value.is_empty());
        assert!(p.info().await.closed);

        assert_eq!(
            p.set_closed(false).await.err(),
            Some(SetClosedError::PoolEmpty)
        );
    }

    #[tokio::test]
    async fn set_closed_is_noop_when_unchanged() {
        let p = Pool::new("abc", ".sddd", store()).unwrap();
        let before = p.info().await.last_mint;
        let m = p.set_closed(false).await.unwrap();
        assert_eq!(m.value.last_mint, before);
    }

    #[tokio::test]
    async fn advance_past_moves_position_forward_only() {
        let p = Pool::new("123", ".rddddd", store()).unwrap();
        let m = p.mint(5).await.unwrap();
        assert_eq!(m.value, vec!["00000", "00342", "00684", "01026", "01368"]);

        p.advance_past("12345").await.unwrap();

        let m = p.mint(5).await.unwrap();
        assert_eq!(m.value, vec!["12687", "13029", "13371", "13713", "14055"]);
    }

    #[tokio::test]
    async fn advance_past_invalid_id_errors() {
        let p = Pool::new("abc", ".sdk", store()).unwrap();
        assert_eq!(
            p.advance_past("bb").await.err(),
            Some(AdvancePastError::InvalidId)
        );
    }

    #[tokio::test]
    async fn advance_past_earlier_position_is_noop() {
        let p = Pool::new("abc", ".sddd", store()).unwrap();
        p.mint(10).await.unwrap();
        let before = p.info().await.last_mint;
        let m = p.advance_past("005").await.unwrap();
        assert_eq!(m.value.last_mint, before);
    }
}
