//! Root error taxonomy
//!
//! A single `thiserror` enum that wraps the ambient-stack errors
//! (`ConfigError`, `LoggingError`) via `#[from]` and carries the core
//! registry error kinds used throughout the HTTP boundary.

use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::storage::StorageError;

/// Root error type for the noid pool service.
#[derive(Debug, Error)]
pub enum NoidError {
    /// Template string failed to parse.
    #[error("bad template string")]
    BadTemplate,

    /// A pool with this name already exists.
    #[error("pool '{0}' already exists")]
    NameExists(String),

    /// No pool registered under this name.
    #[error("no such pool '{0}'")]
    NoSuchPool(String),

    /// Reopen requested on a pool that has been exhausted.
    #[error("pool '{0}' is empty and cannot be reopened")]
    PoolEmpty(String),

    /// Mint requested on a closed pool.
    #[error("pool '{0}' is closed")]
    PoolClosed(String),

    /// `advancePast` given an identifier that fails to decode.
    #[error("invalid id for pool '{0}'")]
    InvalidId(String),

    /// A store operation failed; the in-memory mutation already stands.
    #[error("store error: {0}")]
    Store(#[from] StorageError),

    /// Startup reload from the store failed; fatal to the process.
    #[error("failed to load pools from store: {0}")]
    Load(String),

    /// Configuration errors (ambient stack).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging setup errors (ambient stack).
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
}

pub type Result<T> = std::result::Result<T, NoidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_pool() {
        let e = NoidError::NoSuchPool("abc".to_string());
        assert!(e.to_string().contains("abc"));
    }
}
