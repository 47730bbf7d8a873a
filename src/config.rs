//! Environment-based Configuration for the noid pool server
//!
//! This module loads server configuration from environment variables,
//! following the same shape as the rest of the ambient stack: parse once at
//! startup, fail fast on bad values, fall back to sane development defaults.
//!
//! # Environment Variables
//!
//! - `NOID_LISTEN_PORT` - HTTP port to bind (default: 8080)
//! - `NOID_STORE` - "sqlite", "directory", or "null" (default: "null")
//! - `NOID_STORE_PATH` - sqlite db file path or JSON directory root
//!   (required unless `NOID_STORE=null`)
//! - `NOID_LOG_LEVEL` - trace/debug/info/warn/error (default: "info")
//! - `NOID_LOG_FORMAT` - "json" or "pretty" (default: "pretty")

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Which durable store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Directory,
    Null,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreKind::Sqlite),
            "directory" | "dir" => Ok(StoreKind::Directory),
            "null" | "none" => Ok(StoreKind::Null),
            other => Err(ConfigError::InvalidValue(
                "NOID_STORE".to_string(),
                format!("unknown store kind: {}", other),
            )),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_port: u16,
    pub store_kind: StoreKind,
    pub store_path: Option<String>,
    pub log_level: String,
    pub log_json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_port: u16 = env::var("NOID_LISTEN_PORT")
            .ok()
            .map(|v| {
                v.parse().map_err(|_| {
                    ConfigError::InvalidValue("NOID_LISTEN_PORT".to_string(), v.clone())
                })
            })
            .transpose()?
            .unwrap_or(8080);

        let store_kind: StoreKind = env::var("NOID_STORE")
            .unwrap_or_else(|_| "null".to_string())
            .parse()?;

        let store_path = env::var("NOID_STORE_PATH").ok();
        if store_kind != StoreKind::Null && store_path.is_none() {
            return Err(ConfigError::MissingEnvVar("NOID_STORE_PATH".to_string()));
        }

        let log_level = env::var("NOID_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = match env::var("NOID_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()).as_str() {
            "json" => true,
            "pretty" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "NOID_LOG_FORMAT".to_string(),
                    other.to_string(),
                ))
            }
        };

        Ok(Self {
            listen_port,
            store_kind,
            store_path,
            log_level,
            log_json,
        })
    }

    /// Print a configuration summary to stdout at startup.
    pub fn print_summary(&self) {
        println!("=== noid-server configuration ===");
        println!("Listen port: {}", self.listen_port);
        println!("Store: {:?}", self.store_kind);
        if let Some(path) = &self.store_path {
            println!("Store path: {}", path);
        }
        println!("Log level: {} ({})", self.log_level, if self.log_json { "json" } else { "pretty" });
        println!("==================================");
    }
}
