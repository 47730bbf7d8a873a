//! Structured Logging for the noid pool server
//!
//! Provides structured logging with:
//! - JSON output for log aggregation, or pretty output for local development
//! - Correlation IDs for request tracing
//! - Pool lifecycle and mint event logging
//!
//! # Usage
//!
//! ```rust
//! use noidpool::logging::{init_logging, LogLevel};
//!
//! init_logging(LogLevel::Info, true)?; // JSON mode for production
//! ```

use serde::Serialize;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

// ============================================================================
// Log Levels
// ============================================================================

/// Application log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

// ============================================================================
// Structured Event Types
// ============================================================================

/// Event categories for structured logging
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// API request/response events
    Api,
    /// Pool lifecycle events (create, open, close)
    Pool,
    /// Mint/advancePast events
    Mint,
    /// Durable store failures
    Store,
    /// System events (startup, shutdown)
    System,
}

/// Structured log event
#[derive(Debug, Serialize)]
pub struct LogEvent {
    /// Event timestamp (ISO 8601)
    pub timestamp: String,
    /// Log level
    pub level: String,
    /// Event category
    pub category: EventCategory,
    /// Human-readable message
    pub message: String,
    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Additional structured data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

/// Error details for error events
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl LogEvent {
    /// Create a new log event
    pub fn new(level: LogLevel, category: EventCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: format!("{:?}", level).to_uppercase(),
            category,
            message: message.into(),
            correlation_id: None,
            data: None,
            duration_ms: None,
            error: None,
        }
    }

    /// Add correlation ID
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Add structured data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Add error details
    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.error = Some(ErrorDetails {
            code: code.into(),
            message: message.into(),
        });
        self
    }

    /// Render this event as a JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"error\": \"failed to serialize log\", \"message\": \"{}\"}}",
                self.message
            )
        })
    }
}

// ============================================================================
// Domain Event Logging
// ============================================================================

/// Log an API request
pub fn log_api_request(method: &str, path: &str, correlation_id: &str) {
    let event = LogEvent::new(LogLevel::Info, EventCategory::Api, format!("{} {}", method, path))
        .with_correlation_id(correlation_id)
        .with_data(serde_json::json!({ "method": method, "path": path }));

    tracing::info!(target: "noidpool::api", "{}", event.to_json());
}

/// Log an API response
pub fn log_api_response(method: &str, path: &str, status: u16, duration_ms: u64, correlation_id: &str) {
    let level = if status >= 500 {
        LogLevel::Error
    } else if status >= 400 {
        LogLevel::Warn
    } else {
        LogLevel::Info
    };

    let event = LogEvent::new(level, EventCategory::Api, format!("{} {} -> {}", method, path, status))
        .with_correlation_id(correlation_id)
        .with_duration(duration_ms)
        .with_data(serde_json::json!({ "method": method, "path": path, "status": status }));

    match level {
        LogLevel::Error => tracing::error!(target: "noidpool::api", "{}", event.to_json()),
        LogLevel::Warn => tracing::warn!(target: "noidpool::api", "{}", event.to_json()),
        _ => tracing::info!(target: "noidpool::api", "{}", event.to_json()),
    }
}

/// Log a pool lifecycle event (created, opened, closed).
pub fn log_pool_event(event_type: &str, pool_name: &str, success: bool, error: Option<&str>) {
    let level = if success { LogLevel::Info } else { LogLevel::Error };
    let mut event = LogEvent::new(level, EventCategory::Pool, event_type)
        .with_correlation_id(pool_name)
        .with_data(serde_json::json!({ "pool": pool_name, "success": success }));

    if let Some(err) = error {
        event = event.with_error("POOL_ERROR", err);
    }

    if success {
        tracing::info!(target: "noidpool::pool", "{}", event.to_json());
    } else {
        tracing::error!(target: "noidpool::pool", "{}", event.to_json());
    }
}

/// Log a mint or advancePast event against a pool.
pub fn log_mint_event(pool_name: &str, minted_id: &str, position: i64, max: i64) {
    let event = LogEvent::new(LogLevel::Info, EventCategory::Mint, "mint")
        .with_correlation_id(pool_name)
        .with_data(serde_json::json!({
            "pool": pool_name,
            "id": minted_id,
            "position": position,
            "max": max,
        }));

    tracing::info!(target: "noidpool::mint", "{}", event.to_json());
}

/// Log a durable-store failure. The in-memory mutation that triggered this
/// save already stands; this event exists so operators notice drift between
/// memory and disk.
pub fn log_store_failure(pool_name: &str, operation: &str, error: &str) {
    let event = LogEvent::new(LogLevel::Error, EventCategory::Store, "store operation failed")
        .with_correlation_id(pool_name)
        .with_data(serde_json::json!({ "pool": pool_name, "operation": operation }))
        .with_error("STORE_ERROR", error);

    tracing::error!(target: "noidpool::store", "{}", event.to_json());
}

// ============================================================================
// Initialization
// ============================================================================

/// Initialize the logging system.
///
/// * `level` - Minimum log level to output
/// * `json_format` - Use JSON format (recommended for production)
pub fn init_logging(level: LogLevel, json_format: bool) -> Result<(), LoggingError> {
    let level_str = format!("{:?}", level).to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "noidpool={},tower_http={},axum={}",
            level_str, level_str, level_str
        ))
    });

    if json_format {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE),
        );
        subscriber
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    } else {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE),
        );
        subscriber
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    }

    Ok(())
}

/// Initialize logging from a `ServerConfig`.
pub fn init_from_config(config: &crate::config::ServerConfig) -> Result<(), LoggingError> {
    let level = LogLevel::from(config.log_level.as_str());
    init_logging(level, config.log_json)
}

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}

// ============================================================================
// Request ID Generation
// ============================================================================

/// Generate a unique correlation ID for request tracing.
pub fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();

    format!("{:x}-{:04x}", nanos & 0xFFFF_FFFF, rand::random::<u16>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_event_serialization_carries_fields() {
        let event = LogEvent::new(LogLevel::Info, EventCategory::Api, "test event")
            .with_correlation_id("test-123")
            .with_data(serde_json::json!({"key": "value"}))
            .with_duration(42);

        let json = event.to_json();
        assert!(json.contains("test event"));
        assert!(json.contains("test-123"));
        assert!(json.contains("42"));
    }

    #[test]
    fn log_level_parsing_falls_back_to_info() {
        assert_eq!(LogLevel::from("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from("warning"), LogLevel::Warn);
        assert_eq!(LogLevel::from("unknown"), LogLevel::Info);
    }

    #[test]
    fn correlation_ids_are_nonempty() {
        assert!(!generate_correlation_id().is_empty());
    }
}
