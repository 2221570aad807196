//! Destination identity, log events and sink error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default log group the service writes into.
pub const DEFAULT_LOG_GROUP: &str = "/batch-logger/batch-logs";

/// Default stream inside [`DEFAULT_LOG_GROUP`].
pub const DEFAULT_LOG_STREAM: &str = "batch-endpoint-logs";

/// The (log group, log stream) pair every event is appended to.
///
/// Fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    pub log_group: String,
    pub log_stream: String,
}

impl Destination {
    pub fn new(log_group: impl Into<String>, log_stream: impl Into<String>) -> Self {
        Self {
            log_group: log_group.into(),
            log_stream: log_stream.into(),
        }
    }
}

impl Default for Destination {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_GROUP, DEFAULT_LOG_STREAM)
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.log_group, self.log_stream)
    }
}

/// A single record appended to a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub message: String,
}

/// Errors reported by a [`LogSink`](super::LogSink) backend.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The group or stream being created already exists.
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// The service refused the call.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Any other service-side error, keyed by the service's error code.
    #[error("Service error {code}: {message}")]
    Service { code: String, message: String },

    /// The service accepted the call but rejected some of the events.
    #[error("Log events rejected: {0}")]
    Rejected(String),

    /// Connection or protocol failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be understood.
    #[error("Malformed response (HTTP {status}): {body}")]
    Decode { status: u16, body: String },

    #[error("Invalid sink endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl SinkError {
    /// True for the idempotent "already exists" outcome of a create call.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, SinkError::AlreadyExists(_))
    }
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Provisioning failed with something other than "already exists".
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Failed to create log group '{group}': {source}")]
    LogGroup {
        group: String,
        #[source]
        source: SinkError,
    },

    #[error("Failed to create log stream '{stream}' in '{group}': {source}")]
    LogStream {
        group: String,
        stream: String,
        #[source]
        source: SinkError,
    },
}

/// An event could not be appended.
#[derive(Debug, Error)]
#[error("Failed to append log event to {destination}: {source}")]
pub struct AppendError {
    pub destination: Destination,
    #[source]
    pub source: SinkError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_classification() {
        assert!(SinkError::AlreadyExists("group".into()).is_already_exists());
        assert!(!SinkError::AccessDenied("nope".into()).is_already_exists());
        let service = SinkError::Service {
            code: "ThrottlingException".into(),
            message: "slow down".into(),
        };
        assert!(!service.is_already_exists());
    }

    #[test]
    fn test_destination_display() {
        let dest = Destination::new("/app/logs", "main");
        assert_eq!(dest.to_string(), "/app/logs:main");
        assert_eq!(Destination::default().log_group, DEFAULT_LOG_GROUP);
    }

    #[test]
    fn test_log_event_wire_shape() {
        let event = LogEvent {
            timestamp: 1_700_000_000_000,
            message: "hello".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"timestamp": 1_700_000_000_000_i64, "message": "hello"}));
    }
}
