//! Remote log sink subsystem.
//!
//! # Data Flow
//! ```text
//! startup:
//!     adapter.rs ensure_destination()
//!         → create_log_group   (AlreadyExists is fine)
//!         → create_log_stream  (AlreadyExists is fine)
//!
//! per request:
//!     adapter.rs append(message)
//!         → clock stamps the event (ms, non-decreasing)
//!         → put_log_events with exactly one event
//! ```
//!
//! # Backends
//! - cloudwatch.rs: CloudWatch Logs JSON protocol over reqwest
//! - memory.rs: in-process recorder with failure injection
//!
//! # Design Decisions
//! - The sink is a trait object so the adapter never knows which backend it talks to
//! - Creation calls report `SinkError::AlreadyExists` as a distinct variant
//! - No retries and no timeouts on remote calls

pub mod adapter;
pub mod cloudwatch;
pub mod memory;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

pub use adapter::{EventClock, LogSinkAdapter, ProvisionedSink};
pub use cloudwatch::CloudWatchSink;
pub use memory::MemorySink;
pub use types::{AppendError, Destination, LogEvent, ProvisionError, SinkError, SinkResult};

use crate::config::{SinkConfig, SinkKind};

/// An append-only remote log service.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Create a log group.
    async fn create_log_group(&self, group: &str) -> SinkResult<()>;

    /// Create a log stream inside an existing group.
    async fn create_log_stream(&self, group: &str, stream: &str) -> SinkResult<()>;

    /// Append events to a stream.
    async fn put_log_events(&self, group: &str, stream: &str, events: &[LogEvent]) -> SinkResult<()>;
}

/// Build the sink backend selected by configuration.
pub fn from_config(config: &SinkConfig) -> Result<Arc<dyn LogSink>, SinkError> {
    match config.kind {
        SinkKind::CloudWatch => Ok(Arc::new(CloudWatchSink::new(&config.endpoint)?)),
        SinkKind::Memory => Ok(Arc::new(MemorySink::new())),
    }
}
