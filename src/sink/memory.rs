//! In-process log sink.
//!
//! Keeps groups, streams and events in memory with the same idempotency
//! semantics as the remote service. Failures can be injected per operation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::sink::types::{Destination, LogEvent, SinkError, SinkResult};
use crate::sink::LogSink;

#[derive(Default)]
struct Store {
    groups: BTreeSet<String>,
    streams: BTreeMap<String, BTreeSet<String>>,
    events: Vec<(Destination, LogEvent)>,
}

/// Log sink that records everything in memory.
#[derive(Default)]
pub struct MemorySink {
    store: Mutex<Store>,
    deny_groups: AtomicBool,
    deny_streams: AtomicBool,
    fail_appends: AtomicBool,
    put_calls: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject log group creation with `AccessDenied`.
    pub fn deny_group_creation(&self, deny: bool) {
        self.deny_groups.store(deny, Ordering::SeqCst);
    }

    /// Reject log stream creation with `AccessDenied`.
    pub fn deny_stream_creation(&self, deny: bool) {
        self.deny_streams.store(deny, Ordering::SeqCst);
    }

    /// Fail every append with a service error.
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.lock().groups.contains(group)
    }

    pub fn has_stream(&self, group: &str, stream: &str) -> bool {
        self.lock()
            .streams
            .get(group)
            .is_some_and(|streams| streams.contains(stream))
    }

    /// All events appended so far, in arrival order.
    pub fn events(&self) -> Vec<(Destination, LogEvent)> {
        self.lock().events.clone()
    }

    /// Number of `put_log_events` calls received, including failed ones.
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn create_log_group(&self, group: &str) -> SinkResult<()> {
        if self.deny_groups.load(Ordering::SeqCst) {
            return Err(SinkError::AccessDenied(format!("not authorized to create log group {}", group)));
        }
        let mut store = self.lock();
        if !store.groups.insert(group.to_string()) {
            return Err(SinkError::AlreadyExists(format!("log group {} already exists", group)));
        }
        Ok(())
    }

    async fn create_log_stream(&self, group: &str, stream: &str) -> SinkResult<()> {
        if self.deny_streams.load(Ordering::SeqCst) {
            return Err(SinkError::AccessDenied(format!("not authorized to create log stream {}", stream)));
        }
        let mut store = self.lock();
        if !store.groups.contains(group) {
            return Err(SinkError::Service {
                code: "ResourceNotFoundException".to_string(),
                message: format!("log group {} does not exist", group),
            });
        }
        let streams = store.streams.entry(group.to_string()).or_default();
        if !streams.insert(stream.to_string()) {
            return Err(SinkError::AlreadyExists(format!("log stream {} already exists", stream)));
        }
        Ok(())
    }

    async fn put_log_events(&self, group: &str, stream: &str, events: &[LogEvent]) -> SinkResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(SinkError::Service {
                code: "ServiceUnavailableException".to_string(),
                message: "injected append failure".to_string(),
            });
        }

        let mut store = self.lock();
        let exists = store
            .streams
            .get(group)
            .is_some_and(|streams| streams.contains(stream));
        if !exists {
            return Err(SinkError::Service {
                code: "ResourceNotFoundException".to_string(),
                message: format!("log stream {} in {} does not exist", stream, group),
            });
        }

        let destination = Destination::new(group, stream);
        store
            .events
            .extend(events.iter().cloned().map(|event| (destination.clone(), event)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_group_reports_already_exists() {
        let sink = MemorySink::new();
        sink.create_log_group("g").await.unwrap();
        let err = sink.create_log_group("g").await.unwrap_err();
        assert!(err.is_already_exists());
        assert!(sink.has_group("g"));
    }

    #[tokio::test]
    async fn test_stream_requires_group() {
        let sink = MemorySink::new();
        let err = sink.create_log_stream("missing", "s").await.unwrap_err();
        assert!(!err.is_already_exists());
    }

    #[tokio::test]
    async fn test_append_requires_stream() {
        let sink = MemorySink::new();
        let event = LogEvent {
            timestamp: 1,
            message: "x".into(),
        };
        assert!(sink.put_log_events("g", "s", &[event]).await.is_err());
        assert_eq!(sink.put_calls(), 1);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_injected_append_failure() {
        let sink = MemorySink::new();
        sink.create_log_group("g").await.unwrap();
        sink.create_log_stream("g", "s").await.unwrap();
        sink.fail_appends(true);
        let event = LogEvent {
            timestamp: 1,
            message: "x".into(),
        };
        assert!(sink.put_log_events("g", "s", &[event.clone()]).await.is_err());
        sink.fail_appends(false);
        sink.put_log_events("g", "s", &[event]).await.unwrap();
        assert_eq!(sink.events().len(), 1);
    }
}
