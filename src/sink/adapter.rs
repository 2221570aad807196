//! Provision-once, append-many adapter over a [`LogSink`].

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::observability::metrics;
use crate::sink::types::{AppendError, Destination, LogEvent, ProvisionError, SinkError};
use crate::sink::LogSink;

/// Millisecond clock that never goes backwards within the process.
#[derive(Debug, Default)]
pub struct EventClock {
    last: AtomicI64,
}

impl EventClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current wall-clock time in ms, clamped to the last value handed out.
    pub fn now_millis(&self) -> i64 {
        self.observe(Utc::now().timestamp_millis())
    }

    fn observe(&self, wall: i64) -> i64 {
        let previous = self.last.fetch_max(wall, Ordering::SeqCst);
        previous.max(wall)
    }
}

/// Owns the sink client and the destination. Built once at startup.
pub struct LogSinkAdapter {
    sink: Arc<dyn LogSink>,
    destination: Destination,
    clock: EventClock,
}

impl LogSinkAdapter {
    pub fn new(sink: Arc<dyn LogSink>, destination: Destination) -> Self {
        Self {
            sink,
            destination,
            clock: EventClock::new(),
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Make sure the log group and stream exist.
    ///
    /// "Already exists" counts as success for both calls, so this is safe to
    /// run any number of times.
    pub async fn ensure_destination(&self) -> Result<(), ProvisionError> {
        let Destination { log_group, log_stream } = &self.destination;

        let created = tolerate_existing(self.sink.create_log_group(log_group).await).map_err(|source| {
            metrics::record_provision("log_group", "error");
            ProvisionError::LogGroup {
                group: log_group.clone(),
                source,
            }
        })?;
        metrics::record_provision("log_group", outcome(created));
        tracing::debug!(log_group = %log_group, created, "Log group ready");

        let created = tolerate_existing(self.sink.create_log_stream(log_group, log_stream).await).map_err(
            |source| {
                metrics::record_provision("log_stream", "error");
                ProvisionError::LogStream {
                    group: log_group.clone(),
                    stream: log_stream.clone(),
                    source,
                }
            },
        )?;
        metrics::record_provision("log_stream", outcome(created));
        tracing::debug!(log_group = %log_group, log_stream = %log_stream, created, "Log stream ready");

        Ok(())
    }

    /// Run [`ensure_destination`](Self::ensure_destination) and hand back a
    /// shareable handle for the request path.
    pub async fn provision(self) -> Result<ProvisionedSink, ProvisionError> {
        self.ensure_destination().await?;
        tracing::info!(destination = %self.destination, "Log destination provisioned");
        Ok(ProvisionedSink(Arc::new(self)))
    }

    /// Append one event stamped with the current time.
    ///
    /// Returns the submitted event on success. Failures are returned to the
    /// caller, who decides whether they matter.
    pub async fn append(&self, message: impl Into<String>) -> Result<LogEvent, AppendError> {
        let event = LogEvent {
            timestamp: self.clock.now_millis(),
            message: message.into(),
        };

        let result = self
            .sink
            .put_log_events(
                &self.destination.log_group,
                &self.destination.log_stream,
                std::slice::from_ref(&event),
            )
            .await;

        match result {
            Ok(()) => {
                metrics::record_append("ok");
                Ok(event)
            }
            Err(source) => {
                metrics::record_append("error");
                Err(AppendError {
                    destination: self.destination.clone(),
                    source,
                })
            }
        }
    }
}

/// An adapter whose destination is known to exist.
///
/// Only obtainable through [`LogSinkAdapter::provision`], so anything that
/// requires one cannot run before provisioning succeeded.
#[derive(Clone, Debug)]
pub struct ProvisionedSink(Arc<LogSinkAdapter>);

impl std::ops::Deref for ProvisionedSink {
    type Target = LogSinkAdapter;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Debug for LogSinkAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSinkAdapter")
            .field("destination", &self.destination)
            .finish()
    }
}

/// Ok(true) if created, Ok(false) if it was already there.
fn tolerate_existing(result: Result<(), SinkError>) -> Result<bool, SinkError> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_already_exists() => Ok(false),
        Err(e) => Err(e),
    }
}

fn outcome(created: bool) -> &'static str {
    if created {
        "created"
    } else {
        "exists"
    }
}
