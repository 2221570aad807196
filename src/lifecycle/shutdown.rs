//! Shutdown coordination between the signal task and the HTTP server.

use tokio::sync::broadcast;

/// Fires once when the process should stop serving.
///
/// `main` hands a receiver to [`Service::run`](crate::lifecycle::Service::run)
/// and triggers it from the signal task. The server then stops accepting and
/// drains in-flight `/batch` requests before returning.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for the server's graceful-shutdown future.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Tell the server to stop. A no-op once the server has exited.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Non-zero while the server is still running.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
