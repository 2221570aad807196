//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the sink backend from configuration
//! - Provision the log destination before binding anything
//! - Bind the listener only once the sink is ready
//! - Hand back a [`Service`] ready to run
//!
//! Any startup error is fatal. Nothing is retried.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::sink::{self, LogSink, LogSinkAdapter, ProvisionError, SinkError};

/// Reasons the service can fail to come up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Log sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Provisioning failed: {0}")]
    Provision(#[from] ProvisionError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A provisioned, bound service that has not started serving yet.
pub struct Service {
    server: HttpServer,
    listener: TcpListener,
}

impl Service {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the shutdown receiver fires.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        self.server
            .run(self.listener, shutdown)
            .await
            .map_err(StartupError::Serve)
    }
}

/// Build the configured sink, then [`prepare`] the service around it.
pub async fn start(config: &ServiceConfig) -> Result<Service, StartupError> {
    let sink = sink::from_config(&config.sink)?;
    prepare(config, sink).await
}

/// Provision the destination and bind the listener.
pub async fn prepare(config: &ServiceConfig, sink: Arc<dyn LogSink>) -> Result<Service, StartupError> {
    let destination = config.sink.destination();
    tracing::info!(
        log_group = %destination.log_group,
        log_stream = %destination.log_stream,
        "Provisioning log destination"
    );

    let provisioned = LogSinkAdapter::new(sink, destination).provision().await?;

    let address = &config.listener.bind_address;
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(StartupError::Serve)?;
    tracing::info!(address = %local_addr, "Listening for connections");

    Ok(Service {
        server: HttpServer::new(&config.listener, provisioned),
        listener,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinkKind;
    use crate::sink::MemorySink;

    fn local_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        config
    }

    #[tokio::test]
    async fn test_start_with_memory_sink() {
        let mut config = local_config();
        config.sink.kind = SinkKind::Memory;
        let service = start(&config).await.unwrap();
        assert!(service.local_addr().unwrap().port() > 0);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_fails_before_provisioning() {
        let mut config = local_config();
        config.sink.endpoint = "not a url".to_string();
        let err = start(&config).await.err().unwrap();
        assert!(matches!(err, StartupError::Sink(SinkError::InvalidEndpoint { .. })));
    }

    #[tokio::test]
    async fn test_denied_provisioning_is_fatal() {
        let sink = Arc::new(MemorySink::new());
        sink.deny_group_creation(true);
        let err = prepare(&local_config(), sink).await.err().unwrap();
        assert!(matches!(err, StartupError::Provision(ProvisionError::LogGroup { .. })));
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let sink = Arc::new(MemorySink::new());
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = local_config();
        config.listener.bind_address = occupied.local_addr().unwrap().to_string();

        let err = prepare(&config, sink).await.err().unwrap();
        assert!(matches!(err, StartupError::Bind { .. }));
    }
}
