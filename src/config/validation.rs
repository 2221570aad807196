//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses and endpoint URLs parse
//! - Reject empty destination names and zero body limits
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{ServiceConfig, SinkKind};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_bytes == Some(0) {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }

    if config.sink.log_group.trim().is_empty() {
        errors.push(ValidationError::new("sink.log_group", "must not be empty"));
    }
    if config.sink.log_stream.trim().is_empty() {
        errors.push(ValidationError::new("sink.log_stream", "must not be empty"));
    }
    // CloudWatch forbids ':' and '*' in stream names.
    if config.sink.log_stream.contains([':', '*']) {
        errors.push(ValidationError::new("sink.log_stream", "must not contain ':' or '*'"));
    }
    if config.sink.kind == SinkKind::CloudWatch {
        if let Err(e) = Url::parse(&config.sink.endpoint) {
            errors.push(ValidationError::new(
                "sink.endpoint",
                format!("'{}' is not a URL: {}", config.sink.endpoint, e),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
