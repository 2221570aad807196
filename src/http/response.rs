//! Response bodies.

use serde::{Deserialize, Serialize};

/// Acknowledgment returned by `POST /batch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAck {
    pub status: String,
    pub message: String,
}

impl BatchAck {
    pub fn logged() -> Self {
        Self {
            status: "success".to_string(),
            message: "Batch request logged".to_string(),
        }
    }
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}
