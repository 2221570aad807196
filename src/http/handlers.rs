//! Route handlers.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;

use crate::http::request::request_id;
use crate::http::response::{BatchAck, HealthStatus};
use crate::http::server::AppState;
use crate::http::summary::batch_message;
use crate::observability::metrics;

/// `POST /batch`: forward a summary of the payload to the log sink.
///
/// Always acknowledges. Append failures are logged locally and never reach
/// the client.
pub async fn batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<BatchAck>) {
    let request_id = request_id(&headers);
    metrics::record_batch_request();

    let message = batch_message(&payload);
    tracing::info!(request_id = %request_id, "{}", message);

    // Append failures are swallowed on purpose; the response does not depend on them.
    if let Err(error) = state.sink.append(message).await {
        tracing::error!(request_id = %request_id, error = %error, "Failed to forward batch request to log sink");
    }

    (StatusCode::OK, Json(BatchAck::logged()))
}

/// `GET /health`: liveness probe.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}
