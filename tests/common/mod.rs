//! Shared utilities for integration testing.

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What the mock CloudWatch endpoint has seen.
#[derive(Default)]
pub struct MockCloudWatch {
    groups: Mutex<BTreeSet<String>>,
    streams: Mutex<BTreeMap<String, BTreeSet<String>>>,
    /// Raw `logEvents` arrays, one entry per PutLogEvents call.
    pub put_calls: Mutex<Vec<Value>>,
    pub deny_create: AtomicBool,
    pub reject_events: AtomicBool,
}

#[allow(dead_code)]
impl MockCloudWatch {
    pub fn put_calls(&self) -> Vec<Value> {
        self.put_calls.lock().unwrap().clone()
    }

    pub fn has_stream(&self, group: &str, stream: &str) -> bool {
        self.streams
            .lock()
            .unwrap()
            .get(group)
            .is_some_and(|s| s.contains(stream))
    }
}

fn error(kind: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "__type": kind, "message": message })),
    )
}

async fn dispatch(
    State(mock): State<Arc<MockCloudWatch>>,
    headers: HeaderMap,
    raw: Bytes,
) -> (StatusCode, Json<Value>) {
    if headers.get("content-type").and_then(|v| v.to_str().ok()) != Some("application/x-amz-json-1.1") {
        return error("UnsupportedMediaTypeException", "expected application/x-amz-json-1.1");
    }
    // Content type is application/x-amz-json-1.1, which the Json extractor refuses.
    let body: Value = match serde_json::from_slice(&raw) {
        Ok(body) => body,
        Err(_) => return error("SerializationException", "malformed request body"),
    };
    let target = headers
        .get("x-amz-target")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let group = body["logGroupName"].as_str().unwrap_or_default().to_string();
    let stream = body["logStreamName"].as_str().unwrap_or_default().to_string();

    match target.as_str() {
        "Logs_20140328.CreateLogGroup" => {
            if mock.deny_create.load(Ordering::SeqCst) {
                return error("AccessDeniedException", "User is not authorized to perform: logs:CreateLogGroup");
            }
            if !mock.groups.lock().unwrap().insert(group) {
                return error(
                    "com.amazonaws.logs#ResourceAlreadyExistsException",
                    "The specified log group already exists",
                );
            }
            (StatusCode::OK, Json(json!({})))
        }
        "Logs_20140328.CreateLogStream" => {
            if !mock.groups.lock().unwrap().contains(&group) {
                return error("ResourceNotFoundException", "The specified log group does not exist.");
            }
            let mut streams = mock.streams.lock().unwrap();
            if !streams.entry(group).or_default().insert(stream) {
                return error(
                    "com.amazonaws.logs#ResourceAlreadyExistsException",
                    "The specified log stream already exists",
                );
            }
            (StatusCode::OK, Json(json!({})))
        }
        "Logs_20140328.PutLogEvents" => {
            if !mock.has_stream(&group, &stream) {
                return error("ResourceNotFoundException", "The specified log stream does not exist.");
            }
            mock.put_calls.lock().unwrap().push(body["logEvents"].clone());
            if mock.reject_events.load(Ordering::SeqCst) {
                return (
                    StatusCode::OK,
                    Json(json!({ "rejectedLogEventsInfo": { "tooOldLogEventEndIndex": 0 } })),
                );
            }
            (StatusCode::OK, Json(json!({ "nextSequenceToken": "1" })))
        }
        _ => error("UnknownOperationException", "unknown operation"),
    }
}

/// Start a mock CloudWatch Logs endpoint on an ephemeral port.
pub async fn start_mock_cloudwatch() -> (SocketAddr, Arc<MockCloudWatch>) {
    let mock = Arc::new(MockCloudWatch::default());
    let app = Router::new()
        .route("/", post(dispatch))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, mock)
}
