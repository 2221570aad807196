//! CloudWatch sink against a mock endpoint.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::Utc;

use batch_logger::sink::{CloudWatchSink, Destination, LogSink, LogSinkAdapter, ProvisionError, SinkError};

mod common;

fn adapter(addr: std::net::SocketAddr) -> LogSinkAdapter {
    let sink = CloudWatchSink::new(&format!("http://{}", addr)).unwrap();
    LogSinkAdapter::new(Arc::new(sink), Destination::new("/it/batch", "endpoint"))
}

#[tokio::test]
async fn test_provisioning_twice_succeeds() {
    let (addr, mock) = common::start_mock_cloudwatch().await;

    let first = adapter(addr);
    first.ensure_destination().await.expect("first provisioning");
    first.ensure_destination().await.expect("second provisioning");

    // A fresh process against the same destination also succeeds.
    adapter(addr).ensure_destination().await.expect("fresh adapter");

    assert!(mock.has_stream("/it/batch", "endpoint"));
}

#[tokio::test]
async fn test_duplicate_create_maps_to_already_exists() {
    let (addr, _mock) = common::start_mock_cloudwatch().await;
    let sink = CloudWatchSink::new(&format!("http://{}", addr)).unwrap();

    sink.create_log_group("/dup").await.unwrap();
    let err = sink.create_log_group("/dup").await.unwrap_err();
    assert!(err.is_already_exists(), "got {err:?}");
}

#[tokio::test]
async fn test_access_denied_fails_provisioning() {
    let (addr, mock) = common::start_mock_cloudwatch().await;
    mock.deny_create.store(true, Ordering::SeqCst);

    let err = adapter(addr).ensure_destination().await.unwrap_err();
    match err {
        ProvisionError::LogGroup { source, .. } => {
            assert!(matches!(source, SinkError::AccessDenied(_)), "got {source:?}")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!mock.has_stream("/it/batch", "endpoint"));
}

#[tokio::test]
async fn test_append_sends_one_event_per_call() {
    let (addr, mock) = common::start_mock_cloudwatch().await;
    let adapter = adapter(addr);
    adapter.ensure_destination().await.unwrap();

    let first = adapter.append("first").await.unwrap();
    let second = adapter.append("second").await.unwrap();
    assert!(second.timestamp >= first.timestamp);

    let calls = mock.put_calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert_eq!(call.as_array().map(Vec::len), Some(1));
    }
    assert_eq!(calls[0][0]["message"], "first");
    assert_eq!(calls[0][0]["timestamp"], first.timestamp);
}

#[tokio::test]
async fn test_submitted_timestamp_is_taken_at_call_time() {
    let (addr, mock) = common::start_mock_cloudwatch().await;
    let adapter = adapter(addr);
    adapter.ensure_destination().await.unwrap();

    let before = Utc::now().timestamp_millis();
    adapter.append("timed").await.unwrap();
    let after = Utc::now().timestamp_millis();

    let calls = mock.put_calls();
    let received = calls[0][0]["timestamp"].as_i64().expect("integer timestamp");
    assert!(
        before <= received && received <= after,
        "{received} not within [{before}, {after}]"
    );
}

#[tokio::test]
async fn test_rejected_events_are_append_errors() {
    let (addr, mock) = common::start_mock_cloudwatch().await;
    let adapter = adapter(addr);
    adapter.ensure_destination().await.unwrap();
    mock.reject_events.store(true, Ordering::SeqCst);

    let err = adapter.append("too old").await.unwrap_err();
    assert!(matches!(err.source, SinkError::Rejected(_)));
}

#[tokio::test]
async fn test_append_without_provisioning_fails() {
    let (addr, _mock) = common::start_mock_cloudwatch().await;

    let err = adapter(addr).append("nowhere").await.unwrap_err();
    match err.source {
        SinkError::Service { code, .. } => assert_eq!(code, "ResourceNotFoundException"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let err = adapter(addr).ensure_destination().await.unwrap_err();
    match err {
        ProvisionError::LogGroup { source, .. } => assert!(matches!(source, SinkError::Transport(_))),
        other => panic!("unexpected error: {other:?}"),
    }
}
