//! CloudWatch Logs client.
//!
//! # Responsibilities
//! - Speak the CloudWatch Logs JSON 1.1 protocol (`X-Amz-Target` dispatch)
//! - Map service error codes onto [`SinkError`] variants
//! - Surface partially rejected appends as failures
//!
//! Requests are not signed. The endpoint is expected to be unauthenticated
//! (e.g. LocalStack) or fronted by a signing sidecar.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::sink::types::{LogEvent, SinkError, SinkResult};
use crate::sink::LogSink;

const CONTENT_TYPE_AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "Logs_20140328";

const ALREADY_EXISTS: &str = "ResourceAlreadyExistsException";
const ACCESS_DENIED: &str = "AccessDeniedException";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLogGroupRequest<'a> {
    log_group_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLogStreamRequest<'a> {
    log_group_name: &'a str,
    log_stream_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PutLogEventsRequest<'a> {
    log_group_name: &'a str,
    log_stream_name: &'a str,
    log_events: &'a [LogEvent],
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PutLogEventsResponse {
    #[serde(default)]
    rejected_log_events_info: Option<RejectedLogEventsInfo>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RejectedLogEventsInfo {
    too_new_log_event_start_index: Option<i64>,
    too_old_log_event_end_index: Option<i64>,
    expired_log_event_end_index: Option<i64>,
}

impl RejectedLogEventsInfo {
    fn describe(&self) -> String {
        let mut reasons = Vec::new();
        if let Some(i) = self.too_new_log_event_start_index {
            reasons.push(format!("too new from index {}", i));
        }
        if let Some(i) = self.too_old_log_event_end_index {
            reasons.push(format!("too old up to index {}", i));
        }
        if let Some(i) = self.expired_log_event_end_index {
            reasons.push(format!("expired up to index {}", i));
        }
        reasons.join(", ")
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Log sink backed by a CloudWatch Logs compatible HTTP endpoint.
#[derive(Clone)]
pub struct CloudWatchSink {
    client: reqwest::Client,
    endpoint: Url,
}

impl CloudWatchSink {
    /// Create a client for the given endpoint (e.g. `https://logs.us-east-1.amazonaws.com`).
    pub fn new(endpoint: &str) -> SinkResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| SinkError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SinkError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Issue one protocol call and return the raw success body.
    async fn call<B: Serialize + ?Sized>(&self, operation: &str, body: &B) -> SinkResult<String> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_AMZ_JSON)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        tracing::debug!(operation, status = status.as_u16(), body = %text, "CloudWatch call failed");
        Err(classify_error(status.as_u16(), &text))
    }
}

/// Turn an error response into a [`SinkError`].
fn classify_error(status: u16, body: &str) -> SinkError {
    let parsed: ErrorResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            return SinkError::Decode {
                status,
                body: body.to_string(),
            }
        }
    };

    // `__type` may be namespaced, e.g. "com.amazonaws.logs#ResourceAlreadyExistsException".
    let code = parsed
        .kind
        .as_deref()
        .map(|k| k.rsplit('#').next().unwrap_or(k))
        .unwrap_or("Unknown")
        .to_string();
    let message = parsed.message.unwrap_or_default();

    match code.as_str() {
        ALREADY_EXISTS => SinkError::AlreadyExists(message),
        ACCESS_DENIED => SinkError::AccessDenied(message),
        _ => SinkError::Service { code, message },
    }
}

#[async_trait]
impl LogSink for CloudWatchSink {
    async fn create_log_group(&self, group: &str) -> SinkResult<()> {
        self.call("CreateLogGroup", &CreateLogGroupRequest { log_group_name: group })
            .await
            .map(|_| ())
    }

    async fn create_log_stream(&self, group: &str, stream: &str) -> SinkResult<()> {
        let request = CreateLogStreamRequest {
            log_group_name: group,
            log_stream_name: stream,
        };
        self.call("CreateLogStream", &request).await.map(|_| ())
    }

    async fn put_log_events(&self, group: &str, stream: &str, events: &[LogEvent]) -> SinkResult<()> {
        let request = PutLogEventsRequest {
            log_group_name: group,
            log_stream_name: stream,
            log_events: events,
        };
        let body = self.call("PutLogEvents", &request).await?;

        let response: PutLogEventsResponse = if body.trim().is_empty() {
            PutLogEventsResponse::default()
        } else {
            serde_json::from_str(&body).map_err(|_| SinkError::Decode { status: 200, body })?
        };

        match response.rejected_log_events_info {
            Some(info) => Err(SinkError::Rejected(info.describe())),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for CloudWatchSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudWatchSink")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}
