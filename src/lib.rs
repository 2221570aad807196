//! Batch request logger.
//!
//! Accepts JSON documents on `POST /batch` and forwards a one-line summary of
//! each to a CloudWatch Logs compatible sink.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──POST /batch──▶ http::server ──▶ http::handlers ──▶ sink::adapter ──▶ LogSink
//!            ◀── 200 ack ────                        │                            (cloudwatch | memory)
//!                                                    └── append errors logged, never returned
//!
//!     startup: config ─▶ observability ─▶ sink ─▶ provision group + stream ─▶ bind ─▶ serve
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod sink;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use sink::{LogSink, LogSinkAdapter};
