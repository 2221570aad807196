//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign / propagate x-request-id)
//!     → handlers.rs (JSON extraction, summary, append)
//!     → response.rs (fixed acknowledgment body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod summary;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::BatchAck;
pub use server::{AppState, HttpServer};
