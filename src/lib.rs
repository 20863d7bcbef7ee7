//! crpt_client library: rate-limited document registration
//!
//! This library provides a client for the CRPT document registration API that
//! never exceeds a configured request rate, no matter how many tasks share it.
//! Calls are gated by a fixed-window limiter (`WindowedLimiter`) and sent by a
//! `BoundedDispatcher`, which classifies every response into a typed value or a
//! `DispatchError`.
//!
//! # Example
//!
//! ```no_run
//! use crpt_client::{sample_document, Config, CrptClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     request_limit: 10,
//!     window_seconds: 60,
//!     ..Default::default()
//! };
//!
//! let client = CrptClient::from_config(&config)?;
//! let created = client.create_document(&sample_document(), "c2lnbmF0dXJl").await?;
//! println!("Registered document {}", created.id);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Limiters spawn their window reset
//! task on construction, so create them inside an async context.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error_handling;
pub mod initialization;
pub mod rate_limiter;
mod run;

// Re-export public API
pub use api::CrptClient;
pub use config::{Config, LogFormat, LogLevel};
pub use dispatch::{
    BoundedDispatcher, Codec, DispatchEvent, EventSink, HttpTransport, JsonCodec, LogSink,
    MemorySink, OutboundRequest, Transport, TransportResponse,
};
pub use document::{sample_document, Document, DocumentKind, DocumentResponse};
pub use error_handling::{
    AcquireError, CodecError, ConfigurationError, DispatchError, DispatchStats,
    InitializationError, OutcomeKind, TransportError,
};
pub use rate_limiter::WindowedLimiter;
pub use run::{run_submissions, RunReport};
