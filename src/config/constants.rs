//! Configuration constants.
//!
//! Defaults for the registration endpoint, the request throttle and the
//! HTTP client.

use std::time::Duration;

/// Base URL of the document registration API.
pub const DEFAULT_BASE_URL: &str = "https://ismp.crpt.ru/api/v3";

/// Path of the document creation endpoint, relative to the base URL.
pub const DOCUMENT_CREATION_PATH: &str = "/lk/documents/create";

/// Overall bound on a single call (permit wait plus transport).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

// Throttle defaults
/// Calls allowed per window
pub const DEFAULT_REQUEST_LIMIT: u32 = 1;
/// Window length in seconds
pub const DEFAULT_WINDOW_SECS: u64 = 1;
/// Concurrent submissions issued by the CLI
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;

/// Default User-Agent string for outbound requests.
pub const DEFAULT_USER_AGENT: &str = concat!("crpt_client/", env!("CARGO_PKG_VERSION"));

/// Field of the error payload that carries the human-readable message.
pub const ERROR_MESSAGE_FIELD: &str = "error_message";

/// Maximum response body length kept in diagnostic events (characters).
/// Longer bodies are truncated before they reach the event sink.
pub const MAX_EVENT_BODY_CHARS: usize = 2000;
