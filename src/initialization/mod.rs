//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger
//! - HTTP client
//! - Request throttle
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

use std::sync::Arc;

use crate::config::Config;
use crate::error_handling::ConfigurationError;
use crate::rate_limiter::WindowedLimiter;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Initializes the request throttle described by `config`.
///
/// Allows `request_limit` calls per `window_seconds`. Must be called inside a
/// Tokio runtime; the limiter's reset task runs until the last `Arc` is dropped.
///
/// # Errors
///
/// Returns a `ConfigurationError` for a zero limit or window, or when no
/// runtime is available.
pub fn init_limiter(config: &Config) -> Result<Arc<WindowedLimiter>, ConfigurationError> {
    let capacity = usize::try_from(config.request_limit).unwrap_or(usize::MAX);
    let limiter = WindowedLimiter::new(capacity, config.window())?;
    Ok(Arc::new(limiter))
}
