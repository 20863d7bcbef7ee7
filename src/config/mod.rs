//! Client configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoint, timeouts, limits)
//! - HTTP header name constants
//! - The `Config` type, usable programmatically or parsed from the command line

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Config, LogFormat, LogLevel};
