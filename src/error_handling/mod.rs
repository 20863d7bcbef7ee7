//! Error handling and outcome statistics.
//!
//! This module provides:
//! - Error type definitions for configuration, initialization and dispatch
//! - Categorization of reqwest failures into transport errors
//! - Outcome statistics tracking

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use stats::DispatchStats;
pub use types::{
    AcquireError, CodecError, ConfigurationError, DispatchError, InitializationError,
    OutcomeKind, TransportError,
};
