//! Error type definitions.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Invalid construction parameters.
///
/// Reported by constructors and `Config::validate`, never deferred to first use.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The permit budget per window must be positive.
    #[error("request limit must be positive")]
    ZeroCapacity,

    /// The window duration must be positive.
    #[error("window duration must be positive")]
    ZeroWindow,

    /// The window is too long to schedule a reset on this clock.
    #[error("window duration {0:?} is out of range")]
    WindowOutOfRange(Duration),

    /// The request timeout must be positive.
    #[error("request timeout must be positive")]
    ZeroTimeout,

    /// The request timeout is too long to form a deadline on this clock.
    #[error("request timeout {0:?} is out of range")]
    TimeoutOutOfRange(Duration),

    /// The base URL is not a usable http(s) URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The limiter needs a Tokio runtime to drive its window resets.
    #[error("no Tokio runtime available to schedule window resets")]
    MissingRuntime,
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigurationError),
}

/// Failure waiting for a permit. Neither variant consumes a permit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireError {
    /// The caller withdrew before a permit was granted.
    #[error("permit acquisition cancelled")]
    Cancelled,

    /// The limiter was closed.
    #[error("limiter closed")]
    Closed,
}

/// Connectivity-level failure of the transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The call did not complete within its timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Any other transport failure (request building, body read, ...).
    #[error("transport error: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failure to encode a request body or decode a response body.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The value could not be serialized.
    #[error("failed to encode body: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The bytes could not be parsed into the expected shape.
    #[error("failed to decode body: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The error payload parsed but carried no message field.
    #[error("error payload has no '{0}' field")]
    MissingField(String),
}

/// Terminal failure of a submitted request.
///
/// Every submission resolves to exactly one success value or one of these.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The caller withdrew (or the limiter closed) before a permit was granted.
    /// No transport call was made.
    #[error("request cancelled before dispatch")]
    Cancelled,

    /// The remote service rejected the request.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Message extracted from the error payload
        message: String,
    },

    /// A success or error body could not be decoded.
    #[error("malformed response (status {status}): {source}")]
    MalformedResponse {
        /// HTTP status code of the response
        status: u16,
        /// Decoding failure
        #[source]
        source: CodecError,
    },

    /// Connectivity failure or timeout.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The request body could not be encoded; nothing was submitted.
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] CodecError),
}

impl DispatchError {
    /// Outcome category of this failure.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            DispatchError::Cancelled => OutcomeKind::Cancelled,
            DispatchError::Api { .. } => OutcomeKind::ApiError,
            DispatchError::MalformedResponse { .. } => OutcomeKind::MalformedResponse,
            DispatchError::Transport(_) => OutcomeKind::TransportFailure,
            DispatchError::InvalidRequest(_) => OutcomeKind::InvalidRequest,
        }
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Api { status, .. } | DispatchError::MalformedResponse { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Whether the failure is a timeout of the overall call.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DispatchError::Transport(TransportError::Timeout(_)))
    }
}

/// Terminal state of a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum OutcomeKind {
    /// 2xx response decoded into the expected value
    Succeeded,
    /// Non-2xx response with a decodable error payload
    ApiError,
    /// Success or error body could not be decoded
    MalformedResponse,
    /// Connectivity failure or timeout
    TransportFailure,
    /// Withdrawn before a permit was granted
    Cancelled,
    /// Request body could not be encoded
    InvalidRequest,
}

impl OutcomeKind {
    /// Human-readable label used in summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Succeeded => "Succeeded",
            OutcomeKind::ApiError => "API error",
            OutcomeKind::MalformedResponse => "Malformed response",
            OutcomeKind::TransportFailure => "Transport failure",
            OutcomeKind::Cancelled => "Cancelled",
            OutcomeKind::InvalidRequest => "Invalid request",
        }
    }

    /// Whether this is the success state.
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeKind::Succeeded)
    }
}
