//! Transport error categorization.

use std::time::Duration;

use super::types::TransportError;

/// Categorizes a `reqwest::Error` into a `TransportError`.
///
/// `timeout` is the bound that was applied to the call; it is reported back
/// when reqwest signals a timeout.
pub fn categorize_reqwest_error(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout)
    } else if error.is_connect() {
        TransportError::Connect(Box::new(error))
    } else {
        TransportError::Other(Box::new(error))
    }
}
