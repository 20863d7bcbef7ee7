//! Transport capability.
//!
//! The dispatcher never speaks HTTP itself; it hands each admitted request to
//! a `Transport` and gets back a status code and the raw body.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error_handling::{categorize_reqwest_error, TransportError};

use super::request::OutboundRequest;

/// Status and raw body of a completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Undecoded response body
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response from a status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        TransportResponse {
            status,
            body: body.into(),
        }
    }
}

/// Asynchronous "send" capability.
///
/// Implementations should honour `timeout`; the dispatcher additionally bounds
/// the call with the same deadline, so a transport that ignores it still
/// cannot hang a caller.
pub trait Transport: Send + Sync {
    /// Performs one call.
    fn send(
        &self,
        request: &OutboundRequest,
        timeout: Duration,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: &OutboundRequest,
        timeout: Duration,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        (**self).send(request, timeout)
    }
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Arc<reqwest::Client>,
}

impl HttpTransport {
    /// Wraps a configured client (see `initialization::init_client`).
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        HttpTransport { client }
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &OutboundRequest,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.target())
            .timeout(timeout);
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body().to_vec())
            .send()
            .await
            .map_err(|e| categorize_reqwest_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| categorize_reqwest_error(e, timeout))?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
