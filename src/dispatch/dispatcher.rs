//! Rate-limited dispatcher.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;

use super::codec::{Codec, JsonCodec};
use super::events::{render_body, DispatchEvent, EventSink, LogSink};
use super::request::OutboundRequest;
use super::transport::{Transport, TransportResponse};
use crate::config::REQUEST_TIMEOUT;
use crate::error_handling::{DispatchError, DispatchStats, OutcomeKind, TransportError};
use crate::rate_limiter::WindowedLimiter;

/// Whether a status means the request was accepted.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Sends requests through a transport, never faster than its limiter allows.
///
/// Each submission waits for one permit, performs exactly one transport call,
/// and resolves to exactly one outcome:
///
/// - 2xx: the body decoded into the caller's type, or `MalformedResponse`
/// - other status: `Api { status, message }` from the error payload, or
///   `MalformedResponse` carrying the original status
/// - connectivity failure or timeout: `Transport`
/// - withdrawn while waiting for a permit: `Cancelled` (nothing is sent)
///
/// No retries are performed. The dispatcher is shareable across tasks
/// (wrap it in an `Arc`); the limiter is the only state shared between
/// submissions.
pub struct BoundedDispatcher<T, C = JsonCodec> {
    limiter: Arc<WindowedLimiter>,
    transport: T,
    codec: C,
    sink: Arc<dyn EventSink>,
    stats: Arc<DispatchStats>,
    timeout: Duration,
    sequence: AtomicU64,
}

impl<T: Transport> BoundedDispatcher<T, JsonCodec> {
    /// Creates a dispatcher with the JSON codec, the log sink and the default
    /// request timeout.
    pub fn new(limiter: Arc<WindowedLimiter>, transport: T) -> Self {
        Self::with_codec(limiter, transport, JsonCodec::new())
    }
}

impl<T: Transport, C: Codec> BoundedDispatcher<T, C> {
    /// Creates a dispatcher with a specific codec.
    pub fn with_codec(limiter: Arc<WindowedLimiter>, transport: T, codec: C) -> Self {
        BoundedDispatcher {
            limiter,
            transport,
            codec,
            sink: Arc::new(LogSink),
            stats: Arc::new(DispatchStats::new()),
            timeout: REQUEST_TIMEOUT,
            sequence: AtomicU64::new(0),
        }
    }

    /// Replaces the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the default timeout applied by `submit`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shares an existing statistics tracker.
    pub fn with_stats(mut self, stats: Arc<DispatchStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Limiter gating this dispatcher.
    pub fn limiter(&self) -> &Arc<WindowedLimiter> {
        &self.limiter
    }

    /// Codec used for request and response bodies.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Outcome counters.
    pub fn stats(&self) -> &Arc<DispatchStats> {
        &self.stats
    }

    /// Default timeout applied by `submit`.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submits a request with the default timeout.
    ///
    /// # Errors
    ///
    /// See the type-level documentation for the outcome mapping.
    pub async fn submit<R: DeserializeOwned>(
        &self,
        request: OutboundRequest,
    ) -> Result<R, DispatchError> {
        self.submit_with(request, self.timeout, &CancellationToken::new())
            .await
    }

    /// Submits a request bounded by `timeout` (permit wait plus transport).
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Transport(TransportError::Timeout(_))` when the
    /// bound is exceeded, even if the request never left the queue.
    pub async fn submit_with_timeout<R: DeserializeOwned>(
        &self,
        request: OutboundRequest,
        timeout: Duration,
    ) -> Result<R, DispatchError> {
        self.submit_with(request, timeout, &CancellationToken::new())
            .await
    }

    /// Submits a request that the caller can withdraw while it waits for a permit.
    ///
    /// Cancelling after the permit is granted has no effect; the call proceeds.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Cancelled` if `cancel` fires first.
    pub async fn submit_cancellable<R: DeserializeOwned>(
        &self,
        request: OutboundRequest,
        cancel: &CancellationToken,
    ) -> Result<R, DispatchError> {
        self.submit_with(request, self.timeout, cancel).await
    }

    /// Submits a request with an explicit timeout and cancellation token.
    ///
    /// # Errors
    ///
    /// See the type-level documentation for the outcome mapping.
    pub async fn submit_with<R: DeserializeOwned>(
        &self,
        request: OutboundRequest,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<R, DispatchError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let started = Instant::now();

        // A timeout too long for the clock means no deadline at all
        let deadline = started.checked_add(timeout);
        let exchanged = self
            .exchange(sequence, &request, deadline, timeout, cancel)
            .await;

        let (status, body, outcome) = match exchanged {
            Ok(response) => (
                Some(response.status),
                Some(render_body(&response.body)),
                classify::<R, C>(&self.codec, &response),
            ),
            Err(error) => (None, None, Err(error)),
        };

        let kind = match &outcome {
            Ok(_) => OutcomeKind::Succeeded,
            Err(error) => error.kind(),
        };
        self.stats.increment(kind);
        self.sink.record(&DispatchEvent {
            sequence,
            method: request.method().clone(),
            target: request.target().to_string(),
            status,
            body,
            outcome: kind,
            elapsed: started.elapsed(),
        });

        outcome
    }

    /// Waits for a permit, then performs the transport call, all before `deadline`.
    async fn exchange(
        &self,
        sequence: u64,
        request: &OutboundRequest,
        deadline: Option<Instant>,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, DispatchError> {
        log::debug!(
            "Request #{sequence}: {} {} waiting for permit",
            request.method(),
            request.target()
        );

        match before(deadline, self.limiter.acquire_or_cancel(cancel)).await {
            None => {
                log::debug!("Request #{sequence}: timed out waiting for permit");
                return Err(TransportError::Timeout(timeout).into());
            }
            Some(Err(error)) => {
                log::debug!("Request #{sequence}: {error} before dispatch");
                return Err(DispatchError::Cancelled);
            }
            Some(Ok(())) => {}
        }

        let remaining = deadline.map_or(timeout, |deadline| {
            deadline.saturating_duration_since(Instant::now())
        });
        log::debug!("Request #{sequence}: permit granted, sending");

        match before(deadline, self.transport.send(request, remaining)).await {
            // Report the caller's bound, not whatever remained of it
            None | Some(Err(TransportError::Timeout(_))) => {
                Err(TransportError::Timeout(timeout).into())
            }
            Some(result) => result.map_err(DispatchError::from),
        }
    }
}

/// Runs `future` to completion, or until `deadline` passes (`None` if it did).
async fn before<F: Future>(deadline: Option<Instant>, future: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => timeout_at(deadline, future).await.ok(),
        None => Some(future.await),
    }
}

/// Maps a completed call to the caller's value or a typed failure.
fn classify<R: DeserializeOwned, C: Codec>(
    codec: &C,
    response: &TransportResponse,
) -> Result<R, DispatchError> {
    let status = response.status;
    if is_success_status(status) {
        return codec
            .decode(&response.body)
            .map_err(|source| DispatchError::MalformedResponse { status, source });
    }

    match codec.decode_error_message(&response.body) {
        Ok(message) => Err(DispatchError::Api { status, message }),
        Err(source) => Err(DispatchError::MalformedResponse { status, source }),
    }
}
