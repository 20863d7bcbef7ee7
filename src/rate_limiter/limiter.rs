//! Fixed-window rate limiter implementation.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::window::WindowState;
use crate::error_handling::{AcquireError, ConfigurationError};

/// Grants at most `capacity` permits per `window`, shared across any number of
/// concurrent callers.
///
/// A background task resets the available count to `capacity` at every window
/// boundary (a hard reset: unused permits are not carried over). Callers that
/// find no permit are queued and served strictly in arrival order.
///
/// Consumption and replenishment are independent, so up to `2 * capacity`
/// permits can be granted within one wall-clock window that straddles a reset.
///
/// The reset task stops when the limiter is dropped or closed.
pub struct WindowedLimiter {
    shared: Arc<Shared>,
    shutdown: CancellationToken,
}

struct Shared {
    capacity: usize,
    window: Duration,
    state: Mutex<WindowState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, WindowState> {
        // The state stays consistent even if a holder panicked; every mutation is a single step
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reset(&self) {
        let mut state = self.lock();
        state.reset();
        log::trace!(
            "Window reset: {} permits available, {} waiting",
            state.available(),
            state.waiting()
        );
    }
}

enum Admission {
    Granted,
    Rejected(AcquireError),
    Queued(u64, oneshot::Receiver<u64>),
}

impl WindowedLimiter {
    /// Creates a limiter and starts its window reset task.
    ///
    /// The first reset happens one `window` after construction.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ZeroCapacity` or `ConfigurationError::ZeroWindow`
    /// for non-positive parameters, `ConfigurationError::WindowOutOfRange` when
    /// the first reset cannot be represented on the clock, and
    /// `ConfigurationError::MissingRuntime` when called outside a Tokio runtime.
    pub fn new(capacity: usize, window: Duration) -> Result<Self, ConfigurationError> {
        if capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        if window.is_zero() {
            return Err(ConfigurationError::ZeroWindow);
        }
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| ConfigurationError::MissingRuntime)?;
        let first_reset = Instant::now()
            .checked_add(window)
            .ok_or(ConfigurationError::WindowOutOfRange(window))?;

        let shared = Arc::new(Shared {
            capacity,
            window,
            state: Mutex::new(WindowState::new(capacity)),
        });
        let shutdown = CancellationToken::new();

        handle.spawn(run_window_resets(
            Arc::clone(&shared),
            first_reset,
            shutdown.clone(),
        ));

        log::debug!("Rate limiter started: {capacity} requests per {window:?}");
        Ok(WindowedLimiter { shared, shutdown })
    }

    /// Waits for a permit.
    ///
    /// Dropping the returned future before it completes withdraws the caller
    /// without consuming a permit.
    ///
    /// # Errors
    ///
    /// Returns `AcquireError::Closed` if the limiter is or becomes closed.
    pub async fn acquire(&self) -> Result<(), AcquireError> {
        self.acquire_or_cancel(&CancellationToken::new()).await
    }

    /// Waits for a permit until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns `AcquireError::Cancelled` if `cancel` fires before a permit is
    /// granted, or `AcquireError::Closed` if the limiter closes. Neither consumes
    /// a permit.
    pub async fn acquire_or_cancel(&self, cancel: &CancellationToken) -> Result<(), AcquireError> {
        let (ticket, receiver) = match self.admit(cancel) {
            Admission::Granted => return Ok(()),
            Admission::Rejected(error) => return Err(error),
            Admission::Queued(ticket, receiver) => (ticket, receiver),
        };

        let mut pending = PendingAcquire {
            shared: &self.shared,
            ticket,
            receiver,
            settled: false,
        };

        let granted = tokio::select! {
            biased;
            granted = &mut pending.receiver => Some(granted.is_ok()),
            _ = cancel.cancelled() => None,
        };

        match granted {
            Some(true) => {
                pending.settled = true;
                Ok(())
            }
            Some(false) => {
                pending.settled = true;
                Err(AcquireError::Closed)
            }
            // Dropping `pending` withdraws the ticket
            None => Err(AcquireError::Cancelled),
        }
    }

    /// Takes a permit only if one is free and nobody is queued ahead.
    pub fn try_acquire(&self) -> bool {
        self.shared.lock().try_take()
    }

    /// Permits currently grantable in this window.
    pub fn available(&self) -> usize {
        self.shared.lock().available()
    }

    /// Callers currently queued for a permit.
    pub fn waiting(&self) -> usize {
        self.shared.lock().waiting()
    }

    /// Permits per window.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Window duration.
    pub fn window(&self) -> Duration {
        self.shared.window
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().is_closed()
    }

    /// Stops window resets and fails every queued and future `acquire` with
    /// `AcquireError::Closed`.
    pub fn close(&self) {
        self.shutdown.cancel();
        self.shared.lock().close();
        log::debug!("Rate limiter closed");
    }

    fn admit(&self, cancel: &CancellationToken) -> Admission {
        let mut state = self.shared.lock();
        if state.is_closed() {
            return Admission::Rejected(AcquireError::Closed);
        }
        if cancel.is_cancelled() {
            return Admission::Rejected(AcquireError::Cancelled);
        }
        if state.try_take() {
            return Admission::Granted;
        }
        let (ticket, receiver) = state.enqueue();
        log::trace!(
            "No permit available, queued as #{ticket} ({} waiting)",
            state.waiting()
        );
        Admission::Queued(ticket, receiver)
    }
}

impl Drop for WindowedLimiter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl fmt::Debug for WindowedLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowedLimiter")
            .field("capacity", &self.shared.capacity)
            .field("window", &self.shared.window)
            .field("available", &self.available())
            .field("waiting", &self.waiting())
            .finish()
    }
}

/// A queued acquire. Dropping it unsettled withdraws the ticket, or refunds a
/// grant that arrived but was never observed.
struct PendingAcquire<'a> {
    shared: &'a Shared,
    ticket: u64,
    receiver: oneshot::Receiver<u64>,
    settled: bool,
}

impl Drop for PendingAcquire<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.shared.lock();
        if state.withdraw(self.ticket) {
            return;
        }
        // Grants are only sent under the lock, so a granted value is already here
        if let Ok(epoch) = self.receiver.try_recv() {
            state.refund(epoch);
        }
    }
}

async fn run_window_resets(shared: Arc<Shared>, first_reset: Instant, shutdown: CancellationToken) {
    let mut ticker = interval_at(first_reset, shared.window);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => shared.reset(),
            _ = shutdown.cancelled() => {
                log::debug!("Rate limiter background task shutting down");
                break;
            }
        }
    }
}
