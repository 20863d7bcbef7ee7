//! Permit accounting for a single fixed window.

use std::collections::VecDeque;

use tokio::sync::oneshot;

/// A caller suspended in `acquire()`.
///
/// The grant carries the epoch of the window it was issued in, so an unused
/// grant can be refunded only while that window is still current.
struct Waiter {
    ticket: u64,
    grant: oneshot::Sender<u64>,
}

/// Available count and FIFO waiter queue.
///
/// Every method runs under the limiter's mutex; together they form the
/// acquire/reset protocol. Invariant: `available <= capacity`, and permits are
/// only handed out directly while the queue is empty.
pub(super) struct WindowState {
    capacity: usize,
    available: usize,
    epoch: u64,
    closed: bool,
    next_ticket: u64,
    waiters: VecDeque<Waiter>,
}

impl WindowState {
    pub(super) fn new(capacity: usize) -> Self {
        WindowState {
            capacity,
            available: capacity,
            epoch: 0,
            closed: false,
            next_ticket: 0,
            waiters: VecDeque::new(),
        }
    }

    pub(super) fn available(&self) -> usize {
        self.available
    }

    pub(super) fn waiting(&self) -> usize {
        self.waiters.len()
    }

    pub(super) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Takes a permit without queueing. Fails while anyone is already waiting.
    pub(super) fn try_take(&mut self) -> bool {
        if self.closed || !self.waiters.is_empty() || self.available == 0 {
            return false;
        }
        self.available -= 1;
        true
    }

    /// Appends a waiter to the back of the queue.
    pub(super) fn enqueue(&mut self) -> (u64, oneshot::Receiver<u64>) {
        let (grant, receiver) = oneshot::channel();
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.waiters.push_back(Waiter { ticket, grant });
        (ticket, receiver)
    }

    /// Removes a waiter that has not been granted yet. Returns false if the
    /// ticket is no longer queued (it was granted or the limiter closed).
    pub(super) fn withdraw(&mut self, ticket: u64) -> bool {
        match self.waiters.iter().position(|w| w.ticket == ticket) {
            Some(index) => {
                self.waiters.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns a permit granted in `epoch` that its waiter never used.
    /// Grants from an earlier window are dropped: the reset already replaced them.
    pub(super) fn refund(&mut self, epoch: u64) {
        if self.closed || epoch != self.epoch {
            return;
        }
        self.available = (self.available + 1).min(self.capacity);
        self.grant_waiting();
    }

    /// Hard reset at a window boundary: no carry-over, no debt.
    pub(super) fn reset(&mut self) {
        if self.closed {
            return;
        }
        self.epoch += 1;
        self.available = self.capacity;
        self.grant_waiting();
    }

    /// Closes the window; queued waiters observe their grant sender dropping.
    pub(super) fn close(&mut self) {
        self.closed = true;
        self.available = 0;
        self.waiters.clear();
    }

    fn grant_waiting(&mut self) {
        while self.available > 0 {
            let Some(waiter) = self.waiters.pop_front() else {
                break;
            };
            // A failed send means the receiver is gone; nothing was consumed
            if waiter.grant.send(self.epoch).is_ok() {
                self.available -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_until_exhausted() {
        let mut state = WindowState::new(2);
        assert!(state.try_take());
        assert!(state.try_take());
        assert!(!state.try_take());
        assert_eq!(state.available(), 0);
    }

    #[test]
    fn test_reset_is_hard() {
        let mut state = WindowState::new(3);
        assert!(state.try_take());
        state.reset();
        assert_eq!(state.available(), 3);

        // Unused permits are not carried over either
        state.reset();
        assert_eq!(state.available(), 3);
    }

    #[test]
    fn test_reset_grants_in_arrival_order() {
        let mut state = WindowState::new(1);
        assert!(state.try_take());
        let (_, mut first) = state.enqueue();
        let (_, mut second) = state.enqueue();

        state.reset();
        assert_eq!(first.try_recv().ok(), Some(1));
        assert!(second.try_recv().is_err());
        assert_eq!(state.waiting(), 1);

        state.reset();
        assert_eq!(second.try_recv().ok(), Some(2));
        assert_eq!(state.waiting(), 0);
    }

    #[test]
    fn test_queued_waiters_block_direct_take() {
        let mut state = WindowState::new(1);
        let (_ticket, _receiver) = state.enqueue();
        // A permit is free but someone is queued ahead
        assert!(!state.try_take());
    }

    #[test]
    fn test_withdraw_leaves_count_untouched() {
        let mut state = WindowState::new(1);
        assert!(state.try_take());
        let (ticket, _receiver) = state.enqueue();
        assert!(state.withdraw(ticket));
        assert!(!state.withdraw(ticket));
        assert_eq!(state.available(), 0);
        assert_eq!(state.waiting(), 0);
    }

    #[test]
    fn test_dropped_receiver_is_skipped() {
        let mut state = WindowState::new(1);
        assert!(state.try_take());
        let (_, dropped) = state.enqueue();
        let (_, mut live) = state.enqueue();
        drop(dropped);

        state.reset();
        assert_eq!(live.try_recv().ok(), Some(1));
        assert_eq!(state.available(), 0);
    }

    #[test]
    fn test_refund_only_within_same_epoch() {
        let mut state = WindowState::new(1);
        assert!(state.try_take());
        let (_, mut receiver) = state.enqueue();
        state.reset();
        let epoch = receiver.try_recv().expect("granted at reset");

        state.refund(epoch);
        assert_eq!(state.available(), 1);

        assert!(state.try_take());
        state.reset();
        // Stale grant from the previous window
        state.refund(epoch);
        assert_eq!(state.available(), 1);
    }

    #[test]
    fn test_close_rejects_everything() {
        let mut state = WindowState::new(2);
        let (_, mut receiver) = {
            assert!(state.try_take());
            assert!(state.try_take());
            state.enqueue()
        };
        state.close();
        assert!(state.is_closed());
        assert!(matches!(
            receiver.try_recv(),
            Err(oneshot::error::TryRecvError::Closed)
        ));
        state.reset();
        assert_eq!(state.available(), 0);
        assert!(!state.try_take());
    }
}
