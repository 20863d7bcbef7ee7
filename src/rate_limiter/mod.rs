//! Fixed-window rate limiting.
//!
//! This module implements a permit limiter for outbound calls:
//! - At most `capacity` permits are granted per `window`
//! - At every window boundary the available count is reset to `capacity`
//!   (unused permits are not carried over, consumed ones are not owed)
//! - Callers that find no permit wait in a FIFO queue
//! - A waiting caller can withdraw at any time without consuming a permit

mod limiter;
mod window;

pub use limiter::WindowedLimiter;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::AcquireError;
    use futures::FutureExt;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    #[tokio::test(start_paused = true)]
    async fn test_capacity_acquires_complete_immediately() {
        let limiter = WindowedLimiter::new(3, Duration::from_secs(1)).unwrap();

        for _ in 0..3 {
            assert_eq!(limiter.acquire().now_or_never(), Some(Ok(())));
        }
        // The fourth would have to wait; dropping it withdraws cleanly
        assert!(limiter.acquire().now_or_never().is_none());
        assert_eq!(limiter.available(), 0);
        assert_eq!(limiter.waiting(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extra_acquire_waits_for_next_window() {
        let window = Duration::from_secs(1);
        let limiter = WindowedLimiter::new(2, window).unwrap();
        let start = Instant::now();

        limiter.acquire().await.unwrap();
        limiter.acquire().await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(1));

        limiter.acquire().await.unwrap();
        let waited = start.elapsed();
        assert!(
            waited >= window && waited < window + Duration::from_millis(50),
            "third acquire should be admitted at the first reset, waited {waited:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restores_full_capacity() {
        let limiter = WindowedLimiter::new(4, Duration::from_secs(1)).unwrap();
        for _ in 0..3 {
            limiter.acquire().await.unwrap();
        }
        assert_eq!(limiter.available(), 1);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(limiter.available(), 4);

        // An idle window does not bank extra permits
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(limiter.available(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_are_served_in_arrival_order() {
        let limiter = Arc::new(WindowedLimiter::new(1, Duration::from_secs(1)).unwrap());
        limiter.acquire().await.unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for id in 0..4usize {
            let task_limiter = Arc::clone(&limiter);
            let task_order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                task_limiter.acquire().await.unwrap();
                task_order.lock().unwrap().push(id);
            }));
            // Make sure this caller is queued before the next one arrives
            while limiter.waiting() < id + 1 {
                tokio::task::yield_now().await;
            }
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_arrival_does_not_overtake_queue() {
        let limiter = WindowedLimiter::new(1, Duration::from_secs(1)).unwrap();
        limiter.acquire().await.unwrap();

        let mut queued = Box::pin(limiter.acquire());
        assert!(futures::poll!(&mut queued).is_pending());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        // The reset granted the queued caller; nothing is left for a newcomer
        assert!(!limiter.try_acquire());
        assert_eq!(queued.await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_waiter_does_not_disturb_count() {
        let limiter = WindowedLimiter::new(1, Duration::from_secs(1)).unwrap();
        limiter.acquire().await.unwrap();

        let token = CancellationToken::new();
        let mut pending = Box::pin(limiter.acquire_or_cancel(&token));
        assert!(futures::poll!(&mut pending).is_pending());
        assert_eq!(limiter.waiting(), 1);

        token.cancel();
        assert_eq!(pending.await, Err(AcquireError::Cancelled));
        assert_eq!(limiter.waiting(), 0);
        assert_eq!(limiter.available(), 0);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_token_is_rejected() {
        let limiter = WindowedLimiter::new(1, Duration::from_secs(1)).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(
            limiter.acquire_or_cancel(&token).await,
            Err(AcquireError::Cancelled)
        );
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_fails_waiters() {
        let limiter = WindowedLimiter::new(1, Duration::from_secs(1)).unwrap();
        limiter.acquire().await.unwrap();

        let mut pending = Box::pin(limiter.acquire());
        assert!(futures::poll!(&mut pending).is_pending());

        limiter.close();
        assert!(limiter.is_closed());
        assert_eq!(pending.await, Err(AcquireError::Closed));
        assert_eq!(limiter.acquire().await, Err(AcquireError::Closed));

        // No resets after close
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(limiter.available(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throughput_bounded_per_window() {
        let limiter = Arc::new(WindowedLimiter::new(2, Duration::from_secs(1)).unwrap());
        let start = Instant::now();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.acquire().await.unwrap();
                    start.elapsed().as_secs()
                })
            })
            .collect();

        let mut admitted_at = Vec::new();
        for handle in handles {
            admitted_at.push(handle.await.unwrap());
        }
        admitted_at.sort_unstable();
        assert_eq!(admitted_at, vec![0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_accessors() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        runtime.block_on(async {
            let limiter = WindowedLimiter::new(7, Duration::from_millis(250)).unwrap();
            assert_eq!(limiter.capacity(), 7);
            assert_eq!(limiter.window(), Duration::from_millis(250));
            assert_eq!(limiter.available(), 7);
            assert!(!limiter.is_closed());
        });
    }
}
