//! Cooperative cancellation.
//!
//! A [`CancellationToken`] is a process-local flag shared between a caller
//! and a retry loop. The caller (or any other thread) signals it; the loop
//! observes it at its suspension points - immediately before each attempt
//! and throughout each backoff wait - and stops. Once cancelled, a token
//! never resets.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// A clonable cancellation signal.
///
/// Clones share the underlying flag, so a token handed to an executor can be
/// cancelled from anywhere:
///
/// ```rust
/// use eddy::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
///
/// std::thread::spawn(move || handle.cancel()).join().unwrap();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: Mutex<bool>,
    cond: Condvar,
    #[cfg(feature = "async")]
    notify: tokio::sync::Notify,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            cancelled: Mutex::new(false),
            cond: Condvar::new(),
            #[cfg(feature = "async")]
            notify: tokio::sync::Notify::new(),
        }
    }
}

impl CancellationToken {
    /// Create a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation, waking any blocked or suspended waiters.
    ///
    /// Safe to call from any thread, any number of times; the token stays
    /// cancelled forever after the first call.
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock().unwrap();
        if !*cancelled {
            *cancelled = true;
            self.inner.cond.notify_all();
            #[cfg(feature = "async")]
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock().unwrap()
    }

    /// Block for up to `duration`, returning early if cancellation arrives.
    ///
    /// Returns `true` if the token was cancelled (before or during the
    /// wait), `false` if the full duration elapsed. The wait parks on a
    /// condition variable; it does not poll.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock().unwrap();

        let deadline = match Instant::now().checked_add(duration) {
            Some(deadline) => deadline,
            // Duration too large to represent a deadline; only cancellation
            // can end this wait.
            None => {
                while !*cancelled {
                    cancelled = self.inner.cond.wait(cancelled).unwrap();
                }
                return true;
            }
        };

        while !*cancelled {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            let (guard, timeout) = self.inner.cond.wait_timeout(cancelled, remaining).unwrap();
            cancelled = guard;
            if timeout.timed_out() {
                return *cancelled;
            }
        }
        true
    }

    /// Resolve once cancellation is signalled.
    ///
    /// Suitable for `tokio::select!` against a sleep; completes immediately
    /// if the token is already cancelled.
    #[cfg(feature = "async")]
    pub async fn cancelled(&self) {
        use std::pin::pin;

        let mut notified = pin!(self.inner.notify.notified());
        loop {
            if self.is_cancelled() {
                return;
            }
            // Register interest before the re-check so a concurrent cancel()
            // cannot slip between the check and the await.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.as_mut().await;
            notified.set(self.inner.notify.notified());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_sticky() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn wait_timeout_elapses_without_cancellation() {
        let token = CancellationToken::new();
        let start = Instant::now();

        assert!(!token.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn wait_timeout_returns_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();

        let start = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn wait_timeout_interrupted_by_concurrent_cancel() {
        let token = CancellationToken::new();
        let handle = token.clone();

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.cancel();
        });

        let start = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(5));

        canceller.join().unwrap();
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn cancelled_future_resolves_on_signal() {
        let token = CancellationToken::new();
        let handle = token.clone();

        let waiter = tokio::spawn(async move { handle.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        waiter.await.unwrap();
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn cancelled_future_resolves_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancelled().await;
    }
}
