//! The retry loop.
//!
//! [`RetryExecutor`] orchestrates attempts: invoke the operation, classify
//! the failure, wait out the backoff while watching for cancellation, and
//! re-invoke - until it can produce a terminal [`Outcome`]. Attempts within
//! one run are strictly sequential; the executor never overlaps them and
//! never busy-waits between them.
//!
//! # Quick Start
//!
//! ```rust
//! use eddy::{Outcome, RetryExecutor, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::exponential(Duration::from_millis(1)).with_max_attempts(3);
//!
//! let mut calls = 0;
//! let outcome = RetryExecutor::new(policy)
//!     .unwrap()
//!     .run(|| {
//!         calls += 1;
//!         if calls < 3 {
//!             Err("flaky")
//!         } else {
//!             Ok(calls)
//!         }
//!     });
//!
//! assert_eq!(outcome, Outcome::Succeeded { value: 3, attempts: 3 });
//! ```

use std::time::{Duration, Instant};

use crate::classify::{AlwaysRetryable, Classification, ErrorClassifier};
use crate::jitter::{self, RandomSource};
use crate::outcome::{Attempt, AttemptOutcome, Outcome};
use crate::policy::{PolicyError, RetryPolicy};
use crate::token::CancellationToken;

#[cfg(feature = "async")]
use std::future::Future;

/// Runs an operation under a [`RetryPolicy`] until it succeeds, exhausts its
/// attempts, or is cancelled.
///
/// The executor is configured once and then drives one run at a time. For
/// concurrent runs, give each caller its own executor over a clone of the
/// policy - policies are immutable data and safe to share; the executor's
/// own state (the injected random source) is not.
///
/// # Collaborators
///
/// - [`with_classifier`](Self::with_classifier) decides which failures are
///   transient (default: all of them).
/// - [`with_token`](Self::with_token) makes the run cancellable between
///   attempts and during backoff waits.
/// - [`with_random_source`](Self::with_random_source) /
///   [`with_jitter_seed`](Self::with_jitter_seed) control jitter randomness.
///
/// # Stalled operations
///
/// The executor treats each invocation as an opaque unit: it will not abort
/// an operation that never returns. Operations that can stall must carry
/// their own timeout.
///
/// # Examples
///
/// Distinguishing transient from terminal failures:
///
/// ```rust
/// use eddy::{retryable_when, Outcome, RetryExecutor, RetryPolicy};
/// use std::time::Duration;
///
/// #[derive(Debug, PartialEq)]
/// enum DbError {
///     Busy,
///     SchemaMismatch,
/// }
///
/// let policy = RetryPolicy::fixed(Duration::from_millis(1)).with_max_attempts(5);
/// let outcome: Outcome<(), _> = RetryExecutor::new(policy)
///     .unwrap()
///     .with_classifier(retryable_when(|e: &DbError| *e == DbError::Busy))
///     .run(|| Err(DbError::SchemaMismatch));
///
/// // A terminal error stops the loop on the spot.
/// assert_eq!(
///     outcome,
///     Outcome::Exhausted { error: DbError::SchemaMismatch, attempts: 1 }
/// );
/// ```
pub struct RetryExecutor<C = AlwaysRetryable> {
    policy: RetryPolicy,
    classifier: C,
    token: Option<CancellationToken>,
    random: Option<Box<dyn RandomSource + Send>>,
}

impl RetryExecutor<AlwaysRetryable> {
    /// Create an executor over a validated policy.
    ///
    /// The policy is checked eagerly; a misconfigured one (zero attempts,
    /// zero base delay, cap below base, multiplier below 1) is rejected here,
    /// before any attempt could run.
    ///
    /// # Errors
    ///
    /// Returns the [`PolicyError`] describing the first misconfiguration
    /// found.
    pub fn new(policy: RetryPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self {
            policy,
            classifier: AlwaysRetryable,
            token: None,
            random: None,
        })
    }
}

impl<C> RetryExecutor<C> {
    /// Replace the error classifier.
    ///
    /// The classifier is consulted exactly once per failed attempt. Errors
    /// classified [`Fatal`](Classification::Fatal) stop the loop immediately,
    /// with no backoff wait, even on the first attempt.
    pub fn with_classifier<D>(self, classifier: D) -> RetryExecutor<D> {
        RetryExecutor {
            policy: self.policy,
            classifier,
            token: self.token,
            random: self.random,
        }
    }

    /// Attach a cancellation token.
    ///
    /// The token is observed immediately before each attempt and throughout
    /// each backoff wait. Cancellation observed before the first attempt
    /// yields `Cancelled { attempts: 0 }` without invoking the operation.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Inject a custom randomness source for jitter.
    pub fn with_random_source(mut self, source: Box<dyn RandomSource + Send>) -> Self {
        self.random = Some(source);
        self
    }

    /// Use a deterministic, seeded randomness source for jitter.
    ///
    /// Useful in tests: the same seed reproduces the same delay sequence.
    #[cfg(feature = "jitter")]
    pub fn with_jitter_seed(mut self, seed: u64) -> Self {
        self.random = Some(Box::new(jitter::SeededRandom::new(seed)));
        self
    }

    /// The policy this executor runs under.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run the operation until success, exhaustion, or cancellation.
    ///
    /// The operation is invoked at least once (unless cancellation was
    /// already signalled) and at most `max_attempts` times.
    pub fn run<T, E, F>(&mut self, operation: F) -> Outcome<T, E>
    where
        C: ErrorClassifier<E>,
        F: FnMut() -> Result<T, E>,
    {
        self.run_observed(operation, |_: &Attempt<'_, T, E>| {})
    }

    /// Like [`run`](Self::run), invoking `on_attempt` synchronously after
    /// every attempt concludes - success or failure.
    ///
    /// The hook receives the immutable [`Attempt`] record, including the
    /// backoff delay that will follow (if any). It runs on the retry loop's
    /// own thread and should not block for long.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eddy::{RetryExecutor, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(1)).with_max_attempts(3);
    ///
    /// let mut calls = 0;
    /// let mut waits = Vec::new();
    /// let outcome = RetryExecutor::new(policy)
    ///     .unwrap()
    ///     .run_observed(
    ///         || {
    ///             calls += 1;
    ///             if calls < 3 { Err("flaky") } else { Ok(calls) }
    ///         },
    ///         |attempt| waits.push(attempt.wait_before_next),
    ///     );
    ///
    /// assert!(outcome.is_succeeded());
    /// // Two failures each scheduled a wait; the success did not.
    /// assert_eq!(waits.len(), 3);
    /// assert!(waits[0].is_some() && waits[1].is_some());
    /// assert!(waits[2].is_none());
    /// ```
    pub fn run_observed<T, E, F, H>(&mut self, mut operation: F, mut on_attempt: H) -> Outcome<T, E>
    where
        C: ErrorClassifier<E>,
        F: FnMut() -> Result<T, E>,
        H: FnMut(&Attempt<'_, T, E>),
    {
        let run_start = Instant::now();
        let mut attempts = 0u32;

        loop {
            if self.is_cancelled() {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempts, "retry cancelled before attempt");
                return Outcome::Cancelled { attempts };
            }

            let index = attempts + 1;
            let started_at = Instant::now();

            match operation() {
                Ok(value) => {
                    attempts = index;
                    on_attempt(&Attempt {
                        index,
                        started_at,
                        outcome: AttemptOutcome::Success(&value),
                        wait_before_next: None,
                        elapsed: run_start.elapsed(),
                    });
                    #[cfg(feature = "tracing")]
                    if attempts > 1 {
                        tracing::trace!(attempts, "retry succeeded");
                    }
                    return Outcome::Succeeded { value, attempts };
                }
                Err(error) => {
                    attempts = index;
                    let wait = self.wait_after_failure(index, &error);
                    on_attempt(&Attempt {
                        index,
                        started_at,
                        outcome: AttemptOutcome::Failure(&error),
                        wait_before_next: wait,
                        elapsed: run_start.elapsed(),
                    });
                    match wait {
                        None => {
                            #[cfg(feature = "tracing")]
                            tracing::trace!(attempts, "retries exhausted");
                            return Outcome::Exhausted { error, attempts };
                        }
                        Some(delay) => {
                            #[cfg(feature = "tracing")]
                            tracing::trace!(
                                attempt = index,
                                delay_ms = delay.as_millis() as u64,
                                "retrying after failure"
                            );
                            if self.wait(delay) {
                                #[cfg(feature = "tracing")]
                                tracing::debug!(attempts, "retry cancelled during backoff");
                                return Outcome::Cancelled { attempts };
                            }
                        }
                    }
                }
            }
        }
    }

    /// Run an async operation until success, exhaustion, or cancellation.
    ///
    /// `operation` is a factory invoked once per attempt; each call produces
    /// a fresh future, which is semantically right for I/O that should be
    /// recreated (fresh connections, new request IDs) rather than cloned.
    ///
    /// Cancellation interrupts the backoff sleep but never the operation's
    /// own future - an in-flight attempt runs to completion. Operations that
    /// can stall must carry their own timeout.
    #[cfg(feature = "async")]
    pub async fn run_async<T, E, F, Fut>(&mut self, operation: F) -> Outcome<T, E>
    where
        C: ErrorClassifier<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_async_observed(operation, |_: &Attempt<'_, T, E>| {})
            .await
    }

    /// Like [`run_async`](Self::run_async), invoking `on_attempt`
    /// synchronously after every attempt concludes.
    #[cfg(feature = "async")]
    pub async fn run_async_observed<T, E, F, Fut, H>(
        &mut self,
        mut operation: F,
        mut on_attempt: H,
    ) -> Outcome<T, E>
    where
        C: ErrorClassifier<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        H: FnMut(&Attempt<'_, T, E>),
    {
        let run_start = Instant::now();
        let mut attempts = 0u32;

        loop {
            if self.is_cancelled() {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempts, "retry cancelled before attempt");
                return Outcome::Cancelled { attempts };
            }

            let index = attempts + 1;
            let started_at = Instant::now();

            match operation().await {
                Ok(value) => {
                    attempts = index;
                    on_attempt(&Attempt {
                        index,
                        started_at,
                        outcome: AttemptOutcome::Success(&value),
                        wait_before_next: None,
                        elapsed: run_start.elapsed(),
                    });
                    #[cfg(feature = "tracing")]
                    if attempts > 1 {
                        tracing::trace!(attempts, "retry succeeded");
                    }
                    return Outcome::Succeeded { value, attempts };
                }
                Err(error) => {
                    attempts = index;
                    let wait = self.wait_after_failure(index, &error);
                    on_attempt(&Attempt {
                        index,
                        started_at,
                        outcome: AttemptOutcome::Failure(&error),
                        wait_before_next: wait,
                        elapsed: run_start.elapsed(),
                    });
                    match wait {
                        None => {
                            #[cfg(feature = "tracing")]
                            tracing::trace!(attempts, "retries exhausted");
                            return Outcome::Exhausted { error, attempts };
                        }
                        Some(delay) => {
                            #[cfg(feature = "tracing")]
                            tracing::trace!(
                                attempt = index,
                                delay_ms = delay.as_millis() as u64,
                                "retrying after failure"
                            );
                            if self.wait_async(delay).await {
                                #[cfg(feature = "tracing")]
                                tracing::debug!(attempts, "retry cancelled during backoff");
                                return Outcome::Cancelled { attempts };
                            }
                        }
                    }
                }
            }
        }
    }

    /// Decide what follows failed attempt `index`: `Some(delay)` to wait and
    /// retry, `None` to stop. Classifies the error exactly once.
    fn wait_after_failure<E>(&mut self, index: u32, error: &E) -> Option<Duration>
    where
        C: ErrorClassifier<E>,
    {
        match self.classifier.classify(error) {
            Classification::Fatal => None,
            Classification::Retryable if index >= self.policy.max_attempts() => None,
            Classification::Retryable => Some(self.next_delay(index)),
        }
    }

    fn next_delay(&mut self, attempt: u32) -> Duration {
        let raw = self.policy.delay_for_attempt(attempt);
        if !self.policy.jitter() {
            return raw;
        }
        match self.random.as_deref_mut() {
            Some(source) => jitter::full_jitter(raw, source),
            None => jitter::default_jitter(raw),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(|t| t.is_cancelled())
    }

    /// Wait out a backoff delay; true if cancellation cut it short.
    fn wait(&self, delay: Duration) -> bool {
        match &self.token {
            Some(token) => token.wait_timeout(delay),
            None => {
                std::thread::sleep(delay);
                false
            }
        }
    }

    #[cfg(feature = "async")]
    async fn wait_async(&self, delay: Duration) -> bool {
        match &self.token {
            Some(token) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => false,
                    _ = token.cancelled() => true,
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                false
            }
        }
    }
}

impl<C> std::fmt::Debug for RetryExecutor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("policy", &self.policy)
            .field("token", &self.token)
            .field("has_random_source", &self.random.is_some())
            .finish_non_exhaustive()
    }
}
