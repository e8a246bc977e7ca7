//! Terminal outcomes and per-attempt records.

use std::time::{Duration, Instant};

/// The terminal result of a full retry sequence.
///
/// Produced exactly once per run. Exhaustion and cancellation are ordinary
/// values here, not panics or propagated errors - the caller pattern matches
/// and decides what to do:
///
/// ```rust
/// use eddy::{Outcome, RetryExecutor, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::fixed(Duration::from_millis(1)).with_max_attempts(2);
/// let outcome: Outcome<(), _> = RetryExecutor::new(policy)
///     .unwrap()
///     .run(|| Err("still broken"));
///
/// match outcome {
///     Outcome::Succeeded { .. } => unreachable!(),
///     Outcome::Exhausted { error, attempts } => {
///         assert_eq!(error, "still broken");
///         assert_eq!(attempts, 2);
///     }
///     Outcome::Cancelled { .. } => unreachable!(),
/// }
/// ```
///
/// `attempts` counts invocations of the operation and never exceeds the
/// policy's `max_attempts`. It is at least 1 in every variant except
/// `Cancelled { attempts: 0 }`, which reports cancellation observed before
/// the first attempt began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// The operation returned a value.
    Succeeded {
        /// The operation's value.
        value: T,
        /// How many attempts were made, including the successful one.
        attempts: u32,
    },
    /// Attempts are exhausted: either the last allowed attempt failed, or an
    /// attempt failed with an error classified as fatal.
    Exhausted {
        /// The error from the final attempt.
        error: E,
        /// How many attempts were made.
        attempts: u32,
    },
    /// The cancellation token was signalled before or between attempts.
    Cancelled {
        /// How many attempts had completed when cancellation was observed.
        attempts: u32,
    },
}

impl<T, E> Outcome<T, E> {
    /// True if the run produced a value.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }

    /// True if attempts were exhausted (including fatal short-circuits).
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Outcome::Exhausted { .. })
    }

    /// True if the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled { .. })
    }

    /// How many attempts were made.
    pub fn attempts(&self) -> u32 {
        match self {
            Outcome::Succeeded { attempts, .. }
            | Outcome::Exhausted { attempts, .. }
            | Outcome::Cancelled { attempts } => *attempts,
        }
    }

    /// The success value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Succeeded { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The final error, if attempts were exhausted.
    pub fn error(&self) -> Option<&E> {
        match self {
            Outcome::Exhausted { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Extract the success value, discarding metadata.
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Succeeded { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Extract the final error, discarding metadata.
    pub fn into_error(self) -> Option<E> {
        match self {
            Outcome::Exhausted { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// An immutable record of one concluded attempt, passed to the observer hook.
///
/// Created once per loop iteration and never mutated; the borrow it holds on
/// the attempt's value or error lasts only for the hook call.
#[derive(Debug, Clone)]
pub struct Attempt<'a, T, E> {
    /// Which attempt this was (1-based).
    pub index: u32,
    /// When the attempt began.
    pub started_at: Instant,
    /// How the attempt concluded.
    pub outcome: AttemptOutcome<'a, T, E>,
    /// The backoff delay that will precede the next attempt, or `None` if
    /// this attempt is the last (success, exhaustion, or fatal error).
    pub wait_before_next: Option<Duration>,
    /// Total elapsed time since the run's first attempt started.
    pub elapsed: Duration,
}

/// How a single attempt concluded.
#[derive(Debug, Clone)]
pub enum AttemptOutcome<'a, T, E> {
    /// The attempt returned a value.
    Success(&'a T),
    /// The attempt failed.
    Failure(&'a E),
}

impl<T, E> AttemptOutcome<'_, T, E> {
    /// True if the attempt succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }

    /// True if the attempt failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, AttemptOutcome::Failure(_))
    }
}
