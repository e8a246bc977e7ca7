//! Testing utilities and helpers.
//!
//! This module provides a deterministic flaky operation for exercising retry
//! behavior, plus assertion macros for terminal outcomes.
//!
//! # Examples
//!
//! ```rust
//! use eddy::testing::FlakyOperation;
//! use eddy::{assert_succeeded, RetryExecutor, RetryPolicy};
//! use std::time::Duration;
//!
//! let mut op = FlakyOperation::failing(2);
//! let policy = RetryPolicy::fixed(Duration::from_millis(1)).with_max_attempts(5);
//!
//! let outcome = RetryExecutor::new(policy).unwrap().run(|| op.invoke());
//!
//! assert_succeeded!(outcome);
//! assert_eq!(op.calls(), 3);
//! ```

/// An operation that fails a fixed number of times before succeeding.
///
/// Each failure yields a [`FlakyError`] carrying the call number; the first
/// call after the configured failures returns `Ok` with the total call
/// count. Deterministic, so tests can assert exact attempt counts.
#[derive(Debug, Clone)]
pub struct FlakyOperation {
    failures: u32,
    calls: u32,
}

impl FlakyOperation {
    /// An operation that fails `failures` times, then succeeds forever.
    ///
    /// `failing(0)` succeeds on the first call.
    pub fn failing(failures: u32) -> Self {
        Self { failures, calls: 0 }
    }

    /// How many times the operation has been invoked.
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// Invoke the operation once.
    pub fn invoke(&mut self) -> Result<u32, FlakyError> {
        self.calls += 1;
        if self.calls <= self.failures {
            Err(FlakyError { call: self.calls })
        } else {
            Ok(self.calls)
        }
    }
}

/// The transient error produced by [`FlakyOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlakyError {
    /// Which call failed (1-based).
    pub call: u32,
}

impl std::fmt::Display for FlakyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "transient failure on call {}", self.call)
    }
}

impl std::error::Error for FlakyError {}

/// Assert that an outcome is `Succeeded`.
///
/// This macro will panic if the outcome is `Exhausted` or `Cancelled`.
///
/// # Example
///
/// ```rust
/// use eddy::{assert_succeeded, Outcome};
///
/// let outcome: Outcome<i32, String> = Outcome::Succeeded { value: 42, attempts: 1 };
/// assert_succeeded!(outcome);
/// ```
#[macro_export]
macro_rules! assert_succeeded {
    ($outcome:expr) => {
        match &$outcome {
            $crate::Outcome::Succeeded { .. } => {}
            other => panic!("Expected Succeeded, got {:?}", other),
        }
    };
}

/// Assert that an outcome is `Exhausted`.
///
/// This macro will panic if the outcome is `Succeeded` or `Cancelled`.
///
/// # Example
///
/// ```rust
/// use eddy::{assert_exhausted, Outcome};
///
/// let outcome: Outcome<i32, _> = Outcome::Exhausted { error: "boom", attempts: 3 };
/// assert_exhausted!(outcome);
/// ```
#[macro_export]
macro_rules! assert_exhausted {
    ($outcome:expr) => {
        match &$outcome {
            $crate::Outcome::Exhausted { .. } => {}
            other => panic!("Expected Exhausted, got {:?}", other),
        }
    };
}

/// Assert that an outcome is `Cancelled`.
///
/// This macro will panic if the outcome is `Succeeded` or `Exhausted`.
///
/// # Example
///
/// ```rust
/// use eddy::{assert_cancelled, Outcome};
///
/// let outcome: Outcome<i32, String> = Outcome::Cancelled { attempts: 0 };
/// assert_cancelled!(outcome);
/// ```
#[macro_export]
macro_rules! assert_cancelled {
    ($outcome:expr) => {
        match &$outcome {
            $crate::Outcome::Cancelled { .. } => {}
            other => panic!("Expected Cancelled, got {:?}", other),
        }
    };
}
