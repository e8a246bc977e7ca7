//! # Eddy
//!
//! > *"An eddy is water that turns back against the current"*
//!
//! A Rust library for retrying fallible operations: exponential backoff with
//! optional full jitter, transient/fatal error classification, cooperative
//! cancellation, and a typed terminal outcome instead of a thrown error.
//!
//! ## Philosophy
//!
//! **Eddy** keeps the pure and the effectful apart:
//! - [`RetryPolicy`] is pure data - how many attempts, how long between them.
//!   Easy to test, clone, and inspect; it never executes anything.
//! - [`RetryExecutor`] is the imperative shell - it invokes the operation,
//!   consults the [`ErrorClassifier`], waits out the backoff while watching
//!   the [`CancellationToken`], and produces exactly one [`Outcome`].
//!
//! Exhaustion and cancellation are ordinary values, not exceptions: a run
//! always returns an [`Outcome`] the caller pattern matches on.
//!
//! ## Quick Example
//!
//! ```rust
//! use eddy::{Outcome, RetryExecutor, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::exponential(Duration::from_millis(1))
//!     .with_max_attempts(3);
//!
//! let mut calls = 0;
//! let outcome = RetryExecutor::new(policy)
//!     .unwrap()
//!     .run(|| {
//!         calls += 1;
//!         if calls < 3 {
//!             Err("connection reset")
//!         } else {
//!             Ok("response")
//!         }
//!     });
//!
//! match outcome {
//!     Outcome::Succeeded { value, attempts } => {
//!         assert_eq!(value, "response");
//!         assert_eq!(attempts, 3);
//!     }
//!     Outcome::Exhausted { .. } | Outcome::Cancelled { .. } => unreachable!(),
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `async` - `run_async` entry points and async-aware cancellation (tokio)
//! - `jitter` - randomized backoff delays (rand); without it, jittered
//!   policies fall back to the raw delay unless a [`RandomSource`] is
//!   injected
//! - `tracing` - trace/debug events from the retry loop
//! - `serde` - `Serialize`/`Deserialize` for [`RetryPolicy`]
//!
//! For runnable walkthroughs, see the `demos` directory.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod classify;
pub mod executor;
pub mod jitter;
pub mod outcome;
pub mod policy;
pub mod testing;
pub mod token;

// Re-exports
pub use classify::{retryable_when, AlwaysRetryable, Classification, ErrorClassifier};
pub use executor::RetryExecutor;
pub use jitter::RandomSource;
#[cfg(feature = "jitter")]
pub use jitter::{SeededRandom, ThreadRandom};
pub use outcome::{Attempt, AttemptOutcome, Outcome};
pub use policy::{PolicyError, RetryPolicy};
pub use token::CancellationToken;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classify::{retryable_when, Classification, ErrorClassifier};
    pub use crate::executor::RetryExecutor;
    pub use crate::outcome::{Attempt, Outcome};
    pub use crate::policy::RetryPolicy;
    pub use crate::token::CancellationToken;
}
