//! Retry policy types and configuration.

use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(250);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// A retry policy describing how often and how quickly to re-attempt
/// a failed operation.
///
/// Policies are pure data - they describe retry behavior but don't execute it.
/// This makes them easy to test, clone, and inspect. A policy is immutable
/// once constructed; executing it is the job of
/// [`RetryExecutor`](crate::RetryExecutor).
///
/// # Counting
///
/// `max_attempts` counts every invocation of the operation, including the
/// first. `max_attempts == 1` therefore disables retries entirely.
///
/// # Examples
///
/// ```rust
/// use eddy::RetryPolicy;
/// use std::time::Duration;
///
/// // Exponential backoff: 100ms, 200ms, 400ms, ...
/// let policy = RetryPolicy::exponential(Duration::from_millis(100))
///     .with_max_attempts(4);
///
/// assert_eq!(policy.max_attempts(), 4);
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
///
/// // Constant delay with a tighter cap
/// let policy = RetryPolicy::fixed(Duration::from_millis(500))
///     .with_max_delay(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: bool,
}

impl RetryPolicy {
    /// Create a policy with exponentially increasing delay (multiplier 2).
    ///
    /// Delay before re-attempting after failed attempt *i* is
    /// `base * 2^(i-1)`, clamped to [`max_delay`](Self::max_delay).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eddy::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(100));
    ///
    /// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
    /// ```
    pub fn exponential(base_delay: Duration) -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay,
            max_delay: base_delay.max(DEFAULT_MAX_DELAY),
            multiplier: 2.0,
            jitter: false,
        }
    }

    /// Create a policy with a constant delay between attempts (multiplier 1).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eddy::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::fixed(Duration::from_millis(500));
    ///
    /// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
    /// assert_eq!(policy.delay_for_attempt(7), Duration::from_millis(500));
    /// ```
    pub fn fixed(delay: Duration) -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: delay,
            max_delay: delay.max(DEFAULT_MAX_DELAY),
            multiplier: 1.0,
            jitter: false,
        }
    }

    /// Set the maximum number of attempts, including the first.
    ///
    /// Must be at least 1; zero is rejected by [`validate`](Self::validate).
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the upper bound on any single backoff delay.
    ///
    /// Delays never exceed this value, regardless of how far the
    /// multiplier has grown them.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    /// Set the backoff multiplier.
    ///
    /// Must be at least 1. The delay after failed attempt *i* is
    /// `base * multiplier^(i-1)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eddy::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(100))
    ///     .with_multiplier(2.5);
    ///
    /// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(250));
    /// assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(625));
    /// ```
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Enable full jitter.
    ///
    /// Each delay is drawn uniformly from `[0, computed delay]` instead of
    /// being the computed delay itself, which desynchronizes retry storms
    /// across independent callers.
    ///
    /// **Note**: drawing the random value requires the `jitter` feature or an
    /// injected [`RandomSource`](crate::RandomSource). With neither, jittered
    /// delays degrade to the raw computed delay.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    /// Get the maximum number of attempts (including the first).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the base delay.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Get the delay cap.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Get the backoff multiplier.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Whether full jitter is enabled.
    pub fn jitter(&self) -> bool {
        self.jitter
    }

    /// Compute the raw backoff delay after failed attempt `attempt` (1-based).
    ///
    /// The result is `base_delay * multiplier^(attempt - 1)`, clamped to
    /// [`max_delay`](Self::max_delay). Jitter is not applied here; this is
    /// the deterministic half of the computation. No delay is ever applied
    /// before attempt 1 - the first attempt runs immediately.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eddy::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(100))
    ///     .with_max_delay(Duration::from_millis(500));
    ///
    /// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
    /// assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(500)); // capped
    /// assert_eq!(policy.delay_for_attempt(9), Duration::from_millis(500)); // capped
    /// ```
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        // Exponents past ~1024 overflow f64 for any multiplier > 1 and are
        // capped below anyway.
        let exp = attempt.saturating_sub(1).min(1024) as i32;
        let raw = self.base_delay.as_secs_f64() * self.multiplier.powi(exp);
        let cap = self.max_delay.as_secs_f64();

        if !raw.is_finite() || raw >= cap {
            self.max_delay
        } else {
            Duration::from_secs_f64(raw)
        }
    }

    /// Check the policy for misconfiguration.
    ///
    /// [`RetryExecutor::new`](crate::RetryExecutor::new) calls this before
    /// any attempt is made, so an invalid policy fails fast instead of
    /// producing surprising loop behavior.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eddy::{PolicyError, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential(Duration::from_millis(100));
    /// assert!(policy.validate().is_ok());
    ///
    /// let broken = policy.with_max_attempts(0);
    /// assert_eq!(broken.validate(), Err(PolicyError::ZeroAttempts));
    /// ```
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if self.base_delay.is_zero() {
            return Err(PolicyError::ZeroBaseDelay);
        }
        if self.max_delay < self.base_delay {
            return Err(PolicyError::MaxDelayBelowBase);
        }
        if self.multiplier < 1.0 {
            return Err(PolicyError::MultiplierBelowOne);
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    /// Exponential backoff: 5 attempts, 250ms base delay, 30s cap.
    fn default() -> Self {
        Self::exponential(DEFAULT_BASE_DELAY)
    }
}

/// Error returned for a misconfigured [`RetryPolicy`].
///
/// Surfaced by [`RetryPolicy::validate`] and
/// [`RetryExecutor::new`](crate::RetryExecutor::new), always before any
/// attempt has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// `max_attempts` is zero; the operation could never be invoked.
    ZeroAttempts,
    /// `base_delay` is zero.
    ZeroBaseDelay,
    /// `max_delay` is smaller than `base_delay`.
    MaxDelayBelowBase,
    /// The backoff multiplier is below 1.
    MultiplierBelowOne,
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyError::ZeroAttempts => write!(f, "max_attempts must be at least 1"),
            PolicyError::ZeroBaseDelay => write!(f, "base_delay must be greater than zero"),
            PolicyError::MaxDelayBelowBase => {
                write!(f, "max_delay must be at least base_delay")
            }
            PolicyError::MultiplierBelowOne => write!(f, "multiplier must be at least 1"),
        }
    }
}

impl std::error::Error for PolicyError {}
