//! Randomness for jittered backoff delays.
//!
//! Jitter spreads concurrent retriers apart in time. The executor draws its
//! randomness through the [`RandomSource`] trait rather than a global
//! generator, so jittered behavior is reproducible under test - inject a
//! [`SeededRandom`] and the delay sequence is deterministic.

use std::time::Duration;

/// A source of uniform random fractions for jitter.
///
/// Implementations return values in `[0, 1]`; anything outside that range is
/// clamped before use. The built-in sources ([`ThreadRandom`],
/// [`SeededRandom`]) require the `jitter` feature, but the trait itself does
/// not - callers can always inject their own.
pub trait RandomSource {
    /// Return the next uniform fraction in `[0, 1]`.
    fn next_unit(&mut self) -> f64;
}

/// Draws from the thread-local generator.
///
/// This is the default source when the `jitter` feature is enabled and no
/// source was injected.
#[cfg(feature = "jitter")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

#[cfg(feature = "jitter")]
impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        use rand::Rng;
        rand::rng().random_range(0.0..=1.0)
    }
}

/// A deterministic source seeded from a `u64`.
///
/// Two sources built from the same seed produce the same fraction sequence,
/// which makes jittered delay sequences reproducible in tests.
///
/// # Examples
///
/// ```rust
/// use eddy::jitter::{RandomSource, SeededRandom};
///
/// let mut a = SeededRandom::new(42);
/// let mut b = SeededRandom::new(42);
/// assert_eq!(a.next_unit(), b.next_unit());
/// ```
#[cfg(feature = "jitter")]
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: rand::rngs::SmallRng,
}

#[cfg(feature = "jitter")]
impl SeededRandom {
    /// Create a source from a seed.
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            rng: rand::rngs::SmallRng::seed_from_u64(seed),
        }
    }
}

#[cfg(feature = "jitter")]
impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        use rand::Rng;
        self.rng.random_range(0.0..=1.0)
    }
}

/// Full jitter: scale the raw delay by a drawn fraction, yielding a value
/// uniform in `[0, raw]`.
pub(crate) fn full_jitter(raw: Duration, source: &mut dyn RandomSource) -> Duration {
    raw.mul_f64(source.next_unit().clamp(0.0, 1.0))
}

#[cfg(feature = "jitter")]
pub(crate) fn default_jitter(raw: Duration) -> Duration {
    full_jitter(raw, &mut ThreadRandom)
}

/// Without the `jitter` feature there is no default generator; jittered
/// policies fall back to the raw delay.
#[cfg(not(feature = "jitter"))]
pub(crate) fn default_jitter(raw: Duration) -> Duration {
    raw
}
