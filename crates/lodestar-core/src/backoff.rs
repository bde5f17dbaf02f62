//! Retry delay policy.
//!
//! [`Backoff`] turns an attempt number into a delay: `first × factor^attempt`,
//! clamped to `max`, then randomized by [`Jitter`]. The base is derived from
//! the attempt number alone, so jitter never feeds back into later delays.

use std::time::Duration;

use rand::Rng;

/// Randomization applied on top of the computed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// Use the computed delay as is.
    #[default]
    None,

    /// Uniform in `[0, delay]`.
    Full,

    /// `delay / 2` plus uniform in `[0, delay / 2]`.
    Equal,
}

impl Jitter {
    /// Apply this jitter to `delay`.
    pub fn apply(self, delay: Duration) -> Duration {
        let ms = delay.as_millis() as u64;
        if ms == 0 {
            return delay;
        }

        match self {
            Self::None => delay,
            Self::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            Self::Equal => {
                let half = ms / 2;
                Duration::from_millis(half + rand::rng().random_range(0..=ms - half))
            },
        }
    }
}

/// Exponential backoff policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Upper bound for any single delay.
    pub max: Duration,
    /// Growth factor per attempt. `1.0` gives a constant delay.
    pub factor: f64,
    /// Randomization applied after clamping.
    pub jitter: Jitter,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(2),
            factor: 2.0,
            jitter: Jitter::None,
        }
    }
}

impl Backoff {
    /// Constant delay without jitter.
    pub fn constant(delay: Duration) -> Self {
        Self { first: delay, max: delay, factor: 1.0, jitter: Jitter::None }
    }

    /// Delay to wait after attempt `attempt` (0-indexed) failed.
    pub fn next(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exponent);

        let base = if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };

        self.jitter.apply(base)
    }
}
