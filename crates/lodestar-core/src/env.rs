//! Environment abstraction.
//!
//! Polling and the server's session-id assignment take their clock, sleep
//! and randomness from an [`Environment`], so tests run the same code on
//! tokio's paused clock. Backoff jitter draws from the thread RNG directly.

use std::{future::Future, time::Duration};

use rand::RngCore;
use tokio::time::Instant;

/// Source of time, delays and randomness.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend for at least `duration` without blocking the thread.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Fill `buffer` with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Draw a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }
}

/// Production environment backed by tokio timers and the thread RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        crate::delay::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        rand::rng().fill_bytes(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn system_env_follows_paused_clock() {
        let env = SystemEnv;
        let start = env.now();
        env.sleep(Duration::from_secs(30)).await;
        assert!(env.now() - start >= Duration::from_secs(30));
    }

    #[test]
    fn random_draws_differ() {
        let env = SystemEnv;
        let draws: Vec<u64> = (0..4).map(|_| env.random_u64()).collect();
        assert!(draws.windows(2).any(|w| w[0] != w[1]));
    }
}
