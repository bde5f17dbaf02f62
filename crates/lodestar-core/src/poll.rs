//! Polling with backoff.
//!
//! [`poll_until`] is the composition the delay primitive exists for: run a
//! check, and if the condition is not met yet, wait and try again.
//!
//! ```text
//! loop {
//!   ├─► check(attempt)
//!   │       ├─ Ok(value) ─► return value
//!   │       └─ Err(e)    ─► attempts == max_attempts ? ─► Exhausted { e }
//!   │                        └─ sleep(backoff.next(attempt)), attempt += 1
//! }
//! ```

use std::{fmt, future::Future};

use tracing::{debug, warn};

use crate::{backoff::Backoff, env::Environment};

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    /// Delay policy between attempts.
    pub backoff: Backoff,
    /// Give up after this many attempts. `None` polls forever.
    ///
    /// At least one attempt is always made.
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { backoff: Backoff::default(), max_attempts: Some(20) }
    }
}

/// Polling ended without the condition being met.
#[derive(Debug)]
pub enum PollError<E> {
    /// All `max_attempts` attempts failed.
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error returned by the final attempt.
        last_error: E,
    },
}

impl<E: fmt::Display> fmt::Display for PollError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { attempts, last_error } => {
                write!(f, "gave up after {attempts} attempts: {last_error}")
            },
        }
    }
}

impl<E> std::error::Error for PollError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Exhausted { last_error, .. } => Some(last_error),
        }
    }
}

/// Run `check` until it succeeds, sleeping between failed attempts.
///
/// `check` receives the 0-indexed attempt number.
pub async fn poll_until<Env, F, Fut, T, E>(
    env: &Env,
    config: &PollConfig,
    mut check: F,
) -> Result<T, PollError<E>>
where
    Env: Environment,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut attempt: u32 = 0;

    loop {
        let error = match check(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempts = attempt + 1, "condition met after retries");
                }
                return Ok(value);
            },
            Err(error) => error,
        };

        let attempts = attempt.saturating_add(1);
        if config.max_attempts.is_some_and(|max| attempts >= max) {
            warn!(attempts, %error, "polling exhausted");
            return Err(PollError::Exhausted { attempts, last_error: error });
        }

        let delay = config.backoff.next(attempt);
        debug!(attempt = attempts, delay_ms = delay.as_millis() as u64, %error, "condition not met, backing off");
        env.sleep(delay).await;
        attempt = attempts;
    }
}
