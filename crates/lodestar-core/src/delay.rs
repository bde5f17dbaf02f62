//! Delay primitive.
//!
//! [`sleep`] suspends the calling task for at least the requested duration
//! and resolves with no value. Other tasks on the same runtime keep running
//! while it is pending; the thread is never blocked.
//!
//! A zero duration still yields to the scheduler once before resuming, so a
//! retry loop that computes a zero delay cannot starve queued work.
//!
//! There is no cancellation token. A pending delay runs to completion unless
//! the future awaiting it is dropped.

use std::time::Duration;

use tracing::debug;

/// Suspend the current task for at least `duration`.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        tokio::task::yield_now().await;
        return;
    }

    tokio::time::sleep(duration).await;
}

/// Suspend the current task for at least `ms` milliseconds.
///
/// Negative values are treated as zero.
pub async fn sleep_ms(ms: i64) {
    let ms = u64::try_from(ms).unwrap_or_else(|_| {
        debug!(requested_ms = ms, "negative delay requested, treating as zero");
        0
    });

    sleep(Duration::from_millis(ms)).await;
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleep_waits_at_least_requested_duration() {
        let start = Instant::now();
        sleep(Duration::from_millis(250)).await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_sleeps_accumulate() {
        let start = Instant::now();
        for _ in 0..3 {
            sleep_ms(100).await;
        }
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_sleeps_overlap() {
        let start = Instant::now();
        tokio::join!(sleep_ms(100), sleep_ms(100), sleep_ms(100));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn zero_delay_yields_to_queued_work() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let handle = tokio::spawn(async move {
            flag.store(true, Ordering::SeqCst);
        });

        sleep(Duration::ZERO).await;
        assert!(ran.load(Ordering::SeqCst), "queued task did not run during zero delay");
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn negative_delay_is_treated_as_zero() {
        let start = Instant::now();
        sleep_ms(-500).await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }
}
