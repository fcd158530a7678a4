//! The delay primitive: run a unit of work after a duration has elapsed.
//!
//! Scheduled work cannot be cancelled. Callers that need to abandon work check
//! their own flags inside the callback before acting.

use async_trait::async_trait;
use std::time::Duration;

/// Source of the engine's timed suspensions.
///
/// The default [`TokioClock`] sleeps on the Tokio timer. Install a different
/// clock with [`TyperBuilder::clock`](crate::TyperBuilder::clock) to drive
/// steps from another time source.
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Wait for `delay` on `clock`, then run `work` and resolve with its result.
pub async fn delay_callback<C, F, T>(clock: &C, delay: Duration, work: F) -> T
where
    C: Clock + ?Sized,
    F: FnOnce() -> T,
{
    clock.sleep(delay).await;
    work()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_work_runs_after_delay() {
        let started = Instant::now();
        let value = delay_callback(&TokioClock, Duration::from_millis(250), || {
            started.elapsed()
        })
        .await;
        assert_eq!(value, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay() {
        let value = delay_callback(&TokioClock, Duration::ZERO, || 7).await;
        assert_eq!(value, 7);
    }
}
