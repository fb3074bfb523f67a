//! Time sources.
//!
//! Every timer in Folio goes through a [`Clock`] so that behavior which
//! depends on delays can be driven by tokio's paused clock in tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::debug;

/// A pending timer. Resolves once its deadline has passed.
pub type Timer = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Source of wall-clock timestamps and runtime timers.
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time in epoch milliseconds.
    fn now_millis(&self) -> i64;

    /// Current instant on the runtime's monotonic timer.
    fn instant(&self) -> Instant {
        Instant::now()
    }

    /// A timer that fires at `deadline`.
    fn sleep_until(&self, deadline: Instant) -> Timer {
        Box::pin(tokio::time::sleep_until(deadline))
    }

    /// A timer that fires after `delay`.
    fn sleep(&self, delay: Duration) -> Timer {
        self.sleep_until(self.instant() + delay)
    }
}

/// Production clock: system wall time and real tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Test clock whose wall time follows tokio's (pausable) monotonic clock.
///
/// Under `tokio::time::pause()` both timers and `now_millis` advance only
/// when the runtime advances time, so delays are deterministic. The wall
/// time can additionally be jumped with [`VirtualClock::advance_wall`]
/// without firing any timer, e.g. to simulate a revisit a day later.
#[derive(Debug)]
pub struct VirtualClock {
    epoch_at_anchor: i64,
    anchor: Instant,
    skew_ms: AtomicI64,
}

impl VirtualClock {
    /// Start the wall clock at `epoch_millis`, anchored to the current instant.
    pub fn starting_at(epoch_millis: i64) -> Self {
        Self {
            epoch_at_anchor: epoch_millis,
            anchor: Instant::now(),
            skew_ms: AtomicI64::new(0),
        }
    }

    /// Move wall time forward without touching runtime timers.
    pub fn advance_wall(&self, by: Duration) {
        let by_ms = by.as_millis() as i64;
        self.skew_ms.fetch_add(by_ms, Ordering::SeqCst);
        debug!(by_ms, "Virtual wall clock advanced");
    }

    /// Pin wall time to `epoch_millis` from now on (timers keep running).
    pub fn set_now_millis(&self, epoch_millis: i64) {
        let elapsed = self.anchor.elapsed().as_millis() as i64;
        self.skew_ms
            .store(epoch_millis - self.epoch_at_anchor - elapsed, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    fn now_millis(&self) -> i64 {
        let elapsed = self.anchor.elapsed().as_millis() as i64;
        self.epoch_at_anchor + elapsed + self.skew_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_virtual_clock_follows_paused_time() {
        let clock = VirtualClock::starting_at(1_000);
        assert_eq!(clock.now_millis(), 1_000);

        clock.sleep(Duration::from_secs(3)).await;
        assert_eq!(clock.now_millis(), 4_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_wall_does_not_fire_timers() {
        let clock = VirtualClock::starting_at(0);
        let start = clock.instant();
        clock.advance_wall(Duration::from_secs(86_400));

        assert_eq!(clock.now_millis(), 86_400_000);
        assert_eq!(clock.instant(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_now_millis() {
        let clock = VirtualClock::starting_at(500);
        tokio::time::advance(Duration::from_millis(250)).await;
        clock.set_now_millis(10_000);
        assert_eq!(clock.now_millis(), 10_000);
        tokio::time::advance(Duration::from_millis(5)).await;
        assert_eq!(clock.now_millis(), 10_005);
    }

    #[test]
    fn test_system_clock_is_epoch_millis() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
