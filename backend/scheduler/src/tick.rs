use std::time::Duration;

use tokio::time::Instant;

/// Fixed-step schedule: `frames` evenly spaced ticks spanning `total`.
///
/// Frame `k` (zero-based) is due at `start + period * (k + 1)`, so the last
/// frame lands at the end of the span. Deadlines are computed from `start`
/// rather than chained, so a late tick does not push back the ones after it.
#[derive(Debug, Clone, Copy)]
pub struct TickSchedule {
    start: Instant,
    period: Duration,
    frames: u32,
}

impl TickSchedule {
    pub fn new(start: Instant, total: Duration, frames: u32) -> Self {
        let frames = frames.max(1);
        Self {
            start,
            period: total / frames,
            frames,
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// When frame `frame` is due.
    pub fn deadline(&self, frame: u32) -> Instant {
        self.start + self.period * (frame + 1)
    }

    pub fn is_last(&self, frame: u32) -> bool {
        frame + 1 >= self.frames
    }
}
