use std::time::{Duration, Instant};

/// Monotonic frame counter.
///
/// Sampled once per rendered frame; returns the true elapsed wall time since
/// the previous sample. No clamping is applied, so animation speed does not
/// depend on frame rate.
#[derive(Debug, Clone)]
pub struct FrameCounter {
    last: Instant,
    frame_index: u64,
}

impl FrameCounter {
    /// Starts the counter at `now`.
    pub fn start(now: Instant) -> Self {
        Self {
            last: now,
            frame_index: 0,
        }
    }

    /// Resets the baseline without counting a frame.
    ///
    /// Used when resuming after a pause so the paused interval is not reported
    /// as frame time.
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Returns the time elapsed since the previous sample and advances the
    /// baseline to `now`.
    pub fn sample(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);
        elapsed
    }

    /// Number of samples taken so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
