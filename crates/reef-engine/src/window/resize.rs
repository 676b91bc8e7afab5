use std::time::{Duration, Instant};

use crate::device::SurfaceSize;
use crate::lifecycle::SurfaceEvent;

/// Detects interactive resizes from a stream of size notifications.
///
/// The first size change of a burst yields `ResizeBegin`; once no change has
/// arrived for `settle`, `poll` yields `ResizeEnd`. A zero `settle` turns
/// every change into a plain `Resized`.
#[derive(Debug, Clone)]
pub struct ResizeTracker {
    settle: Duration,
    size: SurfaceSize,
    last_change: Option<Instant>,
}

impl ResizeTracker {
    pub fn new(initial: SurfaceSize, settle: Duration) -> Self {
        Self {
            settle,
            size: initial,
            last_change: None,
        }
    }

    /// Feeds a size notification. Repeats of the current size are ignored.
    pub fn on_resize(&mut self, size: SurfaceSize, now: Instant) -> Vec<SurfaceEvent> {
        if size == self.size {
            return Vec::new();
        }
        self.size = size;

        if self.settle.is_zero() {
            return vec![SurfaceEvent::Resized(size)];
        }

        let began = self.last_change.replace(now).is_none();
        if began {
            vec![SurfaceEvent::ResizeBegin, SurfaceEvent::Resized(size)]
        } else {
            vec![SurfaceEvent::Resized(size)]
        }
    }

    /// Returns `ResizeEnd` once the burst has settled.
    pub fn poll(&mut self, now: Instant) -> Option<SurfaceEvent> {
        let last = self.last_change?;
        if now.saturating_duration_since(last) < self.settle {
            return None;
        }
        self.last_change = None;
        Some(SurfaceEvent::ResizeEnd)
    }
}
