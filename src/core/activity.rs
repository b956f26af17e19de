//! Keyboard activity tracking
//!
//! The panel scheduler debounces redraws on keyboard quiescence, so the input
//! loop records a timestamp for every byte it delivers. Stored as milliseconds
//! since construction in an atomic, readable from any thread without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub struct ActivityTracker {
    epoch: Instant,
    last_ms: AtomicU64,
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityTracker {
    /// Starts out "idle forever" so the first frame is never debounced away.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_ms: AtomicU64::new(0),
        }
    }

    /// Record a keystroke at the current instant.
    pub fn touch(&self) {
        let ms = self.epoch.elapsed().as_millis() as u64;
        // Never store 0, which means "no keystroke yet".
        self.last_ms.store(ms.max(1), Ordering::Relaxed);
    }

    /// Time since the last recorded keystroke.
    pub fn idle(&self) -> Duration {
        let last = self.last_ms.load(Ordering::Relaxed);
        if last == 0 {
            return Duration::MAX;
        }
        let now = self.epoch.elapsed().as_millis() as u64;
        Duration::from_millis(now.saturating_sub(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_before_any_keystroke() {
        let tracker = ActivityTracker::new();
        assert_eq!(tracker.idle(), Duration::MAX);
    }

    #[test]
    fn test_touch_resets_idle() {
        let tracker = ActivityTracker::new();
        tracker.touch();
        assert!(tracker.idle() < Duration::from_millis(100));
    }
}
