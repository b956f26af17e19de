//! Full-screen panel redraw scheduling
//!
//! The e-paper panel takes on the order of seconds per refresh, so redraws
//! are differential and debounced: a frame goes out only when the snapshot
//! actually changed since this backend's last commit AND the keyboard has
//! been quiet for the debounce window. The scheduler owns its driver and
//! rasterizer; a driver failure ends this loop and nothing else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{error, info};

use super::canvas::{MonoCanvas, Rasterizer, Rotation};
use super::{DisplayError, PanelDriver};
use crate::core::{ActivityTracker, ScreenSnapshot, SharedEmulator};

/// Panel geometry and timing.
#[derive(Clone, Copy, Debug)]
pub struct PanelConfig {
    /// Canvas size before mount rotation, in pixels.
    pub width: usize,
    pub height: usize,
    pub rotation: Rotation,
    /// Minimum keyboard quiescence before an expensive redraw.
    pub debounce: Duration,
    /// How often the emulator is polled for changes.
    pub poll_interval: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            rotation: Rotation::Cw270,
            debounce: Duration::from_millis(500),
            poll_interval: Duration::from_millis(250),
        }
    }
}

pub struct PanelScheduler<D: PanelDriver, R: Rasterizer> {
    driver: D,
    rasterizer: R,
    config: PanelConfig,
    /// Last snapshot this backend successfully committed.
    last_drawn: Option<ScreenSnapshot>,
}

impl<D: PanelDriver, R: Rasterizer> PanelScheduler<D, R> {
    pub fn new(driver: D, rasterizer: R, config: PanelConfig) -> Self {
        Self {
            driver,
            rasterizer,
            config,
            last_drawn: None,
        }
    }

    /// One poll tick. Commits a frame when the snapshot changed and the
    /// keyboard has been idle long enough; returns whether it did.
    pub fn tick(
        &mut self,
        snapshot: &ScreenSnapshot,
        input_idle: Duration,
    ) -> Result<bool, DisplayError> {
        if self.last_drawn.as_ref() == Some(snapshot) {
            return Ok(false);
        }
        if input_idle < self.config.debounce {
            // Mid-keystroke; try again next tick.
            return Ok(false);
        }

        let frame = self.compose(snapshot);
        self.commit_frame(&frame)?;
        // State advances only after a successful commit.
        self.last_drawn = Some(snapshot.clone());
        Ok(true)
    }

    /// Rasterize the snapshot, overlay the cursor outline, apply the mount
    /// rotation.
    fn compose(&self, snapshot: &ScreenSnapshot) -> MonoCanvas {
        let mut canvas = MonoCanvas::new(self.config.width, self.config.height);
        self.rasterizer.render(snapshot, &mut canvas);
        let (row, col) = snapshot.cursor;
        canvas.outline_rect(self.rasterizer.cell_rect(row, col));
        canvas.rotated(self.config.rotation)
    }

    fn commit_frame(&mut self, frame: &MonoCanvas) -> Result<(), DisplayError> {
        self.driver.reset_pointer()?;
        self.driver.send_image(&frame.packed())?;
        self.driver.commit()
    }

    /// Blank the panel, used on orderly shutdown.
    pub fn blank(&mut self) -> Result<(), DisplayError> {
        let white = MonoCanvas::new(self.config.width, self.config.height)
            .rotated(self.config.rotation);
        self.commit_frame(&white)
    }

    /// Poll-and-redraw loop; runs until shutdown or a driver failure.
    pub fn run(
        mut self,
        emulator: SharedEmulator,
        activity: Arc<ActivityTracker>,
        shutdown: Arc<AtomicBool>,
    ) {
        info!("panel scheduler started");
        while !shutdown.load(Ordering::SeqCst) {
            let snapshot = emulator.snapshot();
            if let Err(e) = self.tick(&snapshot, activity.idle()) {
                error!("panel redraw failed, stopping backend: {}", e);
                return;
            }
            thread::sleep(self.config.poll_interval);
        }
        if let Err(e) = self.blank() {
            error!("panel blank on shutdown failed: {}", e);
        }
        info!("panel scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::canvas::BlockRasterizer;
    use std::io;
    use std::sync::{Arc as StdArc, Mutex};

    #[derive(Clone, Default)]
    struct FakePanel {
        calls: StdArc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    impl PanelDriver for FakePanel {
        fn reset_pointer(&mut self) -> Result<(), DisplayError> {
            self.calls.lock().unwrap().push("reset");
            Ok(())
        }
        fn send_image(&mut self, _packed: &[u8]) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Panel(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "bus gone",
                )));
            }
            self.calls.lock().unwrap().push("send");
            Ok(())
        }
        fn commit(&mut self) -> Result<(), DisplayError> {
            self.calls.lock().unwrap().push("commit");
            Ok(())
        }
    }

    fn snapshot(text: &str, cursor: (u16, u16)) -> ScreenSnapshot {
        ScreenSnapshot {
            lines: vec![format!("{:<10}", text), " ".repeat(10)],
            cursor,
        }
    }

    fn scheduler(driver: FakePanel) -> PanelScheduler<FakePanel, BlockRasterizer> {
        let config = PanelConfig {
            width: 120,
            height: 40,
            rotation: Rotation::Cw270,
            debounce: Duration::from_millis(500),
            poll_interval: Duration::ZERO,
        };
        PanelScheduler::new(driver, BlockRasterizer::new(9, 18, 14), config)
    }

    #[test]
    fn test_identical_snapshot_redraws_at_most_once() {
        let driver = FakePanel::default();
        let calls = driver.calls.clone();
        let mut sched = scheduler(driver);
        let snap = snapshot("hello", (0, 5));
        assert!(sched.tick(&snap, Duration::from_secs(1)).unwrap());
        assert!(!sched.tick(&snap, Duration::from_secs(1)).unwrap());
        assert_eq!(&*calls.lock().unwrap(), &["reset", "send", "commit"]);
    }

    #[test]
    fn test_debounce_suppresses_redraw() {
        let mut sched = scheduler(FakePanel::default());
        let snap = snapshot("typing", (0, 6));
        assert!(!sched.tick(&snap, Duration::from_millis(100)).unwrap());
        // Once the keyboard settles, the pending change goes out.
        assert!(sched.tick(&snap, Duration::from_millis(600)).unwrap());
    }

    #[test]
    fn test_cursor_move_alone_triggers_redraw() {
        let mut sched = scheduler(FakePanel::default());
        assert!(sched
            .tick(&snapshot("same", (0, 1)), Duration::from_secs(1))
            .unwrap());
        assert!(sched
            .tick(&snapshot("same", (0, 2)), Duration::from_secs(1))
            .unwrap());
    }

    #[test]
    fn test_failed_commit_does_not_advance_state() {
        let driver = FakePanel {
            fail: true,
            ..FakePanel::default()
        };
        let mut sched = scheduler(driver);
        let snap = snapshot("x", (0, 1));
        assert!(sched.tick(&snap, Duration::from_secs(1)).is_err());
        assert!(sched.last_drawn.is_none());
    }
}
