//! Cursor-window LCD redraw scheduling
//!
//! The character LCD shows a small window of the screen: two rows around the
//! cursor, a fixed number of columns centered on it. Redraws happen whenever
//! the windowed content or cursor position changes; the bus is slow, so each
//! write is bracketed with settle delays. After a fixed idle period without a
//! redraw the backlight goes dark until the next real change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info};

use super::{DisplayError, LcdDriver};
use crate::core::{ScreenSnapshot, SharedEmulator};

/// LCD geometry and timing.
#[derive(Clone, Copy, Debug)]
pub struct LcdConfig {
    /// Window width in character cells.
    pub width: usize,
    /// Backlight shutoff after this long without a redraw.
    pub idle_timeout: Duration,
    /// Settle delay around bus writes.
    pub settle: Duration,
    /// How often the emulator is polled for changes.
    pub poll_interval: Duration,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            width: 40,
            idle_timeout: Duration::from_secs(5),
            settle: Duration::from_millis(100),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// The windowed view actually shown on the LCD.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LcdWindow {
    pub top: String,
    pub bottom: String,
    /// 1-based LCD line carrying the cursor.
    pub cursor_line: u8,
    /// 0-based column of the cursor within the window.
    pub cursor_col: u8,
}

/// Horizontal window of `width` columns centered on the cursor, shifted (not
/// truncated) at the screen edges. Never wider than the screen itself.
fn window_bounds(cursor_col: usize, cols: usize, width: usize) -> (usize, usize) {
    if cols <= width {
        return (0, cols);
    }
    let start = cursor_col
        .saturating_sub(width / 2)
        .min(cols - width);
    (start, start + width)
}

/// Drop everything the LCD's character ROM can't show.
fn strip_unprintable(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Compute the 2-row window for a snapshot: the cursor's row and the row
/// above it, or the row below when the cursor sits on the top row.
pub fn window(snapshot: &ScreenSnapshot, width: usize) -> LcdWindow {
    let (row, col) = (snapshot.cursor.0 as usize, snapshot.cursor.1 as usize);
    let cols = snapshot.cols();
    let (start, end) = window_bounds(col, cols, width);

    let slice = |r: usize| -> String {
        let line = snapshot.lines.get(r).map(String::as_str).unwrap_or("");
        let windowed: String = line.chars().skip(start).take(end - start).collect();
        strip_unprintable(&windowed)
    };

    let (top, bottom, cursor_line) = if row == 0 {
        (slice(0), slice(1), 1)
    } else {
        (slice(row - 1), slice(row), 2)
    };

    LcdWindow {
        top,
        bottom,
        cursor_line,
        cursor_col: col.saturating_sub(start) as u8,
    }
}

pub struct LcdScheduler<D: LcdDriver> {
    driver: D,
    config: LcdConfig,
    /// Last window this backend actually wrote out.
    last_drawn: Option<LcdWindow>,
    last_draw_time: Instant,
    backlight_on: bool,
}

impl<D: LcdDriver> LcdScheduler<D> {
    pub fn new(driver: D, config: LcdConfig) -> Self {
        Self {
            driver,
            config,
            last_drawn: None,
            last_draw_time: Instant::now(),
            backlight_on: false,
        }
    }

    /// One poll tick against the given clock. Returns whether a redraw
    /// happened.
    pub fn tick_at(
        &mut self,
        snapshot: &ScreenSnapshot,
        now: Instant,
    ) -> Result<bool, DisplayError> {
        let win = window(snapshot, self.config.width);

        if self.last_drawn.as_ref() != Some(&win) {
            thread::sleep(self.config.settle);
            self.driver.backlight(true)?;
            self.backlight_on = true;

            let width = self.config.width;
            self.driver.write_line(&format!("{:<width$}", win.top), 1)?;
            self.driver.write_line(&format!("{:<width$}", win.bottom), 2)?;
            self.driver.set_cursor(win.cursor_line, win.cursor_col)?;

            thread::sleep(self.config.settle);
            self.last_drawn = Some(win);
            self.last_draw_time = now;
            return Ok(true);
        }

        if self.backlight_on && now.duration_since(self.last_draw_time) > self.config.idle_timeout {
            self.driver.backlight(false)?;
            self.backlight_on = false;
        }
        Ok(false)
    }

    pub fn tick(&mut self, snapshot: &ScreenSnapshot) -> Result<bool, DisplayError> {
        self.tick_at(snapshot, Instant::now())
    }

    /// Clear the glass and kill the backlight, used on orderly shutdown.
    pub fn shutdown(&mut self) -> Result<(), DisplayError> {
        self.driver.clear()?;
        self.driver.backlight(false)
    }

    /// Poll-and-redraw loop; runs until shutdown or a driver failure.
    pub fn run(mut self, emulator: SharedEmulator, shutdown: Arc<AtomicBool>) {
        info!("lcd scheduler started");
        while !shutdown.load(Ordering::SeqCst) {
            let snapshot = emulator.snapshot();
            if let Err(e) = self.tick(&snapshot) {
                error!("lcd redraw failed, stopping backend: {}", e);
                return;
            }
            thread::sleep(self.config.poll_interval);
        }
        if let Err(e) = self.shutdown() {
            error!("lcd clear on shutdown failed: {}", e);
        }
        info!("lcd scheduler stopped");
    }
}
