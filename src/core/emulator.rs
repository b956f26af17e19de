//! Shared terminal emulator state
//!
//! The VT102 emulation itself comes from the `vt100` crate; this module owns
//! the synchronization boundary around it. The output pump feeds bytes in
//! under a mutex, and every consumer reads whole `ScreenSnapshot` values
//! copied out under the same mutex, so a snapshot is never torn mid-update.

use std::sync::{Arc, Mutex};

/// An immutable copy of the emulated screen at one instant.
///
/// Lines are top-to-bottom and padded with spaces to the full column count;
/// the cursor is `(row, col)`, zero-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenSnapshot {
    pub lines: Vec<String>,
    pub cursor: (u16, u16),
}

impl ScreenSnapshot {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    /// Number of columns (all lines are padded to the same width).
    pub fn cols(&self) -> usize {
        self.lines.first().map_or(0, |l| l.chars().count())
    }
}

/// Mutex-guarded `vt100::Parser` shared between the output pump and the
/// display schedulers. Cloning shares the underlying emulator.
#[derive(Clone)]
pub struct SharedEmulator {
    parser: Arc<Mutex<vt100::Parser>>,
    cols: u16,
}

impl SharedEmulator {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            parser: Arc::new(Mutex::new(vt100::Parser::new(rows, cols, 0))),
            cols,
        }
    }

    /// Feed raw shell output bytes into the emulator.
    pub fn feed(&self, bytes: &[u8]) {
        let mut parser = self.parser.lock().unwrap_or_else(|e| e.into_inner());
        parser.process(bytes);
    }

    /// Copy out the current screen contents and cursor position.
    pub fn snapshot(&self) -> ScreenSnapshot {
        let parser = self.parser.lock().unwrap_or_else(|e| e.into_inner());
        let screen = parser.screen();
        let cols = self.cols as usize;
        let lines = screen
            .rows(0, self.cols)
            .map(|row| {
                let mut line = row;
                let len = line.chars().count();
                if len < cols {
                    line.extend(std::iter::repeat(' ').take(cols - len));
                }
                line
            })
            .collect();
        ScreenSnapshot {
            lines,
            cursor: screen.cursor_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_and_snapshot() {
        let emu = SharedEmulator::new(4, 10);
        emu.feed(b"hi");
        let snap = emu.snapshot();
        assert_eq!(snap.rows(), 4);
        assert_eq!(snap.cols(), 10);
        assert_eq!(snap.lines[0], "hi        ");
        assert_eq!(snap.cursor, (0, 2));
    }

    #[test]
    fn test_cursor_tracks_newlines() {
        let emu = SharedEmulator::new(4, 10);
        emu.feed(b"a\r\nbc");
        let snap = emu.snapshot();
        assert_eq!(snap.lines[1], "bc        ");
        assert_eq!(snap.cursor, (1, 2));
    }

    #[test]
    fn test_snapshot_is_stable_value() {
        let emu = SharedEmulator::new(2, 5);
        emu.feed(b"x");
        let a = emu.snapshot();
        let b = emu.snapshot();
        assert_eq!(a, b);
        emu.feed(b"y");
        assert_ne!(a, emu.snapshot());
    }
}
