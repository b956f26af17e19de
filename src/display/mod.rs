//! Display backends and redraw scheduling.
//!
//! Two independent schedulers reconcile the emulator's screen against two
//! very different displays:
//!
//! - **panel**: full-screen e-paper frames, debounced on keyboard quiescence
//! - **lcd**: a 2-row window around the cursor on a character LCD
//! - **canvas**: packed monochrome bitmap and rasterization seam
//! - **demo**: logging stand-in drivers for running without hardware
//!
//! The wire protocols themselves live behind the `PanelDriver` and
//! `LcdDriver` traits; hardware implementations plug in out of tree. A driver
//! failure ends only that backend's loop.

pub mod canvas;
pub mod demo;
pub mod lcd;
pub mod panel;

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("panel I/O failed: {0}")]
    Panel(#[source] io::Error),

    #[allow(dead_code)]
    #[error("lcd bus I/O failed: {0}")]
    Lcd(#[source] io::Error),
}

/// Fixed-resolution monochrome panel, one packed bitmap per commit.
pub trait PanelDriver: Send {
    /// Rewind the panel's internal data pointer before an image transfer.
    fn reset_pointer(&mut self) -> Result<(), DisplayError>;

    /// Transfer a packed 1-bit frame.
    fn send_image(&mut self, packed: &[u8]) -> Result<(), DisplayError>;

    /// Latch the transferred frame onto the glass.
    fn commit(&mut self) -> Result<(), DisplayError>;
}

/// Character-cell LCD with a controllable backlight.
pub trait LcdDriver: Send {
    /// Write a full line of text. Lines are 1-based.
    fn write_line(&mut self, text: &str, line: u8) -> Result<(), DisplayError>;

    /// Place the visible hardware cursor. Line is 1-based, column 0-based.
    fn set_cursor(&mut self, line: u8, col: u8) -> Result<(), DisplayError>;

    fn backlight(&mut self, on: bool) -> Result<(), DisplayError>;

    fn clear(&mut self) -> Result<(), DisplayError>;
}

pub use canvas::{BlockRasterizer, MonoCanvas, Rasterizer, Rect, Rotation};
pub use lcd::{LcdConfig, LcdScheduler};
pub use panel::{PanelConfig, PanelScheduler};
