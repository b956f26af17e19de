//! Logging stand-in drivers
//!
//! Implementations of the driver traits that only log what the hardware
//! would be told, so the whole pipeline can run on a development machine
//! with no panel or LCD attached.

use tracing::info;

use super::{DisplayError, LcdDriver, PanelDriver};

/// Panel driver that logs transfers instead of touching hardware.
#[derive(Default)]
pub struct DemoPanel {
    frames: u64,
}

impl PanelDriver for DemoPanel {
    fn reset_pointer(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn send_image(&mut self, packed: &[u8]) -> Result<(), DisplayError> {
        info!(bytes = packed.len(), "panel frame transferred");
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DisplayError> {
        self.frames += 1;
        info!(frame = self.frames, "panel frame committed");
        Ok(())
    }
}

/// LCD driver that logs writes instead of touching the bus.
#[derive(Default)]
pub struct DemoLcd;

impl LcdDriver for DemoLcd {
    fn write_line(&mut self, text: &str, line: u8) -> Result<(), DisplayError> {
        info!(line, text = text.trim_end(), "lcd write");
        Ok(())
    }

    fn set_cursor(&mut self, line: u8, col: u8) -> Result<(), DisplayError> {
        info!(line, col, "lcd cursor");
        Ok(())
    }

    fn backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        info!(on, "lcd backlight");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        info!("lcd clear");
        Ok(())
    }
}
