//! Keyboard event sources
//!
//! Reads key events from a Linux evdev device, grabbed for exclusive access
//! so keystrokes never leak to the console the process was started from. The
//! grab is released on every exit path via `Drop`.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use evdev::{Device, InputEventKind};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to open input device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to grab input device for exclusive access: {0}")]
    Grab(#[source] io::Error),

    #[error("failed to read input events: {0}")]
    Read(#[source] io::Error),

    #[error("no keyboard-like input device found")]
    NoKeyboard,
}

/// Key transition reported by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Pressed,
    Released,
    Repeating,
}

impl Transition {
    /// Map an evdev key event value (0 = up, 1 = down, 2 = hold).
    fn from_value(value: i32) -> Option<Transition> {
        match value {
            0 => Some(Transition::Released),
            1 => Some(Transition::Pressed),
            2 => Some(Transition::Repeating),
            _ => None,
        }
    }
}

/// A single keyboard event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Symbolic keycode name, e.g. `KEY_A`.
    pub code: String,
    pub transition: Transition,
}

/// Source of an unbounded stream of key events.
pub trait InputSource {
    /// Block until the next key event arrives.
    fn next_event(&mut self) -> Result<KeyEvent, InputError>;
}

/// Exclusive evdev keyboard reader.
pub struct EvdevInput {
    device: Device,
    pending: VecDeque<KeyEvent>,
}

impl EvdevInput {
    /// Open and grab a specific device node.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let device = Device::open(path).map_err(|e| InputError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::grab(device)
    }

    /// Open and grab the first device whose name looks like a keyboard.
    /// Not infallible, but good enough for a dedicated appliance.
    pub fn autodetect() -> Result<Self, InputError> {
        for (path, device) in evdev::enumerate() {
            let name = device.name().unwrap_or("").to_string();
            if name.to_lowercase().contains("keyboard") || name.contains("eybo") {
                info!(device = %path.display(), name = %name, "autodetected keyboard");
                return Self::grab(device);
            }
        }
        Err(InputError::NoKeyboard)
    }

    fn grab(mut device: Device) -> Result<Self, InputError> {
        device.grab().map_err(InputError::Grab)?;
        Ok(Self {
            device,
            pending: VecDeque::new(),
        })
    }
}

impl InputSource for EvdevInput {
    fn next_event(&mut self) -> Result<KeyEvent, InputError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }
            // fetch_events blocks until at least one event is available and
            // may deliver a batch; keep the surplus for later calls.
            let events = self.device.fetch_events().map_err(InputError::Read)?;
            for event in events {
                if let InputEventKind::Key(key) = event.kind() {
                    if let Some(transition) = Transition::from_value(event.value()) {
                        self.pending.push_back(KeyEvent {
                            code: format!("{:?}", key),
                            transition,
                        });
                    }
                }
            }
        }
    }
}

impl Drop for EvdevInput {
    fn drop(&mut self) {
        // Best-effort release of the exclusive grab.
        let _ = self.device.ungrab();
    }
}
