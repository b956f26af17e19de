//! Keyboard input handling.
//!
//! This module turns raw Linux key events into shell input bytes:
//!
//! - **source**: evdev device access with exclusive grab
//! - **keymap**: composite-label lookup table (bucky prefix + keycode)
//! - **decoder**: stateful modifier tracking and byte emission
//!
//! # Pipeline
//!
//! ```text
//! EvdevInput ── KeyEvent ──▶ KeyDecoder ── bytes ──▶ shell PTY
//!                               │
//!                               └── KeyMapTable lookup
//! ```

pub mod decoder;
pub mod keymap;
pub mod source;

pub use decoder::{Decoded, KeyDecoder};
pub use keymap::KeyMapTable;
pub use source::{EvdevInput, InputSource, Transition};
