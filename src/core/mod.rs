//! Core terminal plumbing.
//!
//! This module owns the shell process and the in-memory screen it draws on:
//!
//! - **pty**: shell process behind a pseudo-terminal (`portable-pty`)
//! - **emulator**: mutex-guarded VT102 emulator publishing screen snapshots
//! - **bridge**: byte pumps between keyboard, shell, and emulator
//! - **activity**: keyboard quiescence clock for redraw debouncing
//!
//! # Architecture
//!
//! ```text
//! KeyDecoder ── bytes ──▶ TerminalBridge ──▶ ShellPty (bash)
//!                              │                 │
//!                              │    output   ◀───┘
//!                              ▼
//!                       SharedEmulator ── ScreenSnapshot ──▶ schedulers
//! ```

pub mod activity;
pub mod bridge;
pub mod emulator;
pub mod pty;

pub use activity::ActivityTracker;
pub use bridge::{ByteSink, TerminalBridge};
pub use emulator::{ScreenSnapshot, SharedEmulator};
pub use pty::ShellPty;
