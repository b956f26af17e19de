//! Shell process behind a pseudo-terminal
//!
//! Wraps `portable-pty` to spawn the interactive shell and expose its byte
//! channel: a writer for decoded key bytes and a cloneable reader for the
//! output pump.

use std::io::{Read, Write};

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use thiserror::Error;

/// Boxed error from the pty layer, which reports `anyhow::Error`.
type PtySource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PtyError {
    #[error("failed to open pty: {0}")]
    Open(#[source] PtySource),

    #[error("failed to spawn shell: {0}")]
    Spawn(#[source] PtySource),

    #[error("failed to clone pty reader: {0}")]
    Reader(#[source] PtySource),

    #[error("failed to take pty writer: {0}")]
    Writer(#[source] PtySource),

    #[error("failed to write to shell: {0}")]
    Write(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PtyError>;

/// A shell running behind a pseudo-terminal.
pub struct ShellPty {
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
}

impl ShellPty {
    /// Spawn `command` (e.g. `/bin/bash`) as an interactive shell on a fresh
    /// PTY of the given size. `COLUMNS`/`LINES` are exported so curses
    /// applications agree with the emulator about geometry.
    pub fn spawn(command: &str, cols: u16, rows: u16) -> Result<Self> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| PtyError::Open(e.into()))?;

        let mut cmd = CommandBuilder::new(command);
        cmd.arg("-i");
        cmd.env("TERM", "vt102");
        cmd.env("COLUMNS", cols.to_string());
        cmd.env("LINES", rows.to_string());

        let child = pair.slave.spawn_command(cmd).map_err(|e| PtyError::Spawn(e.into()))?;
        drop(pair.slave);

        Ok(Self {
            master: pair.master,
            child,
        })
    }

    /// Clone a reader for the shell's output stream.
    pub fn clone_reader(&self) -> Result<Box<dyn Read + Send>> {
        self.master.try_clone_reader().map_err(|e| PtyError::Reader(e.into()))
    }

    /// Take the writer for the shell's input stream. Can only be taken once.
    pub fn take_writer(&self) -> Result<Box<dyn Write + Send>> {
        self.master.take_writer().map_err(|e| PtyError::Writer(e.into()))
    }

    /// Whether the shell process is still alive.
    #[allow(dead_code)]
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Terminate the shell, ignoring errors if it already exited.
    pub fn kill(&mut self) {
        let _ = self.child.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_spawn_shell() {
        let pty = ShellPty::spawn("/bin/sh", 80, 24);
        assert!(pty.is_ok());
        let mut pty = pty.unwrap();
        assert!(pty.is_running());
        pty.kill();
    }
}
