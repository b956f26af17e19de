//! Terminal bridge
//!
//! Owns both directions of the shell's byte channel: decoded key bytes go to
//! the PTY writer synchronously on the caller's thread, and a background
//! reader thread pumps shell output into the shared emulator. A read failure
//! (channel closed, shell exited) ends the reader thread cleanly without
//! touching the rest of the process.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use super::emulator::SharedEmulator;
use super::pty::{PtyError, Result, ShellPty};

/// Sink for decoded key bytes. Implemented by the bridge for the real shell
/// and by test harnesses for capture.
pub trait ByteSink {
    fn send(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Pumps shell output into the emulator and key bytes into the shell.
pub struct TerminalBridge {
    writer: Box<dyn Write + Send>,
    running: Arc<AtomicBool>,
    reader_thread: Option<JoinHandle<()>>,
}

impl TerminalBridge {
    /// Take the shell's writer and start the output reader thread.
    pub fn start(pty: &ShellPty, emulator: SharedEmulator) -> Result<Self> {
        let writer = pty.take_writer()?;
        let mut reader = pty.clone_reader()?;
        let running = Arc::new(AtomicBool::new(true));

        let reader_running = running.clone();
        let reader_thread = thread::spawn(move || {
            let mut buffer = vec![0u8; 4096];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) | Err(_) => {
                        // Shell exited or PTY closed; end only this loop.
                        info!("shell output channel closed");
                        reader_running.store(false, Ordering::SeqCst);
                        break;
                    }
                    Ok(n) => {
                        debug!(bytes = n, "shell output");
                        emulator.feed(&buffer[..n]);
                    }
                }
            }
        });

        Ok(Self {
            writer,
            running,
            reader_thread: Some(reader_thread),
        })
    }

    /// Whether the shell's output channel is still open.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl ByteSink for TerminalBridge {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).map_err(PtyError::Write)?;
        self.writer.flush().map_err(PtyError::Write)
    }
}

impl Drop for TerminalBridge {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // The reader unblocks once the PTY master drops; don't wait on it
        // here or shutdown could stall behind a blocked read.
        if let Some(handle) = self.reader_thread.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecSink(Vec<u8>);

    impl ByteSink for VecSink {
        fn send(&mut self, bytes: &[u8]) -> Result<()> {
            self.0.extend_from_slice(bytes);
            Ok(())
        }
    }

    #[test]
    fn test_byte_sink_substitution() {
        let mut sink = VecSink(Vec::new());
        sink.send(&[27]).unwrap();
        sink.send(b"[A").unwrap();
        assert_eq!(sink.0, b"\x1b[A");
    }
}
