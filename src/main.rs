//! paperterm - an interactive shell on slow displays
//!
//! paperterm runs bash behind a pseudo-terminal, feeds its output through an
//! in-memory VT102 emulator, and mirrors the screen onto two display
//! backends: a full-screen e-paper panel and a 2-line character LCD windowed
//! around the cursor. Input comes straight from a Linux keyboard device,
//! grabbed exclusively and decoded into shell bytes.
//!
//! # Data flow
//!
//! ```text
//! evdev keyboard ─▶ KeyDecoder ─▶ TerminalBridge ─▶ bash (PTY)
//!                                      │
//!                                      ▼
//!                               SharedEmulator
//!                               ╱            ╲
//!                  PanelScheduler            LcdScheduler
//!                  (debounced full           (cursor window,
//!                   frames)                   idle backlight)
//! ```
//!
//! # Quick Start
//!
//! ```text
//! paperterm                  # autodetect keyboard, run /bin/bash
//! paperterm -k /dev/input/event0
//! paperterm --no-lcd         # panel only
//! ```

mod config;
mod core;
mod display;
mod input;

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::core::{ActivityTracker, ByteSink, ShellPty, SharedEmulator, TerminalBridge};
use crate::display::canvas::BlockRasterizer;
use crate::display::demo::{DemoLcd, DemoPanel};
use crate::display::{LcdScheduler, PanelScheduler};
use crate::input::{Decoded, EvdevInput, InputSource, KeyDecoder, KeyMapTable};

/// Command line options layered over the config file.
#[derive(Default)]
struct CliOptions {
    shell: Option<String>,
    keyboard: Option<PathBuf>,
    no_lcd: bool,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("paperterm {}", VERSION);
}

fn print_help() {
    eprintln!("paperterm {} - an interactive shell on slow displays", VERSION);
    eprintln!();
    eprintln!("Usage: paperterm [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -k, --keyboard <DEV>  Keyboard device node (default: autodetect)");
    eprintln!("  -s, --shell <CMD>     Shell command (default: /bin/bash)");
    eprintln!("      --no-lcd          Disable the character LCD backend");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration is read from ~/.paperterm/config.toml; command line");
    eprintln!("options override it. Press the quit key (F1 by default) to exit.");
}

fn parse_args() -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-k" | "--keyboard" => {
                let value = args.next().ok_or("--keyboard requires a device path")?;
                options.keyboard = Some(PathBuf::from(value));
            }
            "-s" | "--shell" => {
                let value = args.next().ok_or("--shell requires a command")?;
                options.shell = Some(value);
            }
            "--no-lcd" => options.no_lcd = true,
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => return Err(format!("unknown option: {}", other)),
        }
    }

    Ok(options)
}

fn init_logging() {
    let log_path = Config::app_dir()
        .map(|dir| dir.join("paperterm.log"))
        .unwrap_or_else(|| PathBuf::from("paperterm.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("paperterm starting...");

    // Merge config: command line overrides config file.
    let mut config = Config::load();
    if let Some(shell) = options.shell {
        config.shell = shell;
    }
    if options.keyboard.is_some() {
        config.keyboard = options.keyboard;
    }
    if options.no_lcd {
        config.lcd.enabled = false;
    }

    run(config)
}

/// Wire everything together and run the foreground input loop.
fn run(config: Config) -> anyhow::Result<()> {
    let (cols, rows) = (config.terminal.cols, config.terminal.rows);

    // Grab the keyboard first: if that fails there is no point starting a
    // shell, and the grab guard releases the device on every exit path.
    let mut source = match &config.keyboard {
        Some(path) => EvdevInput::open(path)?,
        None => EvdevInput::autodetect()?,
    };

    let mut pty = ShellPty::spawn(&config.shell, cols, rows)?;
    let emulator = SharedEmulator::new(rows, cols);
    let mut bridge = TerminalBridge::start(&pty, emulator.clone())?;

    let activity = Arc::new(ActivityTracker::new());
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut backends: Vec<JoinHandle<()>> = Vec::new();

    // Panel backend: debounced full-screen frames.
    {
        let panel = PanelScheduler::new(
            DemoPanel::default(),
            BlockRasterizer::new(
                config.panel.cell_width,
                config.panel.cell_height,
                config.panel.origin_x,
            ),
            config.panel.scheduler_config(),
        );
        let emulator = emulator.clone();
        let activity = activity.clone();
        let shutdown = shutdown.clone();
        backends.push(std::thread::spawn(move || {
            panel.run(emulator, activity, shutdown)
        }));
    }

    // LCD backend: cursor window with idle backlight.
    if config.lcd.enabled {
        let lcd = LcdScheduler::new(DemoLcd, config.lcd.scheduler_config());
        let emulator = emulator.clone();
        let shutdown = shutdown.clone();
        backends.push(std::thread::spawn(move || lcd.run(emulator, shutdown)));
    }

    // Foreground key loop: decode and deliver with nothing display-related
    // in the way.
    let mut decoder = KeyDecoder::new(KeyMapTable::new(), config.quit_key.clone());
    loop {
        if !bridge.is_running() {
            info!("shell exited");
            break;
        }
        let event = match source.next_event() {
            Ok(event) => event,
            Err(e) => {
                error!("keyboard read failed: {}", e);
                break;
            }
        };
        match decoder.decode(&event.code, event.transition) {
            Decoded::Bytes(bytes) => {
                activity.touch();
                if let Err(e) = bridge.send(&bytes) {
                    error!("shell write failed: {}", e);
                    break;
                }
            }
            Decoded::Quit => {
                info!("quit key pressed");
                break;
            }
            Decoded::Nothing => {}
        }
    }

    // Orderly shutdown: each scheduler blanks its own display on the way out.
    shutdown.store(true, Ordering::SeqCst);
    for handle in backends {
        let _ = handle.join();
    }

    pty.kill();
    info!("paperterm stopped");
    Ok(())
}
