//! Configuration management for paperterm.
//!
//! This module provides TOML configuration file loading from
//! `~/.paperterm/config.toml`.
//!
//! # Configuration File
//!
//! ```toml
//! # Shell to run (optional)
//! shell = "/bin/bash"
//!
//! # Keyboard device node; autodetected when omitted
//! keyboard = "/dev/input/event0"
//!
//! # Keycode that terminates paperterm
//! quit_key = "KEY_F1"
//!
//! [terminal]
//! cols = 80
//! rows = 24
//!
//! [panel]
//! width = 800
//! height = 480
//! rotation = "cw270"
//! debounce_ms = 500
//! poll_ms = 250
//! cell_width = 9
//! cell_height = 18
//! origin_x = 14
//!
//! [lcd]
//! enabled = true
//! width = 40
//! idle_timeout_ms = 5000
//! settle_ms = 100
//! poll_ms = 100
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::display::canvas::Rotation;
use crate::display::{LcdConfig, PanelConfig};

/// Main configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell command to run behind the PTY
    pub shell: String,
    /// Keyboard device node; autodetect when `None`
    pub keyboard: Option<PathBuf>,
    /// Keycode that terminates paperterm
    pub quit_key: String,
    /// Terminal geometry
    pub terminal: TerminalConfig,
    /// Panel backend settings
    pub panel: PanelSection,
    /// LCD backend settings
    pub lcd: LcdSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: "/bin/bash".to_string(),
            keyboard: None,
            quit_key: "KEY_F1".to_string(),
            terminal: TerminalConfig::default(),
            panel: PanelSection::default(),
            lcd: LcdSection::default(),
        }
    }
}

/// Terminal geometry
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub cols: u16,
    pub rows: u16,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

/// Panel backend configuration
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PanelSection {
    pub width: usize,
    pub height: usize,
    pub rotation: Rotation,
    pub debounce_ms: u64,
    pub poll_ms: u64,
    /// Character cell geometry for the rasterizer
    pub cell_width: usize,
    pub cell_height: usize,
    pub origin_x: usize,
}

impl Default for PanelSection {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            rotation: Rotation::Cw270,
            debounce_ms: 500,
            poll_ms: 250,
            cell_width: 9,
            cell_height: 18,
            origin_x: 14,
        }
    }
}

impl PanelSection {
    pub fn scheduler_config(&self) -> PanelConfig {
        PanelConfig {
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            debounce: Duration::from_millis(self.debounce_ms),
            poll_interval: Duration::from_millis(self.poll_ms),
        }
    }
}

/// LCD backend configuration
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LcdSection {
    pub enabled: bool,
    pub width: usize,
    pub idle_timeout_ms: u64,
    pub settle_ms: u64,
    pub poll_ms: u64,
}

impl Default for LcdSection {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 40,
            idle_timeout_ms: 5000,
            settle_ms: 100,
            poll_ms: 100,
        }
    }
}

impl LcdSection {
    pub fn scheduler_config(&self) -> LcdConfig {
        LcdConfig {
            width: self.width,
            idle_timeout: Duration::from_millis(self.idle_timeout_ms),
            settle: Duration::from_millis(self.settle_ms),
            poll_interval: Duration::from_millis(self.poll_ms),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Directory holding config and logs, `~/.paperterm`.
    pub fn app_dir() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".paperterm"))
    }

    fn config_path() -> Option<PathBuf> {
        let dir = Self::app_dir()?;
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.shell, "/bin/bash");
        assert_eq!(config.quit_key, "KEY_F1");
        assert_eq!(config.terminal.cols, 80);
        assert!(config.lcd.enabled);
        assert_eq!(config.panel.rotation, Rotation::Cw270);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            shell = "/bin/zsh"

            [lcd]
            enabled = false
            width = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.shell, "/bin/zsh");
        assert!(!config.lcd.enabled);
        assert_eq!(config.lcd.width, 20);
        // Unspecified sections keep their defaults.
        assert_eq!(config.panel.width, 800);
        assert_eq!(config.lcd.idle_timeout_ms, 5000);
    }

    #[test]
    fn test_rotation_parses_lowercase() {
        let config: Config = toml::from_str(
            r#"
            [panel]
            rotation = "cw90"
            "#,
        )
        .unwrap();
        assert_eq!(config.panel.rotation, Rotation::Cw90);
    }

    #[test]
    fn test_scheduler_config_conversion() {
        let section = LcdSection::default();
        let config = section.scheduler_config();
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.width, 40);
    }
}
