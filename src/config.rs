//! # Configuration Module
//!
//! Connection parameters and default playback options.
//!
//! Values are resolved in this order, first match wins:
//!
//! 1. Command-line flags (`--host`, `--port`, `--password`, ...)
//! 2. Environment (`MPD_HOST`, `MPD_PORT`), read by clap
//! 3. The JSON config file
//! 4. Built-in defaults: `127.0.0.1:6600`, no password, playlist mode
//!
//! ## Config File
//!
//! Stored in the platform config directory:
//! - Linux: `~/.config/mpdrandom/config.json`
//! - macOS: `~/Library/Application Support/mpdrandom/config.json`
//! - Windows: `%APPDATA%\mpdrandom\config.json`
//!
//! ```json
//! { "host": "music.local", "port": 6600, "library": true, "clear": true, "base": "jazz" }
//! ```

use crate::playback::PlaybackMode;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6600;

/// Where and how to connect to MPD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            password: None,
        }
    }
}

impl ConnectionConfig {
    /// `host:port`, suitable for `ToSocketAddrs`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Persistent defaults read from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    /// Pick albums from the whole library instead of the queue
    pub library: bool,
    /// Library mode: clear the queue before adding an album
    pub clear: bool,
    /// Library mode: restrict picks to this music-directory path
    pub base: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let connection = ConnectionConfig::default();
        Self {
            host: connection.host,
            port: connection.port,
            password: connection.password,
            library: false,
            clear: false,
            base: None,
        }
    }
}

impl Settings {
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            password: self.password.clone(),
        }
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        if self.library {
            PlaybackMode::library(self.clear, self.base.clone())
        } else {
            PlaybackMode::playlist()
        }
    }

    /// Apply a host value the way `mpc` reads `MPD_HOST`: `password@host`
    /// carries a password.
    pub fn set_host(&mut self, host: &str) {
        match host.rsplit_once('@') {
            Some((password, host)) if !password.is_empty() => {
                self.password = Some(password.to_string());
                self.host = host.to_string();
            }
            _ => self.host = host.to_string(),
        }
    }
}

/// Returns the platform-appropriate config file path.
///
/// The file itself is optional and is not created.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system config directory. Pass --config to use an explicit file."
        )
    })?;
    Ok(config_dir.join("mpdrandom").join("config.json"))
}

/// Load settings from `path`. A missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let settings = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}
