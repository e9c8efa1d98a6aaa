//! Configuration loading and parsing.
//!
//! Parses `pomo.toml` (or an override path provided by the binary). Every
//! field is optional; missing sections fall back to defaults. Out-of-range
//! values are clamped rather than rejected so a bad file never prevents the
//! timer from starting. Unknown fields are ignored to allow forward evolution.
//!
//! ```toml
//! [timer]
//! minutes = 15
//! tick_ms = 1000
//!
//! [display]
//! filled_glyph = "⬢"
//! unfilled_glyph = "⬡"
//! selection_marker = "› "
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

const MIN_TICK_MS: u64 = 10;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    #[serde(default = "TimerConfig::default_minutes")]
    pub minutes: u64,
    #[serde(default = "TimerConfig::default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            minutes: Self::default_minutes(),
            tick_ms: Self::default_tick_ms(),
        }
    }
}

impl TimerConfig {
    const fn default_minutes() -> u64 {
        15
    }
    const fn default_tick_ms() -> u64 {
        1000
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    #[serde(default = "DisplayConfig::default_filled")]
    pub filled_glyph: String,
    #[serde(default = "DisplayConfig::default_unfilled")]
    pub unfilled_glyph: String,
    #[serde(default = "DisplayConfig::default_marker")]
    pub selection_marker: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            filled_glyph: Self::default_filled(),
            unfilled_glyph: Self::default_unfilled(),
            selection_marker: Self::default_marker(),
        }
    }
}

impl DisplayConfig {
    fn default_filled() -> String {
        "⬢".to_string()
    }
    fn default_unfilled() -> String {
        "⬡".to_string()
    }
    fn default_marker() -> String {
        "› ".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,     // original file string (optional)
    pub source: Option<PathBuf>, // path the file was read from
    pub file: ConfigFile,        // parsed (or default) data
}

/// Config path: `pomo.toml` in the working directory, else the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("pomo.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("pomo").join("pomo.toml");
    }
    PathBuf::from("pomo.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_absent_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                source: Some(path),
                file,
            })
        }
        Err(err) => {
            warn!(target: "config", path = %path.display(), %err, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Length of one pomodoro (at least one minute).
    pub fn pomodoro_duration(&self) -> Duration {
        Duration::from_secs(self.file.timer.minutes.max(1) * 60)
    }

    /// Period of the countdown tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.file.timer.tick_ms.max(MIN_TICK_MS))
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.file.display
    }
}
