use crate::persistence::{get_data_dir, read_file};
use crate::stats::WeekStart;
use crate::tracker::TrackerOptions;
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Default tracing filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "timetrack=warn";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// First day of the week for weekly totals
    pub week_start: WeekStart,
    /// Live timer refresh interval
    pub tick_ms: u64,
    /// tracing filter directive used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Sunday,
            tick_ms: crate::ticker::DEFAULT_TICK_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `dir`. A missing file means defaults; a malformed one is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE);
        let Some(content) = read_file(&path)? else {
            return Ok(Self::default());
        };

        serde_json::from_str(&content).with_context(|| format!("Malformed settings in {}", path.display()))
    }

    /// Like `load`, but falls back to defaults and hands back the failure so it can
    /// be logged once tracing is up
    pub fn load_or_default(dir: &Path) -> (Self, Option<anyhow::Error>) {
        match Self::load(dir) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn tracker_options(&self) -> TrackerOptions {
        TrackerOptions {
            week_start: self.week_start,
            tick_interval: Duration::milliseconds(self.tick_ms.clamp(50, 60_000) as i64),
        }
    }
}

/// Pick the data directory: explicit override, else local/global lookup
pub fn resolve_data_dir(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) => Ok(dir),
        None => get_data_dir(),
    }
}
