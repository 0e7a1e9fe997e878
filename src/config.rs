use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use tracing::{info, warn};

use crate::layout::LayoutOptions;

const APP_DIR: &str = "academic-calendar";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON document with events, schedule and directory lists.
    pub data_file: Option<PathBuf>,
    pub layout: LayoutOptions,
}

impl Config {
    /// Load `path`, or the default location when `None`.
    ///
    /// A missing default file yields defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            info!(file = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::parse(&content)
            .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
        config.sanitize();

        info!(file = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Replace out-of-range values with their defaults.
    pub fn sanitize(&mut self) {
        let defaults = LayoutOptions::default();
        let layout = &mut self.layout;

        if layout.max_cell_events == 0 {
            warn!("max_cell_events must be positive; using default");
            layout.max_cell_events = defaults.max_cell_events;
        }

        if layout.now_refresh_secs == 0 {
            warn!("now_refresh_secs must be positive; using default");
            layout.now_refresh_secs = defaults.now_refresh_secs;
        }

        let min_height = layout.timeline.min_height_percent;
        if !(0.0..=100.0).contains(&min_height) {
            warn!(min_height, "min_height_percent out of range; using default");
            layout.timeline.min_height_percent = defaults.timeline.min_height_percent;
        }

        let (start, end) = (
            layout.timeline.default_start_hour,
            layout.timeline.default_end_hour,
        );
        if end > 24 || start >= end {
            warn!(start, end, "default timeline window is invalid; using default");
            layout.timeline.default_start_hour = defaults.timeline.default_start_hour;
            layout.timeline.default_end_hour = defaults.timeline.default_end_hour;
        }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Where the log file goes; the terminal belongs to the UI.
pub fn log_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|d| d.join(APP_DIR).join("academic-calendar.log"))
}
