//! User settings, stored as JSON.
//!
//! Looked up at `--config <path>` or `<config_dir>/incident-board/settings.json`.
//! A missing file means defaults; unknown keys are ignored and absent keys
//! fall back to their default values.

use crate::constants::{
    DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, DEFAULT_DATASET, DEFAULT_HOST, DEFAULT_PORT,
    MIN_CHART_SIZE,
};
use crate::data::{DataError, DataResult};
use crate::render::ChartSize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Incident CSV to load
    pub dataset_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Output directory of the `figures` command
    pub figures_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Launch the system browser once the dashboard is up
    pub open_browser: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            figures_dir: PathBuf::from("figures"),
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
            open_browser: false,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; a missing file yields defaults
    pub fn load(path: &Path) -> DataResult<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| DataError::Settings(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(settings.sanitized())
    }

    /// Load from an explicit path, else the default location, else defaults
    pub fn resolve(explicit: Option<&Path>) -> DataResult<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(DataError::Settings(format!(
                        "settings file not found: {}",
                        path.display()
                    )));
                }
                Self::load(path)
            }
            None => match default_settings_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Save settings as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> DataResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Clamp chart dimensions to a usable minimum
    pub fn sanitized(mut self) -> Self {
        self.chart_width = self.chart_width.max(MIN_CHART_SIZE);
        self.chart_height = self.chart_height.max(MIN_CHART_SIZE);
        self
    }

    pub fn chart_size(&self) -> ChartSize {
        ChartSize {
            width: self.chart_width,
            height: self.chart_height,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Default settings file location
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("incident-board").join("settings.json"))
}
