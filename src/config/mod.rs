//! Configuration module for the VTI monitor
//!
//! This module handles monitor configuration including:
//! - Pipeline settings (downsampling, smoothing, detection, integration)
//! - The initial vessel radius
//! - Logging options for the binary
//!
//! # Config Location
//!
//! When no path is given, the monitor looks in the platform config directory
//! under `vti-monitor`:
//!
//! - **Linux**: `~/.config/vti-monitor/monitor.toml`
//! - **macOS**: `~/Library/Application Support/vti-monitor/monitor.toml`
//! - **Windows**: `%APPDATA%\vti-monitor\monitor.toml`
//!
//! # Formats
//!
//! Files ending in `.toml` are read and written as TOML; everything else is
//! JSON. Missing fields take their defaults.
//!
//! # Example
//!
//! ```ignore
//! use vti_monitor::config::MonitorConfig;
//!
//! let config = MonitorConfig::load_or_default("monitor.toml");
//! let pipeline = VtiPipeline::new(config.pipeline.clone())?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, VtiError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "vti-monitor";

/// Default config filename
pub const CONFIG_FILE: &str = "monitor.toml";

/// Default vessel radius in meters (10 mm)
pub const DEFAULT_VESSEL_RADIUS_M: f64 = 0.01;

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// On-disk format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Vessel radius (m) used until the user enters a measured one
    pub vessel_radius_m: f64,

    /// Tracing filter directive, e.g. `"info,vti_monitor=trace"`
    pub log_filter: Option<String>,

    /// Directory for rolling log files (stderr only when unset)
    pub log_dir: Option<PathBuf>,

    /// Signal-processing settings
    pub pipeline: PipelineConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            vessel_radius_m: DEFAULT_VESSEL_RADIUS_M,
            log_filter: None,
            log_dir: None,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VtiError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = match ConfigFormat::for_path(path) {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| {
                VtiError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?,
            ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| {
                VtiError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?,
        };

        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load a config file, returning defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config to disk in the format implied by the extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = match ConfigFormat::for_path(path) {
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| VtiError::Config(format!("Failed to serialize config: {}", e)))?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| VtiError::Config(format!("Failed to serialize config: {}", e)))?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    VtiError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        std::fs::write(path, content).map_err(|e| {
            VtiError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Validate pipeline settings and the initial radius
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        if !self.vessel_radius_m.is_finite() || self.vessel_radius_m <= 0.0 {
            return Err(VtiError::Config(format!(
                "vessel_radius_m must be a positive number, got {}",
                self.vessel_radius_m
            )));
        }
        Ok(())
    }
}
