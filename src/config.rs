use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::units::Unit;

const CONFIG_FILE: &str = "config.toml";

#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub measure: MeasureConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MeasureConfig {
    pub allow_multiple_points: bool,
    pub default_unit: Unit,
    pub close_on_capture: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrackingConfig {
    /// Height of the detected surface, meters
    pub plane_height: f32,
    /// Hits farther than this are not confident, meters
    pub max_range: f32,
    /// Frames before the first sample is reported
    pub warmup_frames: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct CaptureConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            allow_multiple_points: true,
            default_unit: Unit::Centimeter,
            close_on_capture: true,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            plane_height: 0.0,
            max_range: 10.0,
            warmup_frames: 45,
        }
    }
}

impl CaptureConfig {
    /// Configured directory, or the per-user temp location.
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(paths::capture_dir)
    }
}

impl AppConfig {
    /// JSON options for the start command.
    pub fn start_options(&self) -> serde_json::Value {
        serde_json::json!({
            "allowMultiplePoints": self.measure.allow_multiple_points,
            "unit": self.measure.default_unit,
            "closeOnCapture": self.measure.close_on_capture,
        })
    }
}

fn config_path() -> PathBuf {
    paths::config_dir().join(CONFIG_FILE)
}

pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> AppConfig {
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    return config;
                }
                Err(e) => {
                    warn!("Failed to parse config: {}, using defaults", e);
                    return AppConfig::default();
                }
            },
            Err(e) => {
                warn!("Failed to read config: {}, using defaults", e);
                return AppConfig::default();
            }
        }
    }

    let config = AppConfig::default();
    save_config_to(&config, path);
    config
}

pub fn save_config_to(config: &AppConfig, path: &Path) {
    match toml::to_string_pretty(config) {
        Ok(contents) => {
            if let Some(parent) = path.parent() {
                paths::ensure_dir(parent);
            }
            if let Err(e) = fs::write(path, contents) {
                error!("Failed to write config: {}", e);
            } else {
                info!("Saved config to {:?}", path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}
