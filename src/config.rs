//! Application configuration

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_with::serde_as;

use crate::errors::SnooprError;

/// Default movement threshold; large enough to ignore GPS jitter of a
/// stationary device.
pub const DEFAULT_DISTANCE_THRESHOLD_MILES: f64 = 0.5;
pub const DEFAULT_TIME_WINDOW: Duration = Duration::from_secs(3600);
/// About 33 m of latitude.
pub const DEFAULT_OFFSET_DEGREES: f64 = 0.0003;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    /// Kismet capture to read; the newest one in `search_dir` if unset
    pub path: Option<PathBuf>,
    #[serde(default = "default_search_dir")]
    pub search_dir: PathBuf,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DetectionConfig {
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold_miles: f64,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_time_window")]
    pub time_window: Duration,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LocatorConfig {
    /// Offset added to both axes of an inferred alert position
    #[serde(default = "default_offset_degrees")]
    pub offset_degrees: f64,
    /// Map center as `[lat, lon]`
    pub map_center: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

fn default_search_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_distance_threshold() -> f64 {
    DEFAULT_DISTANCE_THRESHOLD_MILES
}

fn default_time_window() -> Duration {
    DEFAULT_TIME_WINDOW
}

fn default_offset_degrees() -> f64 {
    DEFAULT_OFFSET_DEGREES
}

fn default_output_path() -> PathBuf {
    PathBuf::from("snoopr_report.json")
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            path: None,
            search_dir: default_search_dir(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            distance_threshold_miles: DEFAULT_DISTANCE_THRESHOLD_MILES,
            time_window: DEFAULT_TIME_WINDOW,
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            offset_degrees: DEFAULT_OFFSET_DEGREES,
            map_center: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("SNOOPR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("locator.map_center"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), SnooprError> {
        self.detection.validate()?;
        self.locator.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

impl DetectionConfig {
    /// Checked constructor
    pub fn new(distance_threshold_miles: f64, time_window: Duration) -> Result<Self, SnooprError> {
        let config = Self {
            distance_threshold_miles,
            time_window,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SnooprError> {
        if !self.distance_threshold_miles.is_finite() || self.distance_threshold_miles < 0.0 {
            return Err(SnooprError::ConfigurationError {
                message: format!(
                    "Distance threshold must be a non-negative number of miles, got {}",
                    self.distance_threshold_miles
                ),
            });
        }
        Ok(())
    }
}

impl LocatorConfig {
    pub fn validate(&self) -> Result<(), SnooprError> {
        if !self.offset_degrees.is_finite() || self.offset_degrees < 0.0 {
            return Err(SnooprError::ConfigurationError {
                message: format!(
                    "Alert offset must be a non-negative number of degrees, got {}",
                    self.offset_degrees
                ),
            });
        }
        if let Some([lat, lon]) = self.map_center {
            let in_range = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
            if !in_range {
                return Err(SnooprError::ConfigurationError {
                    message: format!("Map center out of range: ({}, {})", lat, lon),
                });
            }
        }
        Ok(())
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), SnooprError> {
        if self.path.as_os_str().is_empty() {
            return Err(SnooprError::ConfigurationError {
                message: "Output path cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
