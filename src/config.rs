//! Configuration management for ledmap
//!
//! Provides configuration loading, saving, and management for capture,
//! detection, mapping strategy, and output artifact options.

use crate::errors::MappingError;
use crate::reconcile::CollisionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    pub camera: CameraConfig,
    pub detection: DetectionConfig,
    pub mapping: MappingConfig,
    pub output: OutputConfig,
}

/// Camera-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera device index handed to the frame-source backend
    pub device_id: u32,
    /// Frames grabbed and discarded before the first capture, letting
    /// auto-exposure settle
    pub warmup_frames: u32,
}

/// Blob detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Grayscale value above which a pixel counts as lit (0-255)
    pub threshold: u8,
    /// Minimum blob extent in each dimension, in pixels
    pub min_blob_size: u32,
    /// Structuring element size for the morphological open; 0 or 1
    /// disables it
    pub erosion_size: u32,
}

/// Mapping strategy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Pattern strategy: binary (log N frames) or linear (N frames)
    pub method: MappingMethod,
    /// Settle delay between pattern change and capture, in milliseconds
    pub settle_delay_ms: u64,
    /// Match radius for blob-to-candidate correspondence, in pixels
    pub proximity_tolerance_px: f64,
    /// How decode collisions and out-of-range indices are handled
    pub collision_policy: CollisionPolicy,
    /// Strand brightness applied for the mapping run (0.0-1.0)
    pub calibration_brightness: f32,
}

/// Output artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for generated artifacts
    pub directory: String,
    /// Write the overlay PNG alongside the JSON map
    pub write_overlay: bool,
    /// Base name for generated artifacts
    pub map_name: String,
}

/// Pattern strategy selector.
///
/// Binary needs `ceil(log2 N)` capture frames; linear needs `N` but has
/// no decoding step to go wrong, which makes it a useful fallback for
/// small installations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MappingMethod {
    #[default]
    Binary,
    Linear,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                device_id: 0,
                warmup_frames: 2,
            },
            detection: DetectionConfig {
                threshold: 230,
                min_blob_size: 3,
                erosion_size: 3,
            },
            mapping: MappingConfig {
                method: MappingMethod::Binary,
                settle_delay_ms: 200,
                proximity_tolerance_px: 2.0,
                collision_policy: CollisionPolicy::KeepFirst,
                calibration_brightness: 0.5,
            },
            output: OutputConfig {
                directory: "out".to_string(),
                write_overlay: true,
                map_name: "pixelmap".to_string(),
            },
        }
    }
}

impl MapperConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, MappingError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            MappingError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: MapperConfig = toml::from_str(&contents).map_err(|e| {
            MappingError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MappingError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MappingError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            MappingError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            MappingError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("ledmap.toml")
    }

    /// Load from default location or create with defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.detection.min_blob_size == 0 {
            return Err("Minimum blob size must be at least 1 pixel".to_string());
        }
        if self.mapping.proximity_tolerance_px <= 0.0 {
            return Err("Proximity tolerance must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.mapping.calibration_brightness) {
            return Err("Calibration brightness must be between 0.0 and 1.0".to_string());
        }
        if self.output.map_name.is_empty() {
            return Err("Output map name must not be empty".to_string());
        }
        Ok(())
    }
}
