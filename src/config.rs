//! Tunable camera configuration.
//!
//! Defaults mirror the built-in behavior: 5x zoom ceiling, 50/100 px
//! reserved tap bands, and the 250 ms burst cadence with 100 ms torch
//! priming and finalize grace. A TOML file can override any section.

use crate::control::TapMargins;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Zoom clamp applied on top of each device's own maximum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZoomLimits {
    /// Smallest allowed zoom factor.
    pub min: f32,
    /// Largest allowed zoom factor, further capped by the device.
    pub max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

/// Timing knobs for the burst scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BurstTiming {
    /// Nominal interval between frame starts, in milliseconds.
    pub interval_ms: u64,
    /// Torch warm-up before the first frame, in milliseconds.
    pub torch_priming_ms: u64,
    /// Grace period after the last frame before finalizing, in
    /// milliseconds.
    pub finalize_grace_ms: u64,
}

impl Default for BurstTiming {
    fn default() -> Self {
        Self {
            interval_ms: 250,
            torch_priming_ms: 100,
            finalize_grace_ms: 100,
        }
    }
}

impl BurstTiming {
    /// Nominal inter-frame interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Torch priming delay.
    pub fn torch_priming(&self) -> Duration {
        Duration::from_millis(self.torch_priming_ms)
    }

    /// Finalize grace period.
    pub fn finalize_grace(&self) -> Duration {
        Duration::from_millis(self.finalize_grace_ms)
    }
}

/// Full configuration for the camera screen core.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CameraConfig {
    /// Zoom clamping.
    #[serde(default)]
    pub zoom: ZoomLimits,
    /// Reserved tap bands.
    #[serde(default)]
    pub tap: TapMargins,
    /// Burst timing.
    #[serde(default)]
    pub burst: BurstTiming,
}

impl CameraConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zoom.min < 1.0 || self.zoom.max < self.zoom.min {
            return Err(ConfigError::InvalidZoomLimits);
        }
        if self.tap.top < 0.0 || self.tap.bottom < 0.0 {
            return Err(ConfigError::InvalidTapMargins);
        }
        if self.burst.interval_ms == 0 || self.burst.interval_ms > 1000 {
            return Err(ConfigError::InvalidBurstInterval);
        }
        Ok(())
    }

    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: CameraConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid zoom limits (min must be >= 1.0 and <= max)")]
    InvalidZoomLimits,
    #[error("invalid tap margins (must be non-negative)")]
    InvalidTapMargins,
    #[error("invalid burst interval (must be 1-1000 ms)")]
    InvalidBurstInterval,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}
