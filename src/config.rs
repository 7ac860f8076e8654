//! Session configuration
//!
//! Serializable parameters for the buffer, the smoothing models and the
//! solver, with validation and JSON file round-trip.

use crate::core::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_GAUSSIAN_WINDOW_SECS, DEFAULT_SOLVER_ITERATIONS,
    DEFAULT_WEIGHT_ACCEL, DEFAULT_WEIGHT_SPEED, SOLVER_BANDWIDTH_RATIO,
};
use crate::model::PositionModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    Io { message: String },
    /// JSON serialization/deserialization error
    Serialization { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => write!(f, "invalid {} = {}: {}", parameter, value, reason),
            ConfigError::Io { message } => write!(f, "config I/O error: {}", message),
            ConfigError::Serialization { message } => {
                write!(f, "config serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tunable session parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum fixes held in the active buffer
    pub buffer_capacity: usize,
    /// Fixes pulled per load call
    pub load_chunk: usize,
    /// Fixes retained at the head of the window on each dump
    pub hold_count: usize,
    /// Gaussian mean smoothing window (seconds)
    pub gaussian_window_secs: f64,
    /// Dead-reckoning drift rates (degrees per hour)
    pub drift_lon: f64,
    pub drift_lat: f64,
    /// Inversion weight on first-difference smoothness rows
    pub weight_speed: f64,
    /// Inversion weight on second-difference smoothness rows
    pub weight_accel: f64,
    /// Solver iteration budget per inversion solve
    pub solver_iterations: usize,
    /// Eigenvalue band ratio for the solver's Chebyshev filter
    pub solver_bandwidth_ratio: f64,
    /// Default pixel radius for range selection
    pub pick_radius_px: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            load_chunk: 1000,
            hold_count: 100,
            gaussian_window_secs: DEFAULT_GAUSSIAN_WINDOW_SECS,
            drift_lon: 0.0,
            drift_lat: 0.0,
            weight_speed: DEFAULT_WEIGHT_SPEED,
            weight_accel: DEFAULT_WEIGHT_ACCEL,
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            solver_bandwidth_ratio: SOLVER_BANDWIDTH_RATIO,
            pick_radius_px: 10,
        }
    }
}

impl SessionConfig {
    /// Check every parameter, reporting the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |parameter: &str, value: String, reason: &str| {
            Err(ConfigError::InvalidParameter {
                parameter: parameter.to_string(),
                value,
                reason: reason.to_string(),
            })
        };

        if self.buffer_capacity < 2 {
            return invalid(
                "buffer_capacity",
                self.buffer_capacity.to_string(),
                "at least two fixes must fit in the buffer",
            );
        }
        if self.load_chunk == 0 {
            return invalid("load_chunk", "0".to_string(), "must be positive");
        }
        if self.hold_count >= self.buffer_capacity {
            return invalid(
                "hold_count",
                self.hold_count.to_string(),
                "must be smaller than buffer_capacity",
            );
        }
        if !(self.gaussian_window_secs > 0.0) {
            return invalid(
                "gaussian_window_secs",
                self.gaussian_window_secs.to_string(),
                "must be positive",
            );
        }
        if !(self.weight_speed > 0.0) || !(self.weight_accel > 0.0) {
            return invalid(
                "weight_speed/weight_accel",
                format!("{}/{}", self.weight_speed, self.weight_accel),
                "inversion weights must be positive",
            );
        }
        if self.solver_iterations == 0 {
            return invalid("solver_iterations", "0".to_string(), "must be positive");
        }
        if !(self.solver_bandwidth_ratio > 1.0) {
            return invalid(
                "solver_bandwidth_ratio",
                self.solver_bandwidth_ratio.to_string(),
                "must exceed 1",
            );
        }
        if self.pick_radius_px <= 0 {
            return invalid(
                "pick_radius_px",
                self.pick_radius_px.to_string(),
                "must be positive",
            );
        }
        Ok(())
    }

    /// Gaussian mean model with the configured window
    pub fn gaussian_model(&self) -> PositionModel {
        PositionModel::GaussianMean {
            window_secs: self.gaussian_window_secs,
        }
    }

    /// Dead-reckoning model with the configured drift rates
    pub fn dead_reckoning_model(&self) -> PositionModel {
        PositionModel::DeadReckoning {
            drift_lon: self.drift_lon,
            drift_lat: self.drift_lat,
        }
    }

    /// Inversion model with the configured smoothness weights
    pub fn inversion_model(&self) -> PositionModel {
        PositionModel::Inversion {
            weight_speed: self.weight_speed,
            weight_accel: self.weight_accel,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| ConfigError::Serialization {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
            message: e.to_string(),
        })?;
        fs::write(path, text).map_err(|e| ConfigError::Io {
            message: e.to_string(),
        })
    }
}
