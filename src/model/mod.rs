//! Position model engine
//!
//! A tagged state keyed by the user's explicit model selection, with one
//! implementation per variant. The mean and dead-reckoning models run
//! buffer-wide; inversion runs over the visible window only.

pub mod dead_reckoning;
pub mod gaussian;
pub mod inversion;

use crate::core::Fix;
use crate::error::NavResult;
use crate::solver::SmoothingSolver;

/// The active position-smoothing model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionModel {
    Off,
    GaussianMean {
        window_secs: f64,
    },
    DeadReckoning {
        /// Drift rates in degrees per hour
        drift_lon: f64,
        drift_lat: f64,
    },
    Inversion {
        weight_speed: f64,
        weight_accel: f64,
    },
}

impl PositionModel {
    /// Dead reckoning and inversion force the model overlay on when
    /// entered; the mean model leaves the display choice alone
    pub fn forces_overlay(&self) -> bool {
        matches!(
            self,
            PositionModel::DeadReckoning { .. } | PositionModel::Inversion { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            PositionModel::Off => "off",
            PositionModel::GaussianMean { .. } => "gaussian mean",
            PositionModel::DeadReckoning { .. } => "dead reckoning",
            PositionModel::Inversion { .. } => "inversion",
        }
    }
}

/// Recompute the active model. `window` is the visible range the
/// inversion model is scoped to; the other models ignore it.
pub fn recompute(
    model: PositionModel,
    fixes: &mut [Fix],
    window: (usize, usize),
    solver: &SmoothingSolver,
) -> NavResult<()> {
    match model {
        PositionModel::Off => Ok(()),
        PositionModel::GaussianMean { window_secs } => gaussian::run(fixes, window_secs),
        PositionModel::DeadReckoning { drift_lon, drift_lat } => {
            dead_reckoning::run(fixes, drift_lon, drift_lat)
        }
        PositionModel::Inversion {
            weight_speed,
            weight_accel,
        } => {
            let (start, end) = window;
            let end = end.min(fixes.len());
            let start = start.min(end);
            inversion::run(&mut fixes[start..end], weight_speed, weight_accel, solver)
        }
    }
}
