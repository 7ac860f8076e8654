//! Physical constants and system parameters

/// Conversion factor from meters/second to kilometers/hour
pub const MS_TO_KMH: f64 = 3.6;

/// Seconds per hour, used to pro-rate drift rates given in degrees/hour
pub const SECS_PER_HOUR: f64 = 3600.0;

/// Time gap (seconds) that breaks dead-reckoning continuity
pub const DR_GAP_RESET_SECS: f64 = 300.0;

/// Default maximum number of fixes held in the active buffer
pub const DEFAULT_BUFFER_CAPACITY: usize = 5000;

/// Default Gaussian mean smoothing window (seconds)
pub const DEFAULT_GAUSSIAN_WINDOW_SECS: f64 = 60.0;

/// Default inversion weight on first-difference (speed) smoothness rows
pub const DEFAULT_WEIGHT_SPEED: f64 = 100.0;

/// Default inversion weight on second-difference (acceleration) rows
pub const DEFAULT_WEIGHT_ACCEL: f64 = 100.0;

/// Default hard cap on solver iterations per inversion solve
pub const DEFAULT_SOLVER_ITERATIONS: usize = 500;

/// Cycles spent refining the singular-value upper bound before iterating
pub const SOLVER_ESTIMATION_CYCLES: usize = 4;

/// Ratio between the largest and smallest eigenvalue the Chebyshev
/// filter is tuned for
pub const SOLVER_BANDWIDTH_RATIO: f64 = 1.0e4;
