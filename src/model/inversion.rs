//! Window-scoped inversion smoothing
//!
//! Builds the sparse system of §solver rows over the visible window and
//! solves longitude and latitude independently. Unflagged fixes anchor
//! the solution at their raw values; flagged fixes only feel the
//! smoothness rows. Leading and trailing flagged runs fall outside the
//! anchored range and clamp flat to the nearest solved value, so each
//! window solves independently and stably as it slides.

use crate::core::Fix;
use crate::error::{NavError, NavResult};
use crate::solver::{SmoothingSolver, SparseSystem};
use log::debug;

/// Minimum number of anchored fixes for a meaningful solve
const MIN_ANCHORED: usize = 2;

/// Run the inversion model over the visible window slice
pub fn run(
    fixes: &mut [Fix],
    weight_speed: f64,
    weight_accel: f64,
    solver: &SmoothingSolver,
) -> NavResult<()> {
    let anchored = fixes.iter().filter(|f| !f.flagged).count();
    if anchored < MIN_ANCHORED {
        return Err(NavError::NotEnoughData {
            required: MIN_ANCHORED,
            available: anchored,
        });
    }
    // first and last unflagged fixes bound the solved range
    let lo = fixes.iter().position(|f| !f.flagged).unwrap_or(0);
    let hi = fixes.iter().rposition(|f| !f.flagged).unwrap_or(0);

    // solve both axes before touching any model value, so a failed solve
    // leaves the previous model output intact
    let lon = solve_axis(&fixes[lo..=hi], weight_speed, weight_accel, solver, |f| {
        f.lon
    })?;
    let lat = solve_axis(&fixes[lo..=hi], weight_speed, weight_accel, solver, |f| {
        f.lat
    })?;

    for (k, i) in (lo..=hi).enumerate() {
        fixes[i].lon_model = lon[k];
        fixes[i].lat_model = lat[k];
    }
    for i in 0..lo {
        fixes[i].lon_model = lon[0];
        fixes[i].lat_model = lat[0];
    }
    for i in (hi + 1)..fixes.len() {
        fixes[i].lon_model = lon[lon.len() - 1];
        fixes[i].lat_model = lat[lat.len() - 1];
    }

    Ok(())
}

/// Solve one axis over the anchored range, returning absolute positions
fn solve_axis<F>(
    fixes: &[Fix],
    weight_speed: f64,
    weight_accel: f64,
    solver: &SmoothingSolver,
    value: F,
) -> NavResult<Vec<f64>>
where
    F: Fn(&Fix) -> f64,
{
    let n = fixes.len();
    let mut system = SparseSystem::new(n);

    // the unknowns are offsets from the anchored mean; this keeps the
    // system well scaled regardless of where on the globe the window sits
    let anchored: Vec<usize> = (0..n).filter(|&i| !fixes[i].flagged).collect();
    let mean =
        anchored.iter().map(|&i| value(&fixes[i])).sum::<f64>() / anchored.len() as f64;

    for &i in &anchored {
        system.push_row(&[i], &[1.0], value(&fixes[i]) - mean);
    }
    for i in 0..n - 1 {
        let dt = fixes[i + 1].time.seconds - fixes[i].time.seconds;
        if dt > 0.0 {
            let w = weight_speed / dt;
            system.push_row(&[i, i + 1], &[-w, w], 0.0);
        }
    }
    for i in 1..n - 1 {
        let dt = fixes[i + 1].time.seconds - fixes[i - 1].time.seconds;
        if dt > 0.0 {
            let w = weight_accel / (dt * dt);
            system.push_row(&[i - 1, i, i + 1], &[w, -2.0 * w, w], 0.0);
        }
    }

    let solution = solver.solve(&system)?;
    debug!(
        "inversion solve: {} rows, {} unknowns, {} iterations, error bound {:.3e}",
        system.rows(),
        n,
        solution.iterations,
        solution.error_bound
    );

    Ok(solution.x.iter().map(|offset| mean + offset).collect())
}
