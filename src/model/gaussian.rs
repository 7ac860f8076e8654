//! Gaussian-weighted mean position smoothing
//!
//! Two passes over the buffer: the first takes a Gaussian-weighted mean
//! of the unflagged neighbors inside the time window, accepting it only
//! when anchored strictly on both sides; the second fills the fixes the
//! first pass could not resolve by interpolating between the nearest
//! resolved or unflagged values, flat-extrapolating at the buffer ends.

use crate::core::Fix;
use crate::error::{NavError, NavResult};

/// Run the Gaussian mean model over the whole buffer
pub fn run(fixes: &mut [Fix], window_secs: f64) -> NavResult<()> {
    if fixes.is_empty() {
        return Err(NavError::NotEnoughData {
            required: 1,
            available: 0,
        });
    }
    if !(window_secs > 0.0) {
        return Err(NavError::NotEnoughData {
            required: 1,
            available: 0,
        });
    }

    let len = fixes.len();
    let mut resolved = vec![false; len];

    // pass 1: anchored weighted means
    for i in 0..len {
        let ti = fixes[i].time.seconds;
        let mut weight_sum = 0.0;
        let mut lon_sum = 0.0;
        let mut lat_sum = 0.0;
        let mut before = false;
        let mut after = false;

        for fix in fixes.iter() {
            if fix.flagged {
                continue;
            }
            let dt = fix.time.seconds - ti;
            if dt.abs() > window_secs {
                continue;
            }
            let weight = (-4.0 * dt * dt / (window_secs * window_secs)).exp();
            weight_sum += weight;
            lon_sum += weight * fix.lon;
            lat_sum += weight * fix.lat;
            if dt < 0.0 {
                before = true;
            } else if dt > 0.0 {
                after = true;
            }
        }

        if before && after && weight_sum > 0.0 {
            fixes[i].lon_model = lon_sum / weight_sum;
            fixes[i].lat_model = lat_sum / weight_sum;
            resolved[i] = true;
        }
    }

    // pass 2: interpolate the unresolved between the nearest anchors.
    // A fix's own unflagged raw value counts as an anchor, so an
    // unresolved unflagged fix keeps its raw position.
    for i in 0..len {
        if resolved[i] {
            continue;
        }
        let left = find_anchor(fixes, &resolved, (0..=i).rev());
        let right = find_anchor(fixes, &resolved, i..len);

        let (lon, lat) = match (left, right) {
            (Some((jl, lon_l, lat_l)), Some((jr, lon_r, lat_r))) => {
                if jl == jr {
                    (lon_l, lat_l)
                } else {
                    let ti = fixes[i].time.seconds;
                    let span = fixes[jr].time.seconds - fixes[jl].time.seconds;
                    let f = if span > 0.0 {
                        ((ti - fixes[jl].time.seconds) / span).clamp(0.0, 1.0)
                    } else {
                        0.5
                    };
                    (lon_l + (lon_r - lon_l) * f, lat_l + (lat_r - lat_l) * f)
                }
            }
            (Some((_, lon, lat)), None) => (lon, lat),
            (None, Some((_, lon, lat))) => (lon, lat),
            // every fix flagged and none resolved; keep raw positions
            (None, None) => (fixes[i].lon, fixes[i].lat),
        };
        fixes[i].lon_model = lon;
        fixes[i].lat_model = lat;
    }

    Ok(())
}

/// Nearest anchor among the candidate indices: a resolved fix contributes
/// its model position, an unflagged one its raw position
fn find_anchor<I>(fixes: &[Fix], resolved: &[bool], candidates: I) -> Option<(usize, f64, f64)>
where
    I: IntoIterator<Item = usize>,
{
    for j in candidates {
        if resolved[j] {
            return Some((j, fixes[j].lon_model, fixes[j].lat_model));
        }
        if !fixes[j].flagged {
            return Some((j, fixes[j].lon, fixes[j].lat));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(n: usize, dt: f64) -> Vec<Fix> {
        (0..n)
            .map(|i| {
                let mut fix = Fix::new(
                    i,
                    i as f64 * dt,
                    10.0 + i as f64 * 0.001,
                    50.0 + i as f64 * 0.001,
                    10.0,
                    45.0,
                    2.0,
                    0.0,
                    0.0,
                    0.0,
                    dt,
                );
                fix.index = i;
                fix
            })
            .collect()
    }

    #[test]
    fn model_position_defined_for_every_fix() {
        let mut fixes = track(20, 1.0);
        run(&mut fixes, 5.0).unwrap();
        for fix in &fixes {
            assert!(fix.lon_model.is_finite());
            assert!(fix.lat_model.is_finite());
        }
    }

    #[test]
    fn linear_track_is_reproduced_in_the_interior() {
        let mut fixes = track(30, 1.0);
        run(&mut fixes, 4.0).unwrap();
        // symmetric weights around a linear track cancel
        for fix in &fixes[5..25] {
            assert!((fix.lon_model - fix.lon).abs() < 1.0e-9);
            assert!((fix.lat_model - fix.lat).abs() < 1.0e-9);
        }
    }

    #[test]
    fn spike_is_pulled_toward_neighbors() {
        let mut fixes = track(21, 1.0);
        fixes[10].lat += 0.1; // 10x the step size
        run(&mut fixes, 6.0).unwrap();
        assert!(fixes[10].lat_model < fixes[10].lat - 0.01);
    }

    #[test]
    fn flagged_fixes_are_excluded_from_sums() {
        let mut with_spike = track(21, 1.0);
        with_spike[10].lat += 0.5;
        with_spike[10].flagged = true;
        run(&mut with_spike, 6.0).unwrap();

        // neighbors never see the flagged spike
        let mut clean = track(21, 1.0);
        clean[10].flagged = true;
        run(&mut clean, 6.0).unwrap();
        assert!((with_spike[9].lat_model - clean[9].lat_model).abs() < 1.0e-12);
        // the flagged fix itself still gets a model position
        assert!((with_spike[10].lat_model - clean[10].lat_model).abs() < 1.0e-12);
    }

    #[test]
    fn window_below_sampling_interval_leaves_track_unchanged() {
        let mut fixes = track(10, 1.0);
        run(&mut fixes, 0.5).unwrap();
        // nothing resolves, and each unflagged fix anchors on itself
        for fix in &fixes {
            assert!((fix.lon_model - fix.lon).abs() < 1.0e-12);
            assert!((fix.lat_model - fix.lat).abs() < 1.0e-12);
        }
    }

    #[test]
    fn rerun_with_unchanged_inputs_is_identical() {
        let mut fixes = track(15, 1.0);
        fixes[7].lat += 0.01;
        run(&mut fixes, 5.0).unwrap();
        let first: Vec<(f64, f64)> = fixes.iter().map(|f| (f.lon_model, f.lat_model)).collect();
        run(&mut fixes, 5.0).unwrap();
        let second: Vec<(f64, f64)> = fixes.iter().map(|f| (f.lon_model, f.lat_model)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_buffer_is_not_enough_data() {
        let mut fixes: Vec<Fix> = Vec::new();
        assert!(matches!(
            run(&mut fixes, 5.0),
            Err(NavError::NotEnoughData { .. })
        ));
    }
}
