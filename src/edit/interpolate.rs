//! Gap and repeated-value interpolation over selected fixes
//!
//! Gap interpolation replaces selected values with the time-weighted line
//! between their nearest unselected neighbors. Repeated-value
//! interpolation corrects "sticky" sensor output that repeats a stale
//! sample across several records. The time field interpolates by index
//! fraction, since index is its independent variable.

use crate::core::{FieldKind, Fix};

/// Rebuild the expected time intervals after any timestamp edit.
/// The first fix keeps its interval; it refers to a predecessor that may
/// already have been dumped.
pub fn rebuild_intervals(fixes: &mut [Fix]) {
    for i in 1..fixes.len() {
        fixes[i].interval = fixes[i].time.seconds - fixes[i - 1].time.seconds;
    }
}

fn fraction(fixes: &[Fix], field: FieldKind, left: usize, i: usize, right: usize) -> f64 {
    if field == FieldKind::TimeInterval {
        return (i - left) as f64 / (right - left) as f64;
    }
    let span = fixes[right].time.seconds - fixes[left].time.seconds;
    if span > 0.0 {
        (fixes[i].time.seconds - fixes[left].time.seconds) / span
    } else {
        // degenerate time span, fall back to index spacing
        (i - left) as f64 / (right - left) as f64
    }
}

/// Interpolate each selected fix between its nearest unselected neighbors.
///
/// With neighbors on both sides the value is the linear interpolation by
/// elapsed-time fraction (index fraction for the time field); with a
/// neighbor on one side only, the value flat-extrapolates from it.
/// Returns the number of fixes changed.
pub fn interpolate_gaps(fixes: &mut [Fix], field: FieldKind) -> usize {
    let len = fixes.len();
    let selected: Vec<bool> = fixes.iter().map(|f| f.selected.get(field)).collect();
    let mut changed = 0;

    for i in 0..len {
        if !selected[i] {
            continue;
        }
        let left = (0..i).rev().find(|&j| !selected[j]);
        let right = ((i + 1)..len).find(|&k| !selected[k]);

        let value = match (left, right) {
            (Some(l), Some(r)) => {
                let f = fraction(fixes, field, l, i, r);
                let vl = fixes[l].value(field);
                let vr = fixes[r].value(field);
                vl + (vr - vl) * f
            }
            (Some(l), None) => fixes[l].value(field),
            (None, Some(r)) => fixes[r].value(field),
            (None, None) => continue, // everything selected, nothing to anchor on
        };

        fixes[i].set_value(field, value);
        changed += 1;
    }

    if changed > 0 && field == FieldKind::TimeInterval {
        rebuild_intervals(fixes);
    }
    changed
}

/// Interpolate each maximal run of consecutive equal raw values that
/// contains a selected fix, strictly between the last distinct value
/// before the run and the next distinct value after it. Runs touching a
/// buffer end have no anchor on that side and are left alone.
/// Returns the number of fixes changed.
pub fn interpolate_repeats(fixes: &mut [Fix], field: FieldKind) -> usize {
    let len = fixes.len();
    let mut changed = 0;
    let mut start = 0;

    while start < len {
        let value = fixes[start].value(field);
        let mut end = start;
        while end + 1 < len && fixes[end + 1].value(field) == value {
            end += 1;
        }

        let run_selected = (start..=end).any(|i| fixes[i].selected.get(field));
        if end > start && run_selected && start > 0 && end + 1 < len {
            let anchor_left = start - 1;
            let anchor_right = end + 1;
            let vl = fixes[anchor_left].value(field);
            let vr = fixes[anchor_right].value(field);
            for i in start..=end {
                let f = fraction(fixes, field, anchor_left, i, anchor_right);
                fixes[i].set_value(field, vl + (vr - vl) * f);
                changed += 1;
            }
        }
        start = end + 1;
    }

    if changed > 0 && field == FieldKind::TimeInterval {
        rebuild_intervals(fixes);
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(values: &[(f64, f64)]) -> Vec<Fix> {
        // (time, latitude) pairs; other fields constant
        values
            .iter()
            .enumerate()
            .map(|(i, &(t, lat))| {
                let mut fix = Fix::new(i, t, 10.0, lat, 5.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0);
                fix.index = i;
                fix
            })
            .collect()
    }

    #[test]
    fn interior_selection_lands_on_time_weighted_line() {
        let mut fixes = window(&[(0.0, 50.0), (1.0, 55.0), (3.0, 50.3)]);
        fixes[1].selected.set(FieldKind::Latitude, true);
        let changed = interpolate_gaps(&mut fixes, FieldKind::Latitude);
        assert_eq!(changed, 1);
        // one third of the way from 50.0 to 50.3
        assert!((fixes[1].lat - 50.1).abs() < 1.0e-9);
    }

    #[test]
    fn equal_spacing_gives_exact_midpoint() {
        let mut fixes = window(&[(0.0, 50.0), (1.0, 99.0), (2.0, 50.2)]);
        fixes[1].selected.set(FieldKind::Latitude, true);
        interpolate_gaps(&mut fixes, FieldKind::Latitude);
        assert!((fixes[1].lat - 50.1).abs() < 1.0e-9);
    }

    #[test]
    fn run_of_selections_interpolates_as_a_block() {
        let mut fixes = window(&[
            (0.0, 50.0),
            (1.0, 80.0),
            (2.0, 80.0),
            (3.0, 80.0),
            (4.0, 50.4),
        ]);
        for i in 1..4 {
            fixes[i].selected.set(FieldKind::Latitude, true);
        }
        interpolate_gaps(&mut fixes, FieldKind::Latitude);
        assert!((fixes[1].lat - 50.1).abs() < 1.0e-9);
        assert!((fixes[2].lat - 50.2).abs() < 1.0e-9);
        assert!((fixes[3].lat - 50.3).abs() < 1.0e-9);
    }

    #[test]
    fn one_sided_selection_flattens_from_the_lone_neighbor() {
        let mut fixes = window(&[(0.0, 50.0), (1.0, 60.0), (2.0, 70.0)]);
        fixes[1].selected.set(FieldKind::Latitude, true);
        fixes[2].selected.set(FieldKind::Latitude, true);
        interpolate_gaps(&mut fixes, FieldKind::Latitude);
        assert_eq!(fixes[1].lat, 50.0);
        assert_eq!(fixes[2].lat, 50.0);
    }

    #[test]
    fn time_field_interpolates_by_index_fraction() {
        let mut fixes = window(&[(0.0, 50.0), (7.0, 50.0), (2.0, 50.0), (3.0, 50.0)]);
        fixes[1].selected.set(FieldKind::TimeInterval, true);
        fixes[2].selected.set(FieldKind::TimeInterval, true);
        interpolate_gaps(&mut fixes, FieldKind::TimeInterval);
        assert!((fixes[1].time.seconds - 1.0).abs() < 1.0e-9);
        assert!((fixes[2].time.seconds - 2.0).abs() < 1.0e-9);
        // intervals rebuilt alongside the timestamps
        assert!((fixes[2].interval - 1.0).abs() < 1.0e-9);
    }

    #[test]
    fn sticky_sensor_run_is_straightened() {
        let mut fixes = window(&[
            (0.0, 50.0),
            (1.0, 50.1),
            (2.0, 50.1),
            (3.0, 50.1),
            (4.0, 50.4),
        ]);
        fixes[2].selected.set(FieldKind::Latitude, true);
        let changed = interpolate_repeats(&mut fixes, FieldKind::Latitude);
        assert_eq!(changed, 3);
        // run 1..=3 interpolated between fix 0 (50.0) and fix 4 (50.4)
        assert!((fixes[1].lat - 50.1).abs() < 1.0e-9);
        assert!((fixes[2].lat - 50.2).abs() < 1.0e-9);
        assert!((fixes[3].lat - 50.3).abs() < 1.0e-9);
    }

    #[test]
    fn repeated_run_without_selection_is_untouched() {
        let mut fixes = window(&[(0.0, 50.0), (1.0, 50.1), (2.0, 50.1), (3.0, 50.4)]);
        let changed = interpolate_repeats(&mut fixes, FieldKind::Latitude);
        assert_eq!(changed, 0);
        assert_eq!(fixes[2].lat, 50.1);
    }

    #[test]
    fn repeated_run_at_buffer_edge_is_left_alone() {
        let mut fixes = window(&[(0.0, 50.1), (1.0, 50.1), (2.0, 50.4)]);
        fixes[0].selected.set(FieldKind::Latitude, true);
        let changed = interpolate_repeats(&mut fixes, FieldKind::Latitude);
        assert_eq!(changed, 0);
    }
}
