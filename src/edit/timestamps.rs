//! Bad-timestamp detection and repair
//!
//! Loads flag fixes whose timestamp does not increase over their
//! predecessor. Repair acts on fixes marked on the time-interval field:
//! either redistribute their times evenly between the surrounding good
//! timestamps, or delete the offending fixes outright.

use crate::core::{FieldKind, Fix};
use crate::edit::interpolate::rebuild_intervals;
use crate::error::{NavError, NavResult};

/// Indices of fixes whose timestamp is not strictly greater than their
/// predecessor's
pub fn find_bad(fixes: &[Fix]) -> Vec<usize> {
    (1..fixes.len())
        .filter(|&i| fixes[i].time.seconds <= fixes[i - 1].time.seconds)
        .collect()
}

/// Spread the timestamps of each marked run evenly between the nearest
/// unmarked fixes on either side. Runs touching a buffer end have no
/// anchor there and are skipped. Returns the number of fixes retimed.
pub fn redistribute_marked(fixes: &mut [Fix]) -> NavResult<usize> {
    let len = fixes.len();
    if len < 3 {
        return Err(NavError::NotEnoughData {
            required: 3,
            available: len,
        });
    }

    let marked: Vec<bool> = fixes
        .iter()
        .map(|f| f.selected.get(FieldKind::TimeInterval))
        .collect();
    let mut changed = 0;
    let mut i = 0;

    while i < len {
        if !marked[i] {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i;
        while end + 1 < len && marked[end + 1] {
            end += 1;
        }

        if start > 0 && end + 1 < len {
            let t0 = fixes[start - 1].time.seconds;
            let t1 = fixes[end + 1].time.seconds;
            if t1 > t0 {
                let steps = (end + 1 - (start - 1)) as f64;
                for (k, j) in (start..=end).enumerate() {
                    let t = t0 + (t1 - t0) * (k + 1) as f64 / steps;
                    fixes[j].time.set_epoch_seconds(t);
                    changed += 1;
                }
            }
        }
        i = end + 1;
    }

    if changed > 0 {
        rebuild_intervals(fixes);
    }
    Ok(changed)
}

/// Among the marked fixes, the indices that break strict time ordering
/// against the running kept sequence. Deleting exactly these leaves the
/// remaining timestamps strictly increasing (given the unmarked fixes
/// were already ordered). Indices are returned in descending order so
/// they can be removed one by one.
pub fn bad_marked_indices(fixes: &[Fix]) -> Vec<usize> {
    let mut doomed = Vec::new();
    let mut last_kept: Option<f64> = None;

    for (i, fix) in fixes.iter().enumerate() {
        let bad = last_kept
            .map(|t| fix.time.seconds <= t)
            .unwrap_or(false);
        if bad && fix.selected.get(FieldKind::TimeInterval) {
            doomed.push(i);
        } else {
            last_kept = Some(fix.time.seconds);
        }
    }

    doomed.reverse();
    doomed
}
