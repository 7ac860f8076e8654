//! Derived motion: speed and course made good
//!
//! The made-good values are what the ship actually achieved between
//! consecutive positions, as opposed to the instantaneous sensor readings.
//! They are recomputed for the whole buffer whenever any longitude or
//! latitude changes.

use crate::core::{CoordinateScale, Fix, MS_TO_KMH};

/// Normalize a course to `[0, 360)` degrees
pub fn normalize_course(deg: f64) -> f64 {
    let wrapped = deg % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Recompute speed-made-good and course-made-good for every fix.
///
/// Fix `i` uses the pair `(i-1, i)`, or `(i, i+1)` at the first fix, with
/// scale factors evaluated at the earlier fix's latitude. Two fixes at the
/// same position yield zero speed and the fix's own heading as course.
pub fn recompute_made_good(fixes: &mut [Fix]) {
    if fixes.len() < 2 {
        for fix in fixes.iter_mut() {
            fix.speed_made_good = 0.0;
            fix.course_made_good = fix.heading;
        }
        return;
    }

    for i in 0..fixes.len() {
        let (a, b) = if i == 0 { (0, 1) } else { (i - 1, i) };
        let scale = CoordinateScale::at_latitude(fixes[a].lat);
        let dt = fixes[b].time.seconds - fixes[a].time.seconds;
        let dx = (fixes[b].lon - fixes[a].lon) / scale.m_to_deg_lon;
        let dy = (fixes[b].lat - fixes[a].lat) / scale.m_to_deg_lat;
        let dist = dx.hypot(dy);

        fixes[i].speed_made_good = if dt > 0.0 { MS_TO_KMH * dist / dt } else { 0.0 };
        fixes[i].course_made_good = if dist > 0.0 {
            normalize_course(dx.atan2(dy).to_degrees())
        } else {
            fixes[i].heading
        };
    }
}
