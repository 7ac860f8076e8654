//! Dead-reckoning position model
//!
//! Integrates reported speed and heading over elapsed time from the last
//! known position, with an optional constant drift in degrees/hour. A gap
//! of `DR_GAP_RESET_SECS` or more breaks continuity and the model resets
//! to the raw position.

use crate::core::{CoordinateScale, Fix, DR_GAP_RESET_SECS, MS_TO_KMH, SECS_PER_HOUR};
use crate::error::{NavError, NavResult};

/// Run dead reckoning over the whole buffer.
/// `drift_lon`/`drift_lat` are in degrees per hour.
pub fn run(fixes: &mut [Fix], drift_lon: f64, drift_lat: f64) -> NavResult<()> {
    if fixes.is_empty() {
        return Err(NavError::NotEnoughData {
            required: 1,
            available: 0,
        });
    }

    fixes[0].lon_model = fixes[0].lon;
    fixes[0].lat_model = fixes[0].lat;

    for i in 1..fixes.len() {
        let dt = fixes[i].time.seconds - fixes[i - 1].time.seconds;
        if dt >= DR_GAP_RESET_SECS {
            fixes[i].lon_model = fixes[i].lon;
            fixes[i].lat_model = fixes[i].lat;
            continue;
        }

        // heading in compass degrees: east is sin, north is cos
        let heading_rad = fixes[i].heading.to_radians();
        let dt_forward = dt.max(0.0);
        let meters = fixes[i].speed * dt_forward / MS_TO_KMH;
        let dx = heading_rad.sin() * meters;
        let dy = heading_rad.cos() * meters;

        let scale = CoordinateScale::at_latitude(fixes[i - 1].lat);
        fixes[i].lon_model = fixes[i - 1].lon_model
            + dx * scale.m_to_deg_lon
            + drift_lon * dt_forward / SECS_PER_HOUR;
        fixes[i].lat_model = fixes[i - 1].lat_model
            + dy * scale.m_to_deg_lat
            + drift_lat * dt_forward / SECS_PER_HOUR;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(t: f64, lon: f64, lat: f64, speed: f64, heading: f64) -> Fix {
        Fix::new(0, t, lon, lat, speed, heading, 2.0, 0.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn zero_speed_zero_drift_pins_every_fix_to_the_start() {
        let mut fixes: Vec<Fix> = (0..50)
            .map(|i| fix_at(i as f64, 10.0 + i as f64 * 0.01, 50.0, 0.0, 90.0))
            .collect();
        run(&mut fixes, 0.0, 0.0).unwrap();
        for fix in &fixes {
            assert!((fix.lon_model - 10.0).abs() < 1.0e-12);
            assert!((fix.lat_model - 50.0).abs() < 1.0e-12);
        }
    }

    #[test]
    fn northbound_track_integrates_along_latitude() {
        // 3.6 km/h due north is one meter per second
        let mut fixes: Vec<Fix> = (0..60)
            .map(|i| fix_at(i as f64, 10.0, 50.0, 3.6, 0.0))
            .collect();
        run(&mut fixes, 0.0, 0.0).unwrap();
        let scale = CoordinateScale::at_latitude(50.0);
        let expected = 50.0 + 59.0 * scale.m_to_deg_lat;
        assert!((fixes[59].lat_model - expected).abs() < 1.0e-9);
        assert!((fixes[59].lon_model - 10.0).abs() < 1.0e-12);
    }

    #[test]
    fn long_gap_resets_to_the_raw_position() {
        let mut fixes = vec![
            fix_at(0.0, 10.0, 50.0, 10.0, 90.0),
            fix_at(1.0, 10.1, 50.0, 10.0, 90.0),
            fix_at(400.0, 11.0, 51.0, 10.0, 90.0),
            fix_at(401.0, 11.1, 51.0, 10.0, 90.0),
        ];
        run(&mut fixes, 0.0, 0.0).unwrap();
        assert_eq!(fixes[2].lon_model, 11.0);
        assert_eq!(fixes[2].lat_model, 51.0);
        // integration resumes from the reset point
        assert!(fixes[3].lon_model > 11.0);
    }

    #[test]
    fn drift_accumulates_pro_rata() {
        let mut fixes: Vec<Fix> = (0..3601)
            .map(|i| fix_at(i as f64, 10.0, 50.0, 0.0, 0.0))
            .collect();
        run(&mut fixes, 0.01, -0.02).unwrap();
        // one hour of drift at 0.01 deg/hr east, 0.02 deg/hr south
        assert!((fixes[3600].lon_model - 10.01).abs() < 1.0e-9);
        assert!((fixes[3600].lat_model - 49.98).abs() < 1.0e-9);
    }

    #[test]
    fn first_fix_is_always_the_raw_position() {
        let mut fixes = vec![fix_at(0.0, 12.0, 44.0, 10.0, 90.0)];
        run(&mut fixes, 1.0, 1.0).unwrap();
        assert_eq!(fixes[0].lon_model, 12.0);
        assert_eq!(fixes[0].lat_model, 44.0);
    }
}
