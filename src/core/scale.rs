//! Latitude-dependent scale factors between meters and degrees
//!
//! Converts distances in meters to increments of geodetic longitude and
//! latitude at a given latitude, using the standard meridian and parallel
//! arc-length series expansion on the WGS84 ellipsoid. The factors feed the
//! derived-motion calculator and the dead-reckoning integrator.

use std::f64::consts::PI;

/// Meters-to-degrees scale factors evaluated at one latitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateScale {
    /// Degrees of longitude per meter of easting
    pub m_to_deg_lon: f64,
    /// Degrees of latitude per meter of northing
    pub m_to_deg_lat: f64,
}

impl CoordinateScale {
    /// Evaluate the scale factors at a latitude in decimal degrees.
    ///
    /// The parallel arc length vanishes at the poles; the longitude factor
    /// is clamped there so callers never divide by zero.
    pub fn at_latitude(lat_deg: f64) -> Self {
        let radlat = lat_deg * PI / 180.0;

        // Meridian arc length per degree of latitude (meters)
        let lat_arc = 111_132.92 - 559.82 * (2.0 * radlat).cos()
            + 1.175 * (4.0 * radlat).cos()
            - 0.0023 * (6.0 * radlat).cos();
        // Parallel arc length per degree of longitude (meters)
        let lon_arc = 111_412.84 * radlat.cos() - 93.5 * (3.0 * radlat).cos()
            + 0.118 * (5.0 * radlat).cos();

        Self {
            m_to_deg_lon: 1.0 / lon_arc.abs().max(1.0e-6),
            m_to_deg_lat: 1.0 / lat_arc.abs().max(1.0e-6),
        }
    }
}
