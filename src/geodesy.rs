//! Great-circle distance on a spherical earth.

/// Earth radius used for all distance calculations, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3956.0;

/// Haversine distance in miles between `(lon1, lat1)` and `(lon2, lat2)`.
///
/// Inputs are decimal degrees. Callers must reject NaN or missing
/// coordinates before calling; the result is always `>= 0`.
pub fn distance_miles(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_MILES * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        for (lon, lat) in [(-73.0, 40.0), (0.0, 0.0), (179.9, -89.9), (24.94, 60.19)] {
            assert_eq!(distance_miles(lon, lat, lon, lat), 0.0);
        }
    }

    #[test]
    fn symmetric() {
        let ab = distance_miles(-73.0, 40.0, -74.0, 41.0);
        let ba = distance_miles(-74.0, 41.0, -73.0, 40.0);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn one_degree_latitude() {
        // 1 degree of arc on a 3956 mile sphere
        let d = distance_miles(-73.0, 40.0, -73.0, 41.0);
        assert!((d - 69.04).abs() < 0.01, "got {d}");
    }

    #[test]
    fn antipodal_points() {
        let d = distance_miles(0.0, 0.0, 180.0, 0.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_MILES).abs() < 1e-6);
    }
}
