//! Spatial query utilities for distance calculations.
//!
//! Uses Haversine formula for distances on Earth's surface.

use std::f64::consts::{FRAC_PI_2, PI};

use geo::{Distance, HaversineMeasure, Point};

use crate::models::Coordinate;

/// Mean Earth radius used by every distance in this crate
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ~1cm of slack so points sitting exactly on the radius survive the box test
const BOX_PADDING_DEGREES: f64 = 1e-7;

/// Great-circle distance between two coordinates in kilometres.
///
/// Inputs are not range checked; NaN in, NaN out.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let measure = HaversineMeasure::new(EARTH_RADIUS_KM * 1000.0);
    measure.distance(Point::from(a), Point::from(b)) / 1000.0
}

/// Lon/lat box (`[min_lon, min_lat]`, `[max_lon, max_lat]`) containing every point
/// within `radius_km` of `origin`.
///
/// Returns `None` when the circle covers a pole or crosses the antimeridian, in which
/// case callers have to fall back to checking everything.
pub fn bounding_box(origin: Coordinate, radius_km: f64) -> Option<([f64; 2], [f64; 2])> {
    let angular = radius_km / EARTH_RADIUS_KM;
    let lat = origin.latitude.to_radians();
    let lon = origin.longitude.to_radians();

    let min_lat = lat - angular;
    let max_lat = lat + angular;
    if !(min_lat > -FRAC_PI_2 && max_lat < FRAC_PI_2) {
        return None;
    }

    let delta_lon = (angular.sin() / lat.cos()).asin();
    let min_lon = lon - delta_lon;
    let max_lon = lon + delta_lon;
    if !(min_lon >= -PI && max_lon <= PI) {
        return None;
    }

    Some((
        [
            min_lon.to_degrees() - BOX_PADDING_DEGREES,
            min_lat.to_degrees() - BOX_PADDING_DEGREES,
        ],
        [
            max_lon.to_degrees() + BOX_PADDING_DEGREES,
            max_lat.to_degrees() + BOX_PADDING_DEGREES,
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn c(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    #[test]
    fn test_distance_known_pair() {
        // Distance from NYC to LA is approximately 3,936 km
        let nyc = c(40.7128, -74.0060);
        let la = c(34.0522, -118.2437);

        let dist = distance_km(nyc, la);
        assert!((dist - 3_936.0).abs() < 50.0);
    }

    #[test]
    fn test_identical_points() {
        for p in [c(40.0, -75.0), c(-90.0, 0.0), c(0.0, 180.0), c(51.5, -0.12)] {
            assert_abs_diff_eq!(distance_km(p, p), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_uses_mean_earth_radius() {
        // Haversine written out with R = 6371 km
        fn reference(a: Coordinate, b: Coordinate) -> f64 {
            let d_lat = (b.latitude - a.latitude).to_radians();
            let d_lon = (b.longitude - a.longitude).to_radians();
            let h = (d_lat / 2.0).sin().powi(2)
                + a.latitude.to_radians().cos()
                    * b.latitude.to_radians().cos()
                    * (d_lon / 2.0).sin().powi(2);
            2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
        }

        let pairs = [
            (c(40.0, -75.0), c(40.05, -75.02)),
            (c(40.7128, -74.0060), c(34.0522, -118.2437)),
            (c(-33.86, 151.2), c(35.68, 139.69)),
            (c(0.0, 179.9), c(0.0, -179.9)),
            (c(89.0, 0.0), c(-89.0, 180.0)),
        ];
        for (a, b) in pairs {
            assert_relative_eq!(distance_km(a, b), reference(a, b), max_relative = 1e-9);
        }
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (c(40.0, -75.0), c(41.0, -74.0)),
            (c(-33.86, 151.2), c(35.68, 139.69)),
            (c(0.0, 179.9), c(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_relative_eq!(distance_km(a, b), distance_km(b, a), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_antipodal() {
        let dist = distance_km(c(0.0, 0.0), c(0.0, 180.0));
        assert_relative_eq!(dist, PI * EARTH_RADIUS_KM, max_relative = 1e-9);
        assert_abs_diff_eq!(dist, 20_015.0, epsilon = 1.0);
    }

    #[test]
    fn test_monotonic_in_separation() {
        let origin = c(10.0, 20.0);
        let mut last = 0.0;
        for step in 1..=170 {
            let d = distance_km(origin, c(10.0 - 0.5 * step as f64, 20.0));
            assert!(d > last, "distance should grow with separation (step {step})");
            last = d;
        }
    }

    #[test]
    fn test_nan_propagates() {
        let bad = Coordinate { latitude: f64::NAN, longitude: 0.0 };
        assert!(distance_km(bad, c(0.0, 0.0)).is_nan());
    }

    #[test]
    fn test_bounding_box_contains_circle() {
        let origin = c(40.0, -75.0);
        let (min, max) = bounding_box(origin, 10.0).unwrap();

        // Due north and due east at exactly 10 km sit inside the box
        let north = c(40.0 + (10.0 / EARTH_RADIUS_KM).to_degrees(), -75.0);
        assert_relative_eq!(distance_km(origin, north), 10.0, max_relative = 1e-9);
        assert!(north.latitude <= max[1] && north.latitude >= min[1]);
        assert!(min[0] < -75.0 && max[0] > -75.0);
    }

    #[test]
    fn test_bounding_box_fallbacks() {
        // Covers the north pole
        assert!(bounding_box(c(89.9, 0.0), 50.0).is_none());
        // Crosses the antimeridian
        assert!(bounding_box(c(0.0, 179.99), 10.0).is_none());
        // Unbounded
        assert!(bounding_box(c(0.0, 0.0), f64::INFINITY).is_none());
    }
}
