//! Geographic coordinates in decimal degrees.

use geo::Point;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair.
///
/// Values decoded from store records are taken as-is; call [`Coordinate::validate`]
/// before trusting them. [`Coordinate::new`] only hands out valid coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("coordinates are missing")]
    Missing,

    #[error("coordinate is not a finite number ({latitude}, {longitude})")]
    NotFinite { latitude: f64, longitude: f64 },

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        Self { latitude, longitude }.validate()
    }

    pub fn validate(self) -> Result<Self, CoordinateError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(CoordinateError::NotFinite {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(self.longitude));
        }
        Ok(self)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl From<Coordinate> for Point {
    fn from(c: Coordinate) -> Self {
        Point::new(c.longitude, c.latitude)
    }
}

impl From<Point> for Coordinate {
    fn from(p: Point) -> Self {
        Self {
            latitude: p.y(),
            longitude: p.x(),
        }
    }
}
