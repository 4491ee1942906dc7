//! Distance calculation, ranking and spatial indexing.

pub mod index;
pub mod queries;
pub mod ranking;

pub use queries::{distance_km, EARTH_RADIUS_KM};
pub use ranking::{nearby, nearest, rank, Ranking, Rejection};
