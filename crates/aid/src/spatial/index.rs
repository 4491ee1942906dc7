//! R-tree nodes for spatial indexing.
//!
//! Wraps facilities with their lon/lat position for box queries.
//!
//! ## Two-Stage Filtering
//!
//! Radius queries run in two stages:
//! 1. **R-tree filter**: a lon/lat bounding box that contains the search circle
//! 2. **Haversine filter**: exact great-circle distance on the candidates

use std::sync::Arc;

use geo::Point;
use rstar::{PointDistance, RTreeObject, AABB};

use crate::models::Facility;

#[derive(Clone, Debug)]
pub struct FacilityNode {
    pub facility: Arc<Facility>,
    point: [f64; 2],
}

impl FacilityNode {
    pub fn new(location: Point, facility: Arc<Facility>) -> Self {
        Self {
            facility,
            point: [location.x(), location.y()],
        }
    }
}

impl RTreeObject for FacilityNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for FacilityNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}
