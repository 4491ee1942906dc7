//! In-memory facility directory.
//!
//! Holds one snapshot of facility records with id lookups and an R-tree over
//! their positions, so repeated radius queries don't scan every record.

use std::collections::HashMap;
use std::sync::Arc;

use rstar::{RTree, AABB};

use crate::identifiers::FacilityIdentifier;
use crate::models::{Coordinate, Facility, FacilityKind};
use crate::spatial::index::FacilityNode;
use crate::spatial::queries::bounding_box;
use crate::spatial::ranking::{self, Ranking};

/// Immutable snapshot of facilities with spatial indexing
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone)]
pub struct FacilityDirectory {
    facilities: Vec<Arc<Facility>>,
    facility_map: HashMap<FacilityIdentifier, Arc<Facility>>,
    facility_tree: RTree<FacilityNode>,

    // Records whose coordinates can't be indexed. Kept so rankings report them.
    unlocated: Vec<Arc<Facility>>,
}

impl FacilityDirectory {
    pub fn new() -> Self {
        Self {
            facilities: Vec::new(),
            facility_map: HashMap::new(),
            facility_tree: RTree::new(),
            unlocated: Vec::new(),
        }
    }

    pub fn from_facilities(facilities: Vec<Facility>) -> Self {
        let facilities: Vec<Arc<Facility>> = facilities.into_iter().map(Arc::new).collect();

        let facility_map: HashMap<_, _> = facilities
            .iter()
            .map(|f| (f.id.clone(), f.clone()))
            .collect();

        let mut nodes = Vec::new();
        let mut unlocated = Vec::new();
        for facility in &facilities {
            match facility.location() {
                Ok(location) => nodes.push(FacilityNode::new(location.into(), facility.clone())),
                Err(_) => unlocated.push(facility.clone()),
            }
        }

        let facility_tree = RTree::bulk_load(nodes);

        Self {
            facilities,
            facility_map,
            facility_tree,
            unlocated,
        }
    }

    pub fn get(&self, id: &FacilityIdentifier) -> Option<Arc<Facility>> {
        self.facility_map.get(id).cloned()
    }

    pub fn all(&self) -> &[Arc<Facility>] {
        &self.facilities
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn by_kind(&self, kind: FacilityKind) -> Vec<Arc<Facility>> {
        self.facilities
            .iter()
            .filter(|f| f.kind == kind)
            .cloned()
            .collect()
    }

    pub fn available(&self) -> Vec<Arc<Facility>> {
        self.facilities
            .iter()
            .filter(|f| f.is_available())
            .cloned()
            .collect()
    }

    /// Same result as [`ranking::rank`] over the whole snapshot.
    pub fn rank(&self, origin: Coordinate, radius_km: f64) -> Ranking {
        if radius_km.is_nan() || radius_km < 0.0 || !origin.is_valid() {
            return ranking::rank(origin, std::iter::empty(), radius_km);
        }

        let Some((min, max)) = bounding_box(origin, radius_km) else {
            return ranking::rank(origin, self.facilities.iter().map(|f| f.as_ref()), radius_km);
        };

        let candidates = self
            .facility_tree
            .locate_in_envelope(&AABB::from_corners(min, max))
            .map(|node| node.facility.as_ref());
        let unlocated = self.unlocated.iter().map(|f| f.as_ref());

        let mut ranking = ranking::rank(origin, candidates.chain(unlocated), radius_km);
        // Everything the box ruled out is out of radius too
        ranking.out_of_radius =
            self.facilities.len() - ranking.within.len() - ranking.rejected.len();
        ranking
    }

    pub fn nearby(&self, origin: Coordinate, radius_km: f64) -> Vec<Facility> {
        self.rank(origin, radius_km).within
    }

    pub fn nearest(&self, origin: Coordinate, n: usize) -> Vec<Facility> {
        ranking::nearest(origin, self.facilities.iter().map(|f| f.as_ref()), n)
    }
}

impl Default for FacilityDirectory {
    fn default() -> Self {
        Self::new()
    }
}
