//! # rapid-aid
//!
//! Emergency alert core: find the nearest responders and keep track of incidents.
//!
//! ## Features
//!
//! - **Great-circle distance**: Haversine over a spherical Earth
//! - **Spatial queries**: R-tree backed facility ranking by distance
//! - **Incident lifecycle**: statuses only move forward
//! - **Dashboard aggregates**: counts by status and severity, history filters
//! - **Pluggable storage**: services run over any [`store::RecordStore`]
//!
//! ## Example
//!
//! ```
//! use rapid_aid::prelude::*;
//!
//! let facilities: Vec<Facility> = serde_json::from_value(serde_json::json!([
//!     {
//!         "id": "HOSPITAL-001",
//!         "name": "City General",
//!         "type": "hospital",
//!         "coordinates": { "latitude": 40.7128, "longitude": -74.0060 },
//!         "address": "1 Center St",
//!         "contact_number": "555-0100",
//!         "availability": "available"
//!     },
//!     {
//!         "id": "FIRE-002",
//!         "name": "Engine 9",
//!         "type": "fire",
//!         "coordinates": { "latitude": 40.9, "longitude": -74.0 },
//!         "address": "9 Hill Rd",
//!         "contact_number": "555-0109",
//!         "availability": "busy"
//!     }
//! ]))
//! .unwrap();
//!
//! let directory = FacilityDirectory::from_facilities(facilities);
//! let origin = Coordinate::new(40.7306, -73.9866).unwrap(); // Union Square
//! let nearby = directory.nearby(origin, 5.0);
//!
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(nearby[0].name, "City General");
//! assert!(nearby[0].distance.unwrap() < 5.0);
//! ```

pub mod aggregate;
pub mod directory;
pub mod identifiers;
pub mod models;
pub mod services;
pub mod spatial;
pub mod store;

// Re-exports for convenience
pub mod prelude {
    pub use crate::aggregate::{count_by, GroupKey, IncidentFilter};
    pub use crate::directory::FacilityDirectory;
    pub use crate::identifiers::*;
    pub use crate::models::*;
    pub use crate::services::{
        AlertDispatcher, AlertReport, DispatchConfig, FacilityService, IncidentService,
        ResponseService,
    };
    pub use crate::spatial::{distance_km, nearby, rank, Ranking};
    pub use crate::store::{MemoryRecordStore, RecordStore};
}

pub use prelude::*;
