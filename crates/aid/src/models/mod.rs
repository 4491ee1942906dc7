//! Emergency data models and types.

pub mod coordinate;
pub mod facility;
pub mod incident;
pub mod response;
pub mod types;

// Re-exports for convenience
pub use coordinate::{Coordinate, CoordinateError};
pub use facility::{Facility, NewFacility};
pub use incident::{Incident, IncidentLocation, IncidentUpdate, NewIncident};
pub use response::{AlertResponse, NewAlertResponse};
pub use types::{
    Availability, EmergencyError, FacilityKind, IncidentStatus, ResponseStatus, Result, Severity,
};
