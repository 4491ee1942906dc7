//! Facility responses to raised alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::{FacilityIdentifier, IncidentIdentifier, ResponseIdentifier};
use crate::models::types::ResponseStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertResponse {
    pub id: ResponseIdentifier,
    pub facility_id: FacilityIdentifier,
    pub incident_id: IncidentIdentifier,
    pub acknowledged_at: DateTime<Utc>,
    pub responder_id: String,
    /// Free-form ETA as reported by the responder (e.g. "12 min")
    #[serde(default)]
    pub estimated_arrival: String,
    #[serde(default)]
    pub status: ResponseStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAlertResponse {
    pub facility_id: FacilityIdentifier,
    pub incident_id: IncidentIdentifier,
    pub responder_id: String,
    #[serde(default)]
    pub estimated_arrival: String,
    #[serde(default)]
    pub status: Option<ResponseStatus>,
    #[serde(default)]
    pub notes: String,
}
