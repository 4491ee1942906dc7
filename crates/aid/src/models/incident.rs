//! Reported incidents and their status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::{FacilityIdentifier, IncidentIdentifier};
use crate::models::coordinate::Coordinate;
use crate::models::types::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentLocation {
    #[serde(default)]
    pub address: String,
    pub coordinates: Coordinate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentIdentifier,
    pub created_at: DateTime<Utc>,
    pub location: IncidentLocation,
    pub severity: Severity,
    pub accident_type: String,
    pub victim_count: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: IncidentStatus,
    #[serde(default)]
    pub notified_facility_ids: Vec<FacilityIdentifier>,
}

impl IncidentStatus {
    /// Statuses only move forward: pending -> acknowledged -> responding -> resolved.
    /// Skipping ahead is allowed, staying put or going back is not.
    pub fn can_transition_to(self, next: IncidentStatus) -> bool {
        next > self
    }

    pub fn is_active(self) -> bool {
        self != IncidentStatus::Resolved
    }
}

impl Incident {
    /// Move to `next`, returning the previous status
    pub fn transition(&mut self, next: IncidentStatus) -> Result<IncidentStatus> {
        if !self.status.can_transition_to(next) {
            return Err(EmergencyError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        let previous = self.status;
        self.status = next;
        Ok(previous)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Fields supplied when an incident is reported
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewIncident {
    pub location: IncidentLocation,
    pub severity: Severity,
    pub accident_type: String,
    pub victim_count: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notified_facility_ids: Vec<FacilityIdentifier>,
}

impl NewIncident {
    pub fn validate(&self) -> Result<()> {
        self.location.coordinates.validate()?;
        if self.victim_count < 1 {
            return Err(EmergencyError::InvalidData(
                "an incident needs at least one victim".into(),
            ));
        }
        if self.accident_type.trim().is_empty() {
            return Err(EmergencyError::InvalidData("accident type is required".into()));
        }
        Ok(())
    }
}

/// Edits to an incident's report details. Status moves only through
/// [`Incident::transition`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<IncidentLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accident_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victim_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notified_facility_ids: Option<Vec<FacilityIdentifier>>,
}

impl IncidentUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(location) = &self.location {
            location.coordinates.validate()?;
        }
        if self.victim_count == Some(0) {
            return Err(EmergencyError::InvalidData(
                "an incident needs at least one victim".into(),
            ));
        }
        if self.accident_type.as_ref().is_some_and(|t| t.trim().is_empty()) {
            return Err(EmergencyError::InvalidData("accident type is required".into()));
        }
        Ok(())
    }
}
