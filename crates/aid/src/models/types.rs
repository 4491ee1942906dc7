//! Core enums and errors shared by the emergency models.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::identifiers::*;
use crate::models::coordinate::CoordinateError;

// ============================================================================
// Enums
// ============================================================================

/// What kind of emergency service a facility provides
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FacilityKind {
    Hospital,
    Police,
    Fire,
    Other,
}

impl FacilityKind {
    /// Prefix used in generated facility ids (e.g. `HOSPITAL-004`)
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Hospital => "HOSPITAL",
            Self::Police => "POLICE",
            Self::Fire => "FIRE",
            Self::Other => "OTHER",
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Availability {
    #[default]
    Available,
    Busy,
    Unavailable,
}

/// Incident severity, most severe first
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Critical,
    Severe,
    Moderate,
}

/// Incident status. Declaration order is the lifecycle order.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IncidentStatus {
    #[default]
    Pending,
    Acknowledged,
    Responding,
    Resolved,
}

/// Status a facility reports for its response to an incident
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseStatus {
    #[default]
    Acknowledged,
    Responding,
    Resolved,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EmergencyError {
    #[error("Facility not found: {0}")]
    FacilityNotFound(FacilityIdentifier),

    #[error("Incident not found: {0}")]
    IncidentNotFound(IncidentIdentifier),

    #[error("Alert response not found: {0}")]
    ResponseNotFound(ResponseIdentifier),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: IncidentStatus,
        to: IncidentStatus,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Record store error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EmergencyError>;
