//! Emergency facility records.

use serde::{Deserialize, Deserializer, Serialize};

use crate::identifiers::FacilityIdentifier;
use crate::models::coordinate::{Coordinate, CoordinateError};
use crate::models::types::{Availability, FacilityKind};

/// A hospital, police station, fire department or other responder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityIdentifier,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FacilityKind,
    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub coordinates: Option<Coordinate>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default = "unknown_response_time")]
    pub response_time: String,

    /// Kilometres from the last ranking origin. Set by ranking only, never stored.
    #[serde(skip)]
    pub distance: Option<f64>,
}

impl Facility {
    /// Validated coordinates, or why they can't be used
    pub fn location(&self) -> Result<Coordinate, CoordinateError> {
        self.coordinates.ok_or(CoordinateError::Missing)?.validate()
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}

/// Fields supplied when registering a facility
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewFacility {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FacilityKind,
    pub coordinates: Coordinate,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub response_time: Option<String>,
}

pub(crate) fn unknown_response_time() -> String {
    "Unknown".to_string()
}

// Records written by other clients sometimes carry coordinates that don't decode
// (strings, partial objects). Those become `None` so ranking can report them
// instead of failing the whole fetch.
fn lenient_coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match serde_json::from_value::<Coordinate>(v) {
        Ok(c) => Some(c),
        Err(err) => {
            tracing::debug!(%err, "undecodable facility coordinates");
            None
        }
    }))
}
