//! Typed access to emergency records through an injected [`RecordStore`].

pub mod dispatch;
pub mod facilities;
pub mod incidents;
pub mod responses;

pub use dispatch::{AlertDispatcher, AlertReport, Dispatch, DispatchConfig};
pub use facilities::FacilityService;
pub use incidents::IncidentService;
pub use responses::ResponseService;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::models::types::{EmergencyError, Result};
use crate::store::Record;

pub const FACILITIES_TABLE: &str = "facilities";
pub const INCIDENTS_TABLE: &str = "incidents";
pub const RESPONSES_TABLE: &str = "alert_responses";

pub(crate) fn decode<T: DeserializeOwned>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

pub(crate) fn decode_all<T: DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>> {
    records.into_iter().map(decode).collect()
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(EmergencyError::InvalidData(format!(
            "expected a record object, got {other}"
        ))),
    }
}

/// Single-field patch
pub(crate) fn patch(field: &str, value: impl Serialize) -> Result<Record> {
    let mut record = Record::new();
    record.insert(field.to_string(), serde_json::to_value(value)?);
    Ok(record)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::identifiers::FacilityIdentifier;
    use crate::models::*;
    use crate::spatial::EARTH_RADIUS_KM;
    use crate::store::MemoryRecordStore;

    pub fn origin() -> Coordinate {
        Coordinate::new(40.0, -75.0).unwrap()
    }

    /// A point `km` due north of the test origin
    pub fn north(km: f64) -> Coordinate {
        let o = origin();
        Coordinate::new(o.latitude + (km / EARTH_RADIUS_KM).to_degrees(), o.longitude).unwrap()
    }

    pub fn facility(id: &str, kind: FacilityKind, km: f64, availability: Availability) -> Facility {
        Facility {
            id: FacilityIdentifier::new(id),
            name: format!("Facility {id}"),
            kind,
            coordinates: Some(north(km)),
            address: format!("{km} km north"),
            contact_number: "555-0100".into(),
            availability,
            response_time: "10 min".into(),
            distance: None,
        }
    }

    pub fn store_with(facilities: &[Facility]) -> Arc<MemoryRecordStore> {
        Arc::new(
            MemoryRecordStore::new()
                .with_values(super::FACILITIES_TABLE, facilities)
                .unwrap(),
        )
    }
}
