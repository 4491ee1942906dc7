use std::sync::Arc;

use crate::directory::FacilityDirectory;
use crate::identifiers::{padded_sequence, FacilityIdentifier};
use crate::models::facility::unknown_response_time;
use crate::models::*;
use crate::services::{decode, decode_all, encode, patch, FACILITIES_TABLE};
use crate::spatial::ranking::{self, Ranking};
use crate::store::{RecordQuery, RecordStore};

#[derive(Clone)]
pub struct FacilityService {
    store: Arc<dyn RecordStore>,
}

impl FacilityService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<Facility>> {
        let records = self
            .store
            .fetch_records(FACILITIES_TABLE, &RecordQuery::new())
            .await?;
        decode_all(records)
    }

    pub async fn get_by_id(&self, id: &FacilityIdentifier) -> Result<Option<Facility>> {
        self.store
            .get_record(FACILITIES_TABLE, id.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn get_by_kind(&self, kind: FacilityKind) -> Result<Vec<Facility>> {
        let query = RecordQuery::new().filter("type", kind.to_string());
        decode_all(self.store.fetch_records(FACILITIES_TABLE, &query).await?)
    }

    pub async fn get_available(&self) -> Result<Vec<Facility>> {
        let mut facilities = self.get_all().await?;
        facilities.retain(Facility::is_available);
        Ok(facilities)
    }

    /// Current facilities as an indexed snapshot
    pub async fn directory(&self) -> Result<FacilityDirectory> {
        Ok(FacilityDirectory::from_facilities(self.get_all().await?))
    }

    pub async fn rank(&self, origin: Coordinate, radius_km: f64) -> Result<Ranking> {
        let facilities = self.get_all().await?;
        Ok(ranking::rank(origin, &facilities, radius_km))
    }

    /// Facilities within `radius_km`, nearest first, `distance` populated
    pub async fn get_nearby(&self, origin: Coordinate, radius_km: f64) -> Result<Vec<Facility>> {
        Ok(self.rank(origin, radius_km).await?.within)
    }

    pub async fn create(&self, new: NewFacility) -> Result<Facility> {
        let coordinates = new.coordinates.validate()?;
        if new.name.trim().is_empty() {
            return Err(EmergencyError::InvalidData("facility name is required".into()));
        }

        let sequence = self.store.next_sequence(FACILITIES_TABLE).await?;
        let facility = Facility {
            id: FacilityIdentifier::new(format!(
                "{}-{}",
                new.kind.id_prefix(),
                padded_sequence(sequence)
            )),
            name: new.name,
            kind: new.kind,
            coordinates: Some(coordinates),
            address: new.address,
            contact_number: new.contact_number,
            availability: new.availability.unwrap_or_default(),
            response_time: new.response_time.unwrap_or_else(unknown_response_time),
            distance: None,
        };

        let stored = self
            .store
            .create_record(FACILITIES_TABLE, encode(&facility)?)
            .await?;
        tracing::info!(facility = %facility.id, kind = %facility.kind, "registered facility");
        decode(stored)
    }

    pub async fn update_availability(
        &self,
        id: &FacilityIdentifier,
        availability: Availability,
    ) -> Result<Facility> {
        let updated = self
            .store
            .update_record(FACILITIES_TABLE, id.as_str(), patch("availability", availability)?)
            .await?
            .ok_or_else(|| EmergencyError::FacilityNotFound(id.clone()))?;
        decode(updated)
    }

    pub async fn delete(&self, id: &FacilityIdentifier) -> Result<()> {
        if self.store.delete_record(FACILITIES_TABLE, id.as_str()).await? {
            Ok(())
        } else {
            Err(EmergencyError::FacilityNotFound(id.clone()))
        }
    }
}
