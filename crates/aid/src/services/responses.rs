use std::sync::Arc;

use chrono::Utc;

use crate::identifiers::{padded_sequence, FacilityIdentifier, IncidentIdentifier, ResponseIdentifier};
use crate::models::*;
use crate::services::{decode, decode_all, encode, patch, RESPONSES_TABLE};
use crate::store::{RecordQuery, RecordStore};

#[derive(Clone)]
pub struct ResponseService {
    store: Arc<dyn RecordStore>,
}

impl ResponseService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    async fn fetch(&self, query: RecordQuery) -> Result<Vec<AlertResponse>> {
        let records = self.store.fetch_records(RESPONSES_TABLE, &query).await?;
        let mut responses: Vec<AlertResponse> = decode_all(records)?;
        responses.sort_by(|a, b| b.acknowledged_at.cmp(&a.acknowledged_at));
        Ok(responses)
    }

    /// All responses, most recently acknowledged first
    pub async fn get_all(&self) -> Result<Vec<AlertResponse>> {
        self.fetch(RecordQuery::new()).await
    }

    pub async fn get_by_id(&self, id: &ResponseIdentifier) -> Result<Option<AlertResponse>> {
        self.store
            .get_record(RESPONSES_TABLE, id.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn get_by_incident(&self, id: &IncidentIdentifier) -> Result<Vec<AlertResponse>> {
        self.fetch(RecordQuery::new().filter("incident_id", id.as_str()))
            .await
    }

    pub async fn get_by_facility(&self, id: &FacilityIdentifier) -> Result<Vec<AlertResponse>> {
        self.fetch(RecordQuery::new().filter("facility_id", id.as_str()))
            .await
    }

    pub async fn get_by_status(&self, status: ResponseStatus) -> Result<Vec<AlertResponse>> {
        self.fetch(RecordQuery::new().filter("status", serde_json::to_value(status)?))
            .await
    }

    pub async fn create(&self, new: NewAlertResponse) -> Result<AlertResponse> {
        if new.responder_id.trim().is_empty() {
            return Err(EmergencyError::InvalidData("responder id is required".into()));
        }

        let sequence = self.store.next_sequence(RESPONSES_TABLE).await?;
        let response = AlertResponse {
            id: ResponseIdentifier::new(format!("RSP-{}", padded_sequence(sequence))),
            facility_id: new.facility_id,
            incident_id: new.incident_id,
            acknowledged_at: Utc::now(),
            responder_id: new.responder_id,
            estimated_arrival: new.estimated_arrival,
            status: new.status.unwrap_or_default(),
            notes: new.notes,
        };

        let stored = self
            .store
            .create_record(RESPONSES_TABLE, encode(&response)?)
            .await?;
        tracing::info!(
            response = %response.id,
            incident = %response.incident_id,
            facility = %response.facility_id,
            "recorded alert response"
        );
        decode(stored)
    }

    /// Set a response's status. Notes are replaced only when non-empty.
    pub async fn update_status(
        &self,
        id: &ResponseIdentifier,
        status: ResponseStatus,
        notes: Option<&str>,
    ) -> Result<AlertResponse> {
        let mut changes = patch("status", status)?;
        if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
            changes.extend(patch("notes", notes)?);
        }

        let updated = self
            .store
            .update_record(RESPONSES_TABLE, id.as_str(), changes)
            .await?
            .ok_or_else(|| EmergencyError::ResponseNotFound(id.clone()))?;
        decode(updated)
    }

    pub async fn delete(&self, id: &ResponseIdentifier) -> Result<()> {
        if self.store.delete_record(RESPONSES_TABLE, id.as_str()).await? {
            Ok(())
        } else {
            Err(EmergencyError::ResponseNotFound(id.clone()))
        }
    }
}
