use std::sync::Arc;

use chrono::{Datelike, Utc};

use crate::aggregate::sort_newest_first;
use crate::identifiers::{padded_sequence, IncidentIdentifier};
use crate::models::*;
use crate::services::{decode, decode_all, encode, patch, INCIDENTS_TABLE};
use crate::store::{RecordQuery, RecordStore};

#[derive(Clone)]
pub struct IncidentService {
    store: Arc<dyn RecordStore>,
}

impl IncidentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All incidents, newest first
    pub async fn get_all(&self) -> Result<Vec<Incident>> {
        let records = self
            .store
            .fetch_records(INCIDENTS_TABLE, &RecordQuery::new())
            .await?;
        let mut incidents: Vec<Incident> = decode_all(records)?;
        sort_newest_first(&mut incidents);
        Ok(incidents)
    }

    pub async fn get_by_id(&self, id: &IncidentIdentifier) -> Result<Option<Incident>> {
        self.store
            .get_record(INCIDENTS_TABLE, id.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    /// Unresolved incidents, newest first
    pub async fn get_active(&self) -> Result<Vec<Incident>> {
        let mut incidents = self.get_all().await?;
        incidents.retain(Incident::is_active);
        Ok(incidents)
    }

    pub async fn get_by_status(&self, status: IncidentStatus) -> Result<Vec<Incident>> {
        let mut incidents = self.get_all().await?;
        incidents.retain(|i| i.status == status);
        Ok(incidents)
    }

    /// Record a new incident as pending. Ids run `EMG-{year}-{NNN}`.
    pub async fn create(&self, new: NewIncident) -> Result<Incident> {
        new.validate()?;

        let created_at = Utc::now();
        let sequence = self.store.next_sequence(INCIDENTS_TABLE).await?;
        let incident = Incident {
            id: IncidentIdentifier::new(format!(
                "EMG-{}-{}",
                created_at.year(),
                padded_sequence(sequence)
            )),
            created_at,
            location: new.location,
            severity: new.severity,
            accident_type: new.accident_type,
            victim_count: new.victim_count,
            description: new.description,
            status: IncidentStatus::Pending,
            notified_facility_ids: new.notified_facility_ids,
        };

        let stored = self
            .store
            .create_record(INCIDENTS_TABLE, encode(&incident)?)
            .await?;
        tracing::info!(
            incident = %incident.id,
            severity = %incident.severity,
            notified = incident.notified_facility_ids.len(),
            "recorded incident"
        );
        decode(stored)
    }

    /// Edit report details. An empty update returns the incident unchanged.
    pub async fn update(&self, id: &IncidentIdentifier, changes: IncidentUpdate) -> Result<Incident> {
        changes.validate()?;

        let fields = encode(&changes)?;
        let updated = if fields.is_empty() {
            self.store.get_record(INCIDENTS_TABLE, id.as_str()).await?
        } else {
            self.store
                .update_record(INCIDENTS_TABLE, id.as_str(), fields)
                .await?
        };

        let updated = updated.ok_or_else(|| EmergencyError::IncidentNotFound(id.clone()))?;
        tracing::info!(incident = %id, "incident updated");
        decode(updated)
    }

    /// Advance an incident along its lifecycle.
    ///
    /// The write only lands if the status is still the one the transition was
    /// checked against, so concurrent callers can't both move it forward.
    pub async fn update_status(
        &self,
        id: &IncidentIdentifier,
        next: IncidentStatus,
    ) -> Result<Incident> {
        let mut incident = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| EmergencyError::IncidentNotFound(id.clone()))?;

        let previous = incident.transition(next).inspect_err(|e| {
            tracing::warn!(incident = %id, "{e}");
        })?;

        let unchanged = RecordQuery::new().filter("status", serde_json::to_value(previous)?);
        let updated = self
            .store
            .update_record_if(INCIDENTS_TABLE, id.as_str(), &unchanged, patch("status", next)?)
            .await?;

        let Some(updated) = updated else {
            // Removed or moved on since it was read
            let current = self
                .get_by_id(id)
                .await?
                .ok_or_else(|| EmergencyError::IncidentNotFound(id.clone()))?;
            let err = EmergencyError::InvalidTransition {
                from: current.status,
                to: next,
            };
            tracing::warn!(incident = %id, "{err}");
            return Err(err);
        };

        tracing::info!(incident = %id, from = %previous, to = %next, "incident status changed");
        decode(updated)
    }

    pub async fn delete(&self, id: &IncidentIdentifier) -> Result<()> {
        if self.store.delete_record(INCIDENTS_TABLE, id.as_str()).await? {
            Ok(())
        } else {
            Err(EmergencyError::IncidentNotFound(id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::*;
    use crate::store::MemoryRecordStore;

    fn service() -> IncidentService {
        IncidentService::new(Arc::new(MemoryRecordStore::new()))
    }

    fn report(severity: Severity) -> NewIncident {
        NewIncident {
            location: IncidentLocation {
                address: "Route 9, mile 14".into(),
                coordinates: origin(),
            },
            severity,
            accident_type: "vehicle".into(),
            victim_count: 2,
            description: "Rollover".into(),
            notified_facility_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let service = service();

        let first = service.create(report(Severity::Critical)).await.unwrap();
        let second = service.create(report(Severity::Moderate)).await.unwrap();

        assert_eq!(first.status, IncidentStatus::Pending);
        assert!(first.id.as_str().starts_with("EMG-"));
        assert!(first.id.as_str().ends_with("-001"));
        assert!(second.id.as_str().ends_with("-002"));

        let all = service.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at >= all[1].created_at);
    }

    #[tokio::test]
    async fn test_create_validates() {
        let service = service();

        let mut bad = report(Severity::Severe);
        bad.victim_count = 0;
        assert!(matches!(
            service.create(bad).await,
            Err(EmergencyError::InvalidData(_))
        ));

        let mut bad = report(Severity::Severe);
        bad.location.coordinates = Coordinate { latitude: f64::NAN, longitude: 0.0 };
        assert!(matches!(
            service.create(bad).await,
            Err(EmergencyError::InvalidCoordinate(_))
        ));

        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let service = service();
        let id = service.create(report(Severity::Severe)).await.unwrap().id;

        let acknowledged = service
            .update_status(&id, IncidentStatus::Acknowledged)
            .await
            .unwrap();
        assert_eq!(acknowledged.status, IncidentStatus::Acknowledged);

        let err = service
            .update_status(&id, IncidentStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EmergencyError::InvalidTransition {
                from: IncidentStatus::Acknowledged,
                to: IncidentStatus::Pending,
            }
        ));

        service
            .update_status(&id, IncidentStatus::Resolved)
            .await
            .unwrap();
        assert!(service.get_active().await.unwrap().is_empty());
        assert_eq!(
            service
                .get_by_status(IncidentStatus::Resolved)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_concurrent_status_changes() {
        let service = service();
        let id = service.create(report(Severity::Critical)).await.unwrap().id;

        let (first, second) = tokio::join!(
            service.update_status(&id, IncidentStatus::Acknowledged),
            service.update_status(&id, IncidentStatus::Acknowledged),
        );

        // exactly one caller moves it forward
        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
        let rejected = if first.is_err() { first } else { second };
        assert!(matches!(
            rejected,
            Err(EmergencyError::InvalidTransition {
                from: IncidentStatus::Acknowledged,
                to: IncidentStatus::Acknowledged,
            })
        ));
    }

    #[tokio::test]
    async fn test_update_details() {
        let service = service();
        let id = service.create(report(Severity::Moderate)).await.unwrap().id;

        let updated = service
            .update(
                &id,
                IncidentUpdate {
                    severity: Some(Severity::Critical),
                    victim_count: Some(4),
                    description: Some("Rollover, fuel leak".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.severity, Severity::Critical);
        assert_eq!(updated.victim_count, 4);
        assert_eq!(updated.description, "Rollover, fuel leak");
        assert_eq!(updated.accident_type, "vehicle");
        assert_eq!(updated.status, IncidentStatus::Pending);

        let unchanged = service.update(&id, IncidentUpdate::default()).await.unwrap();
        assert_eq!(unchanged, updated);

        assert!(matches!(
            service
                .update(
                    &id,
                    IncidentUpdate {
                        victim_count: Some(0),
                        ..Default::default()
                    }
                )
                .await,
            Err(EmergencyError::InvalidData(_))
        ));
        assert!(matches!(
            service
                .update(&IncidentIdentifier::new("EMG-2024-404"), IncidentUpdate::default())
                .await,
            Err(EmergencyError::IncidentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_incident() {
        let service = service();
        let id = IncidentIdentifier::new("EMG-2024-404");

        assert!(service.get_by_id(&id).await.unwrap().is_none());
        assert!(matches!(
            service.update_status(&id, IncidentStatus::Resolved).await,
            Err(EmergencyError::IncidentNotFound(_))
        ));
        assert!(matches!(
            service.delete(&id).await,
            Err(EmergencyError::IncidentNotFound(_))
        ));
    }
}
