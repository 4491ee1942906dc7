//! Raising alerts and acknowledging them.
//!
//! A raised alert snapshots the facility table into a [`FacilityDirectory`],
//! picks the nearest available facilities within the configured radius and
//! records a pending incident naming them.

use std::sync::Arc;

use crate::directory::FacilityDirectory;
use crate::identifiers::{FacilityIdentifier, IncidentIdentifier};
use crate::models::*;
use crate::services::{FacilityService, IncidentService, ResponseService};
use crate::store::RecordStore;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DispatchConfig {
    /// Search radius around the incident
    pub radius_km: f64,
    /// Upper bound on facilities notified per alert
    pub max_notified: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            radius_km: 10.0,
            max_notified: 5,
        }
    }
}

/// What a reporter tells us about an emergency
#[derive(Clone, Debug, PartialEq)]
pub struct AlertReport {
    pub location: IncidentLocation,
    pub severity: Severity,
    pub accident_type: String,
    pub victim_count: u32,
    pub description: String,
}

impl AlertReport {
    /// One-tap alert with no details beyond the reporter's position
    pub fn emergency_button(location: IncidentLocation) -> Self {
        Self {
            location,
            severity: Severity::Critical,
            accident_type: "emergency".into(),
            victim_count: 1,
            description: "Emergency alert sent via emergency button".into(),
        }
    }
}

/// A recorded incident and the facilities it was sent to, nearest first
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub incident: Incident,
    pub notified: Vec<Facility>,
}

#[derive(Clone)]
pub struct AlertDispatcher {
    facilities: FacilityService,
    incidents: IncidentService,
    responses: ResponseService,
    config: DispatchConfig,
}

impl AlertDispatcher {
    pub fn new(store: Arc<dyn RecordStore>, config: DispatchConfig) -> Self {
        Self {
            facilities: FacilityService::new(store.clone()),
            incidents: IncidentService::new(store.clone()),
            responses: ResponseService::new(store),
            config,
        }
    }

    pub fn config(&self) -> DispatchConfig {
        self.config
    }

    /// Pick facilities to notify from a directory snapshot
    pub fn select(&self, directory: &FacilityDirectory, origin: Coordinate) -> Vec<Facility> {
        directory
            .nearby(origin, self.config.radius_km)
            .into_iter()
            .filter(Facility::is_available)
            .take(self.config.max_notified)
            .collect()
    }

    pub async fn raise(&self, report: AlertReport) -> Result<Dispatch> {
        let origin = report.location.coordinates.validate()?;

        let directory = self.facilities.directory().await?;
        let notified = self.select(&directory, origin);
        if notified.is_empty() {
            tracing::warn!(
                radius_km = self.config.radius_km,
                "no available facility within range"
            );
        }

        let incident = self
            .incidents
            .create(NewIncident {
                location: report.location,
                severity: report.severity,
                accident_type: report.accident_type,
                victim_count: report.victim_count,
                description: report.description,
                notified_facility_ids: notified.iter().map(|f| f.id.clone()).collect(),
            })
            .await?;

        tracing::info!(
            incident = %incident.id,
            notified = notified.len(),
            "alert raised"
        );
        Ok(Dispatch { incident, notified })
    }

    /// Record a facility's response. A pending incident becomes acknowledged.
    pub async fn acknowledge(
        &self,
        incident_id: &IncidentIdentifier,
        facility_id: &FacilityIdentifier,
        responder_id: impl Into<String>,
        estimated_arrival: impl Into<String>,
    ) -> Result<AlertResponse> {
        let incident = self
            .incidents
            .get_by_id(incident_id)
            .await?
            .ok_or_else(|| EmergencyError::IncidentNotFound(incident_id.clone()))?;
        if self.facilities.get_by_id(facility_id).await?.is_none() {
            return Err(EmergencyError::FacilityNotFound(facility_id.clone()));
        }

        let response = self
            .responses
            .create(NewAlertResponse {
                facility_id: facility_id.clone(),
                incident_id: incident_id.clone(),
                responder_id: responder_id.into(),
                estimated_arrival: estimated_arrival.into(),
                status: None,
                notes: String::new(),
            })
            .await?;

        if incident.status == IncidentStatus::Pending {
            self.incidents
                .update_status(incident_id, IncidentStatus::Acknowledged)
                .await?;
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::*;
    use crate::services::RESPONSES_TABLE;
    use crate::store::RecordQuery;

    fn located(coordinates: Coordinate) -> IncidentLocation {
        IncidentLocation {
            address: "Main St & 3rd".into(),
            coordinates,
        }
    }

    fn dispatcher() -> (AlertDispatcher, Arc<dyn RecordStore>) {
        let store: Arc<dyn RecordStore> = store_with(&[
            facility("HOSPITAL-001", FacilityKind::Hospital, 4.0, Availability::Available),
            facility("HOSPITAL-002", FacilityKind::Hospital, 0.5, Availability::Busy),
            facility("POLICE-003", FacilityKind::Police, 1.0, Availability::Available),
            facility("POLICE-004", FacilityKind::Police, 6.0, Availability::Available),
            facility("FIRE-005", FacilityKind::Fire, 2.0, Availability::Available),
            facility("FIRE-006", FacilityKind::Fire, 3.0, Availability::Available),
            facility("OTHER-007", FacilityKind::Other, 5.0, Availability::Available),
            facility("FIRE-008", FacilityKind::Fire, 20.0, Availability::Available),
        ]);
        (
            AlertDispatcher::new(store.clone(), DispatchConfig::default()),
            store,
        )
    }

    #[tokio::test]
    async fn test_raise_notifies_nearest_available() {
        let (dispatcher, _) = dispatcher();

        let dispatch = dispatcher
            .raise(AlertReport::emergency_button(located(origin())))
            .await
            .unwrap();

        let ids: Vec<_> = dispatch.notified.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(
            ids,
            ["POLICE-003", "FIRE-005", "FIRE-006", "HOSPITAL-001", "OTHER-007"]
        );
        assert_eq!(
            dispatch.incident.notified_facility_ids,
            dispatch.notified.iter().map(|f| f.id.clone()).collect::<Vec<_>>()
        );
        assert_eq!(dispatch.incident.status, IncidentStatus::Pending);
        assert_eq!(dispatch.incident.severity, Severity::Critical);
        assert_eq!(dispatch.incident.accident_type, "emergency");
    }

    #[tokio::test]
    async fn test_raise_with_nothing_in_range() {
        let (dispatcher, _) = dispatcher();
        let far = Coordinate::new(-33.9, 151.2).unwrap();

        let dispatch = dispatcher
            .raise(AlertReport::emergency_button(located(far)))
            .await
            .unwrap();
        assert!(dispatch.notified.is_empty());
        assert!(dispatch.incident.notified_facility_ids.is_empty());
    }

    #[tokio::test]
    async fn test_raise_rejects_bad_location() {
        let (dispatcher, _) = dispatcher();
        let bad = Coordinate { latitude: 95.0, longitude: 0.0 };

        let result = dispatcher
            .raise(AlertReport::emergency_button(located(bad)))
            .await;
        assert!(matches!(
            result,
            Err(EmergencyError::InvalidCoordinate(
                CoordinateError::LatitudeOutOfRange(_)
            ))
        ));
    }

    #[tokio::test]
    async fn test_acknowledge_advances_pending_incident() {
        let (dispatcher, store) = dispatcher();
        let incident = dispatcher
            .raise(AlertReport::emergency_button(located(origin())))
            .await
            .unwrap()
            .incident;
        let facility = FacilityIdentifier::new("POLICE-003");

        let response = dispatcher
            .acknowledge(&incident.id, &facility, "unit-12", "6 min")
            .await
            .unwrap();
        assert_eq!(response.incident_id, incident.id);
        assert_eq!(response.status, ResponseStatus::Acknowledged);

        let incidents = IncidentService::new(store.clone());
        let stored = incidents.get_by_id(&incident.id).await.unwrap().unwrap();
        assert_eq!(stored.status, IncidentStatus::Acknowledged);

        // a second facility answering leaves the status alone
        dispatcher
            .acknowledge(&incident.id, &FacilityIdentifier::new("FIRE-005"), "engine-3", "9 min")
            .await
            .unwrap();
        let stored = incidents.get_by_id(&incident.id).await.unwrap().unwrap();
        assert_eq!(stored.status, IncidentStatus::Acknowledged);

        let responses = store
            .fetch_records(RESPONSES_TABLE, &RecordQuery::new())
            .await
            .unwrap();
        assert_eq!(responses.len(), 2);
    }

    #[tokio::test]
    async fn test_acknowledge_unknown_records() {
        let (dispatcher, _) = dispatcher();
        let incident = dispatcher
            .raise(AlertReport::emergency_button(located(origin())))
            .await
            .unwrap()
            .incident;

        assert!(matches!(
            dispatcher
                .acknowledge(
                    &IncidentIdentifier::new("EMG-1999-001"),
                    &FacilityIdentifier::new("FIRE-005"),
                    "x",
                    ""
                )
                .await,
            Err(EmergencyError::IncidentNotFound(_))
        ));
        assert!(matches!(
            dispatcher
                .acknowledge(&incident.id, &FacilityIdentifier::new("FIRE-999"), "x", "")
                .await,
            Err(EmergencyError::FacilityNotFound(_))
        ));
    }
}
