//! Dashboard summaries over in-memory incident and facility lists.
//!
//! Everything here is a pure function of its inputs.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use strum::IntoEnumIterator;

use crate::models::*;

/// Incident field to group by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKey {
    Status,
    Severity,
}

/// Count items per key. Every variant of `K` is present, zero when unseen.
pub fn tally<T, K, F>(items: &[T], key: F) -> BTreeMap<K, usize>
where
    K: IntoEnumIterator + Ord,
    F: Fn(&T) -> K,
{
    let mut counts: BTreeMap<K, usize> = K::iter().map(|k| (k, 0)).collect();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

/// Incident counts keyed by the lowercase status or severity name
pub fn count_by(incidents: &[Incident], key: GroupKey) -> BTreeMap<&'static str, usize> {
    match key {
        GroupKey::Status => named(tally(incidents, |i| i.status)),
        GroupKey::Severity => named(tally(incidents, |i| i.severity)),
    }
}

fn named<K: Into<&'static str>>(counts: BTreeMap<K, usize>) -> BTreeMap<&'static str, usize> {
    counts.into_iter().map(|(k, n)| (k.into(), n)).collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub total: usize,
    pub resolved: usize,
    pub critical: usize,
    /// Created in the seven days before `now`
    pub this_week: usize,
}

impl HistoryStats {
    pub fn from_incidents(incidents: &[Incident], now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);

        Self {
            total: incidents.len(),
            resolved: incidents
                .iter()
                .filter(|i| i.status == IncidentStatus::Resolved)
                .count(),
            critical: incidents
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count(),
            this_week: incidents.iter().filter(|i| i.created_at > week_ago).count(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActiveStats {
    pub pending: usize,
    pub acknowledged: usize,
    pub responding: usize,
}

impl ActiveStats {
    pub fn from_incidents(incidents: &[Incident]) -> Self {
        let counts = tally(incidents, |i| i.status);
        Self {
            pending: counts[&IncidentStatus::Pending],
            acknowledged: counts[&IncidentStatus::Acknowledged],
            responding: counts[&IncidentStatus::Responding],
        }
    }
}

/// Distance under which a ranked facility counts as close by
pub const CLOSE_BY_KM: f64 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FacilityStats {
    pub total: usize,
    pub available: usize,
    pub hospitals: usize,
    pub police: usize,
    pub fire: usize,
    /// Ranked facilities within [`CLOSE_BY_KM`]; unranked ones never count
    pub close_by: usize,
}

impl FacilityStats {
    pub fn from_facilities(facilities: &[Facility]) -> Self {
        let kinds = tally(facilities, |f| f.kind);
        Self {
            total: facilities.len(),
            available: facilities.iter().filter(|f| f.is_available()).count(),
            hospitals: kinds[&FacilityKind::Hospital],
            police: kinds[&FacilityKind::Police],
            fire: kinds[&FacilityKind::Fire],
            close_by: facilities
                .iter()
                .filter(|f| f.distance.is_some_and(|d| d <= CLOSE_BY_KM))
                .count(),
        }
    }
}

/// History view filters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IncidentFilter {
    #[default]
    All,
    Resolved,
    Critical,
    AccidentType(String),
}

impl IncidentFilter {
    pub fn matches(&self, incident: &Incident) -> bool {
        match self {
            Self::All => true,
            Self::Resolved => incident.status == IncidentStatus::Resolved,
            Self::Critical => incident.severity == Severity::Critical,
            Self::AccidentType(kind) => incident.accident_type.eq_ignore_ascii_case(kind),
        }
    }
}

/// Case-insensitive match against id, description, address and accident type.
/// An empty term matches everything.
pub fn matches_search(incident: &Incident, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    [
        incident.id.as_str(),
        incident.description.as_str(),
        incident.location.address.as_str(),
        incident.accident_type.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&term))
}

pub fn filter_incidents<'a>(
    incidents: &'a [Incident],
    filter: &IncidentFilter,
    search: &str,
) -> Vec<&'a Incident> {
    incidents
        .iter()
        .filter(|i| filter.matches(i) && matches_search(i, search))
        .collect()
}

pub fn sort_newest_first(incidents: &mut [Incident]) {
    incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Unresolved incidents, newest first
pub fn active(incidents: &[Incident]) -> Vec<Incident> {
    let mut active: Vec<Incident> = incidents.iter().filter(|i| i.is_active()).cloned().collect();
    sort_newest_first(&mut active);
    active
}
