//! Distance ranking of facilities around an origin.

use crate::identifiers::FacilityIdentifier;
use crate::models::{Coordinate, CoordinateError, Facility};
use crate::spatial::queries::distance_km;

/// A facility left out of a ranking because its coordinates are unusable
#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
    pub facility_id: FacilityIdentifier,
    pub error: CoordinateError,
}

/// Outcome of ranking a set of facilities against an origin
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ranking {
    /// Facilities within the radius, nearest first, `distance` populated
    pub within: Vec<Facility>,
    pub out_of_radius: usize,
    pub rejected: Vec<Rejection>,
}

/// Rank facilities around `origin`, keeping those within `radius_km`.
///
/// Ties in distance are broken by facility id. A negative or NaN radius, or an
/// invalid origin, yields an empty ranking.
pub fn rank<'a, I>(origin: Coordinate, facilities: I, radius_km: f64) -> Ranking
where
    I: IntoIterator<Item = &'a Facility>,
{
    if radius_km.is_nan() || radius_km < 0.0 {
        tracing::debug!(radius_km, "ignoring ranking with invalid radius");
        return Ranking::default();
    }
    if let Err(err) = origin.validate() {
        tracing::debug!(%err, "ignoring ranking with invalid origin");
        return Ranking::default();
    }

    let mut ranking = Ranking::default();
    let mut scored = Vec::new();

    for facility in facilities {
        match facility.location() {
            Ok(location) => {
                let distance = distance_km(origin, location);
                if distance <= radius_km {
                    scored.push((distance, facility));
                } else {
                    ranking.out_of_radius += 1;
                }
            }
            Err(error) => {
                tracing::debug!(facility = %facility.id, %error, "dropping facility from ranking");
                ranking.rejected.push(Rejection {
                    facility_id: facility.id.clone(),
                    error,
                });
            }
        }
    }

    scored.sort_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)));

    ranking.within = scored
        .into_iter()
        .map(|(distance, facility)| Facility {
            distance: Some(distance),
            ..facility.clone()
        })
        .collect();

    tracing::debug!(
        within = ranking.within.len(),
        out_of_radius = ranking.out_of_radius,
        rejected = ranking.rejected.len(),
        radius_km,
        "ranked facilities"
    );

    ranking
}

/// Facilities within `radius_km` of `origin`, nearest first.
///
/// Facilities with missing or malformed coordinates are dropped; use [`rank`] to see them.
pub fn nearby<'a, I>(origin: Coordinate, facilities: I, radius_km: f64) -> Vec<Facility>
where
    I: IntoIterator<Item = &'a Facility>,
{
    rank(origin, facilities, radius_km).within
}

/// The `n` closest facilities with usable coordinates
pub fn nearest<'a, I>(origin: Coordinate, facilities: I, n: usize) -> Vec<Facility>
where
    I: IntoIterator<Item = &'a Facility>,
{
    let mut closest = nearby(origin, facilities, f64::INFINITY);
    closest.truncate(n);
    closest
}
