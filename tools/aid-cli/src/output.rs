use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use rapid_aid::Facility;
use std::path::Path;

/// Create a point Feature for a facility. Facilities without usable
/// coordinates have nothing to draw.
fn facility_to_feature(facility: &Facility) -> Option<Feature> {
    let location = facility.location().ok()?;

    let mut properties = serde_json::Map::new();
    properties.insert("id".to_string(), serde_json::json!(facility.id.as_str()));
    properties.insert("name".to_string(), serde_json::json!(facility.name));
    properties.insert("kind".to_string(), serde_json::json!(facility.kind));
    properties.insert(
        "availability".to_string(),
        serde_json::json!(facility.availability),
    );
    if let Some(distance) = facility.distance {
        properties.insert("distance_km".to_string(), serde_json::json!(distance));
    }

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            location.longitude,
            location.latitude,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Write ranked facilities to a GeoJSON file, one point per facility
pub fn write_facilities_geojson(facilities: &[Facility], output_path: &Path) -> Result<()> {
    log::info!(
        "Writing {} facilities to {}",
        facilities.len(),
        output_path.display()
    );

    let features: Vec<Feature> = facilities.iter().filter_map(facility_to_feature).collect();

    let feature_collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    let geojson = GeoJson::from(feature_collection);
    let json_string =
        serde_json::to_string_pretty(&geojson).context("Failed to serialize GeoJSON")?;

    std::fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write GeoJSON to {}", output_path.display()))?;

    Ok(())
}

/// One line per ranked facility
pub fn facility_row(facility: &Facility) -> String {
    let distance = facility
        .distance
        .map(|d| format!("{d:>8.2} km"))
        .unwrap_or_else(|| format!("{:>11}", "-"));

    format!(
        "{:<14} {:<9} {:<11} {}  {}",
        facility.id.as_str(),
        facility.kind.to_string(),
        facility.availability.to_string(),
        distance,
        facility.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapid_aid::{Availability, Coordinate, FacilityIdentifier, FacilityKind};

    fn facility(coordinates: Option<Coordinate>) -> Facility {
        Facility {
            id: FacilityIdentifier::new("HOSPITAL-001"),
            name: "St. Mary's".into(),
            kind: FacilityKind::Hospital,
            coordinates,
            address: "3 Quay St".into(),
            contact_number: "555-0142".into(),
            availability: Availability::Available,
            response_time: "6 min".into(),
            distance: Some(1.25),
        }
    }

    #[test]
    fn test_facility_to_feature() {
        let feature = facility_to_feature(&facility(Some(Coordinate {
            latitude: 53.35,
            longitude: -6.26,
        })))
        .unwrap();

        match feature.geometry.unwrap().value {
            Value::Point(position) => assert_eq!(position, vec![-6.26, 53.35]),
            _ => panic!("Expected Point value"),
        }

        let properties = feature.properties.unwrap();
        assert_eq!(properties["kind"], "hospital");
        assert_eq!(properties["availability"], "available");
        assert_eq!(properties["distance_km"], 1.25);
    }

    #[test]
    fn test_unlocated_facility_is_skipped() {
        assert!(facility_to_feature(&facility(None)).is_none());
        assert!(facility_to_feature(&facility(Some(Coordinate {
            latitude: 120.0,
            longitude: 0.0,
        })))
        .is_none());
    }

    #[test]
    fn test_facility_row() {
        let row = facility_row(&facility(None));
        assert!(row.starts_with("HOSPITAL-001"));
        assert!(row.contains("1.25 km"));
        assert!(row.ends_with("St. Mary's"));
    }
}
