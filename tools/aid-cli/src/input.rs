use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a JSON array of records from disk
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        bail!("Input file does not exist: {}", path.display());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records = parse_records(&text)
        .with_context(|| format!("Failed to parse records in {}", path.display()))?;

    log::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse a JSON array, reporting the index of the first record that fails
pub fn parse_records<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(text).context("Expected a JSON array of records")?;

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value(value).with_context(|| format!("Invalid record at index {i}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapid_aid::{Facility, FacilityKind};

    #[test]
    fn test_parse_facilities() {
        let text = r#"[
            {"id": "POLICE-001", "name": "Precinct 4", "type": "police",
             "coordinates": {"latitude": 51.5, "longitude": -0.12},
             "address": "4 Bow St", "contact_number": "999", "availability": "busy"},
            {"id": "OTHER-002", "name": "Field Post", "type": "other",
             "address": "", "contact_number": "", "availability": "available"}
        ]"#;

        let facilities: Vec<Facility> = parse_records(text).unwrap();
        assert_eq!(facilities.len(), 2);
        assert_eq!(facilities[0].kind, FacilityKind::Police);
        assert!(facilities[1].coordinates.is_none());
    }

    #[test]
    fn test_parse_reports_bad_index() {
        let text = r#"[
            {"id": "FIRE-001", "name": "A", "type": "fire", "address": "",
             "contact_number": "", "availability": "available"},
            {"id": "FIRE-002", "name": "B", "type": "submarine", "address": "",
             "contact_number": "", "availability": "available"}
        ]"#;

        let err = parse_records::<Facility>(text).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_records::<Facility>(r#"{"id": "x"}"#).is_err());
    }
}
