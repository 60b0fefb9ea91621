//! Geographic zones: input rows, household-count parsing and selection

pub mod selection;
pub mod zone;

pub use selection::select_zones;
pub use zone::{parse_household_count, HouseholdCount, Zone, ZoneRecord};

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::core::error::Result;

/// Zone document as handed over by the shapefile/GeoJSON adapter
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneDocument {
    pub zones: Vec<ZoneRecord>,
}

/// Every zone of the input, in input order
#[derive(Debug, Clone, Default)]
pub struct ZoneTable {
    zones: Vec<Zone>,
}

impl ZoneTable {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let document: ZoneDocument = serde_json::from_str(json)?;
        Self::from_records(document.zones)
    }

    pub fn from_records(records: Vec<ZoneRecord>) -> Result<Self> {
        let zones = records
            .into_iter()
            .enumerate()
            .map(|(row, record)| Zone::from_record(row, record))
            .collect::<Result<Vec<_>>>()?;
        info!(zones = zones.len(), "Loaded zone table");
        Ok(Self { zones })
    }

    pub fn from_zones(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SynthError;

    #[test]
    fn test_load_document() {
        let json = r#"{"zones": [
            {"area_id": 7, "province_id": 1, "households": "3.0", "population": 9, "area": 0.5, "centroid": [1, 2]},
            {"area_id": 8, "province_id": 1, "households": 0, "population": 0, "area": 0.2, "centroid": [3, 4]}
        ]}"#;
        let table = ZoneTable::from_json(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.zones()[0].households, 3);
        assert_eq!(table.zones()[1].source_row, 1);
    }

    #[test]
    fn test_bad_household_text_is_fatal() {
        let json = r#"{"zones": [
            {"area_id": 7, "province_id": 1, "households": "n/a", "population": 9, "area": 0.5, "centroid": [1, 2]}
        ]}"#;
        assert!(matches!(
            ZoneTable::from_json(json),
            Err(SynthError::InvalidHouseholdCount(_))
        ));
    }
}
