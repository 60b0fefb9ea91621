//! Per-area count tables and their inner join
//!
//! Census tables arrive as named lists of `{area, counts}` rows. They are
//! joined on the area id; an area absent from any table is dropped with a
//! warning.

use ahash::AHashMap;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::census::labels::clean_column;
use crate::core::error::{Result, SynthError};
use crate::core::types::AreaId;

/// Every count known for one area, plus its school enrollment means
#[derive(Debug, Clone)]
pub struct Area {
    pub id: AreaId,
    counts: AHashMap<String, u64>,
    /// Mean enrollment per rural school
    pub school_rural: Option<f64>,
    /// Mean enrollment per urban school
    pub school_urban: Option<f64>,
}

impl Area {
    pub fn new(id: AreaId) -> Self {
        Self {
            id,
            counts: AHashMap::new(),
            school_rural: None,
            school_urban: None,
        }
    }

    pub fn with_count(mut self, column: impl Into<String>, count: u64) -> Self {
        self.set_count(column, count);
        self
    }

    pub fn with_school_means(mut self, rural: Option<f64>, urban: Option<f64>) -> Self {
        self.school_rural = rural;
        self.school_urban = urban;
        self
    }

    pub fn set_count(&mut self, column: impl Into<String>, count: u64) {
        self.counts.insert(column.into(), count);
    }

    pub fn count(&self, column: &str) -> Option<u64> {
        self.counts.get(column).copied()
    }

    /// Counts for `columns` in order; a missing column is an error
    pub fn weights(&self, columns: &[String]) -> Result<Vec<u64>> {
        columns
            .iter()
            .map(|c| {
                self.count(c).ok_or_else(|| SynthError::MissingColumn {
                    area: self.id,
                    column: c.clone(),
                })
            })
            .collect()
    }
}

/// The joined census: one `Area` per area id
#[derive(Debug, Clone, Default)]
pub struct CensusTable {
    areas: BTreeMap<AreaId, Area>,
}

impl CensusTable {
    pub fn from_areas(areas: impl IntoIterator<Item = Area>) -> Self {
        Self {
            areas: areas.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    pub fn get(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(&id)
    }

    pub fn contains(&self, id: AreaId) -> bool {
        self.areas.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Fail with every area in `used` that the census does not cover
    pub fn check_coverage(&self, used: impl IntoIterator<Item = AreaId>) -> Result<()> {
        let missing: BTreeSet<AreaId> = used.into_iter().filter(|id| !self.contains(*id)).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SynthError::MissingAreas(missing.into_iter().collect()))
        }
    }
}

/// One row of a count table
#[derive(Debug, Clone, Deserialize)]
pub struct CountRow {
    pub area: u32,
    pub counts: BTreeMap<String, u64>,
}

/// One row of the school enrollment table
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolRow {
    pub area: u32,
    pub rural: Option<f64>,
    pub urban: Option<f64>,
}

/// Census tables as handed over by the spreadsheet/HDF adapters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CensusDocument {
    pub tables: BTreeMap<String, Vec<CountRow>>,
    #[serde(default)]
    pub schools: Vec<SchoolRow>,
}

impl CensusDocument {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether school enrollment means came with the document
    pub fn has_school_table(&self) -> bool {
        !self.schools.is_empty()
    }

    /// Inner-join every table (and the school table, when present) on area id
    pub fn into_table(self) -> Result<CensusTable> {
        let mut id_sets: Vec<BTreeSet<u32>> = self
            .tables
            .values()
            .map(|rows| rows.iter().map(|r| r.area).collect())
            .collect();
        if self.has_school_table() {
            id_sets.push(self.schools.iter().map(|r| r.area).collect());
        } else {
            warn!("Census document has no school table, every area will use the fallback school capacity");
        }

        let all: BTreeSet<u32> = id_sets.iter().flatten().copied().collect();
        let kept: BTreeSet<u32> = all
            .iter()
            .copied()
            .filter(|id| id_sets.iter().all(|set| set.contains(id)))
            .collect();

        let dropped: Vec<u32> = all.difference(&kept).copied().collect();
        if !dropped.is_empty() {
            warn!(
                count = dropped.len(),
                areas = ?dropped,
                "Areas missing from at least one census table were dropped by the join"
            );
        }

        let mut areas: BTreeMap<u32, Area> =
            kept.iter().map(|&id| (id, Area::new(AreaId(id)))).collect();

        for (name, rows) in self.tables {
            debug!(table = %name, rows = rows.len(), "Joining census table");
            for row in rows {
                let Some(area) = areas.get_mut(&row.area) else {
                    continue;
                };
                for (column, count) in row.counts {
                    area.set_count(clean_column(&column)?, count);
                }
            }
        }

        for row in self.schools {
            if let Some(area) = areas.get_mut(&row.area) {
                area.school_rural = row.rural;
                area.school_urban = row.urban;
            }
        }

        info!(areas = areas.len(), dropped = dropped.len(), "Census tables joined");
        Ok(CensusTable::from_areas(areas.into_values()))
    }
}
