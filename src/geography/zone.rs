//! Zone rows as they arrive from the geographic adapter, and their resolved
//! form

use geo::Centroid;
use geo_types::{LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SynthError};
use crate::core::types::{AreaId, ProvinceId};

/// Household count column: integer, or legacy text such as `"123.000"`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum HouseholdCount {
    Count(u32),
    Text(String),
}

impl HouseholdCount {
    pub fn resolve(&self) -> Result<u32> {
        match self {
            HouseholdCount::Count(n) => Ok(*n),
            HouseholdCount::Text(raw) => parse_household_count(raw),
        }
    }
}

/// Parse a textual household count; empty text means zero
pub fn parse_household_count(raw: &str) -> Result<u32> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(0);
    }
    let digits = match text.split_once('.') {
        Some((int, frac)) if !frac.is_empty() && frac.chars().all(|c| c == '0') => int,
        Some(_) => return Err(SynthError::InvalidHouseholdCount(raw.to_string())),
        None => text,
    };
    digits
        .parse::<u32>()
        .map_err(|_| SynthError::InvalidHouseholdCount(raw.to_string()))
}

/// One zone row of the input document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneRecord {
    pub area_id: u32,
    pub province_id: u32,
    pub households: HouseholdCount,
    pub population: f64,
    /// Surface, in the unit densities are reported in
    pub area: f64,
    #[serde(default)]
    pub centroid: Option<[f64; 2]>,
    #[serde(default)]
    pub polygon: Option<Vec<[f64; 2]>>,
}

/// A zone ready for generation
#[derive(Debug, Clone)]
pub struct Zone {
    pub area_id: AreaId,
    pub province_id: ProvinceId,
    pub households: u32,
    pub population: f64,
    pub surface: f64,
    /// In input coordinates, before projection
    pub centroid: Point<f64>,
    pub polygon: Option<Polygon<f64>>,
    /// Position in the input document
    pub source_row: usize,
}

impl Zone {
    pub fn from_record(row: usize, record: ZoneRecord) -> Result<Self> {
        let polygon = record.polygon.as_ref().map(|ring| {
            let coords: Vec<(f64, f64)> = ring.iter().map(|[x, y]| (*x, *y)).collect();
            Polygon::new(LineString::from(coords), vec![])
        });

        let centroid = match (record.centroid, &polygon) {
            (Some([x, y]), _) => Point::new(x, y),
            (None, Some(poly)) => poly.centroid().ok_or(SynthError::MissingGeometry(row))?,
            (None, None) => return Err(SynthError::MissingGeometry(row)),
        };

        Ok(Self {
            area_id: AreaId(record.area_id),
            province_id: ProvinceId(record.province_id),
            households: record.households.resolve()?,
            population: record.population,
            surface: record.area,
            centroid,
            polygon,
            source_row: row,
        })
    }
}
