//! Side-channel JSON document written next to the population file

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::model::PopulationModel;
use crate::core::error::Result;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub nearest_zones: Vec<Vec<u32>>,
    pub nearest_densities: Vec<f64>,
    pub department_densities: Vec<f64>,
    pub province_densities: Vec<f64>,
    /// Department natural keys in index order
    pub departments: Vec<u32>,
    pub provinces: Vec<u32>,
    pub seed: u64,
}

impl PopulationSummary {
    pub fn from_model(model: &PopulationModel) -> Self {
        Self {
            nearest_zones: model.nearest_zones.clone(),
            nearest_densities: model.nearest_densities.clone(),
            department_densities: model.department_densities.clone(),
            province_densities: model.province_densities.clone(),
            departments: model.departments.keys().iter().map(|a| a.0).collect(),
            provinces: model.provinces.keys().iter().map(|p| p.0).collect(),
            seed: model.seed,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
