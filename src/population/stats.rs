//! Run statistics

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::model::PopulationModel;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationStats {
    pub zones: u32,
    pub families: u32,
    pub persons: u32,
    pub schools: u32,
    pub students: u32,
    pub employed: u32,
    pub generation_time_ms: u64,
    pub seed: u64,
}

impl GenerationStats {
    pub fn new(model: &PopulationModel, elapsed: Duration) -> Self {
        Self {
            zones: model.zones.len() as u32,
            families: model.families.len() as u32,
            persons: model.persons.len() as u32,
            schools: model.schools,
            students: model.students() as u32,
            employed: model.employed() as u32,
            generation_time_ms: elapsed.as_millis() as u64,
            seed: model.seed,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Generated {} persons in {} families over {} zones in {}ms (seed {})\n{} students in {} schools, {} employed",
            self.persons,
            self.families,
            self.zones,
            self.generation_time_ms,
            self.seed,
            self.students,
            self.schools,
            self.employed,
        )
    }
}
