//! The generated population and its auxiliary tables

use ahash::AHashMap;
use std::hash::Hash;
use tracing::info;

use super::index_map::IdMap;
use super::records::{Family, FamilyRecord, Person};
use crate::core::config::GenerationConfig;
use crate::core::error::{Result, SynthError};
use crate::core::types::{AreaId, FamilyId, PersonId, ProvinceId};
use crate::geography::Zone;
use crate::spatial::density;

/// Root of everything a run produces
#[derive(Debug, Clone)]
pub struct PopulationModel {
    /// Selected zones in zone-index order
    pub zones: Vec<Zone>,
    pub families: Vec<Family>,
    pub persons: Vec<Person>,
    /// Self-excluding neighbor lists used for density
    pub nearest_zones: Vec<Vec<u32>>,
    pub nearest_densities: Vec<f64>,
    pub departments: IdMap<AreaId>,
    pub provinces: IdMap<ProvinceId>,
    pub department_densities: Vec<f64>,
    pub province_densities: Vec<f64>,
    pub schools: u32,
    pub seed: u64,
}

fn narrow_u16(field: &'static str, value: u32) -> Result<u16> {
    u16::try_from(value).map_err(|_| SynthError::FieldOverflow {
        field,
        value: value as u64,
    })
}

fn invalid(message: String) -> SynthError {
    SynthError::InvalidPopulation(message)
}

/// `Σ population / Σ surface` of the zones grouped by `key`, in key order
fn grouped_densities<K, F>(zones: &[Zone], keys: &[K], key: F) -> Vec<f64>
where
    K: Hash + Eq,
    F: Fn(&Zone) -> K,
{
    let mut totals: AHashMap<K, (f64, f64)> = AHashMap::new();
    for zone in zones {
        let entry = totals.entry(key(zone)).or_insert((0.0, 0.0));
        entry.0 += zone.population;
        entry.1 += zone.surface;
    }
    keys.iter()
        .map(|k| totals.get(k).map_or(0.0, |&(pop, surface)| density(pop, surface)))
        .collect()
}

impl PopulationModel {
    pub fn new(zones: Vec<Zone>, seed: u64) -> Self {
        Self {
            zones,
            families: Vec::new(),
            persons: Vec::new(),
            nearest_zones: Vec::new(),
            nearest_densities: Vec::new(),
            departments: IdMap::new(),
            provinces: IdMap::new(),
            department_densities: Vec::new(),
            province_densities: Vec::new(),
            schools: 0,
            seed,
        }
    }

    pub fn push_family(&mut self, family: Family) -> FamilyId {
        let id = FamilyId(self.families.len() as u32);
        self.families.push(family);
        id
    }

    pub fn push_person(&mut self, person: Person) -> PersonId {
        let id = PersonId(self.persons.len() as u32);
        self.persons.push(person);
        id
    }

    pub fn students(&self) -> usize {
        self.persons.iter().filter(|p| p.school.is_enrolled()).count()
    }

    pub fn employed(&self) -> usize {
        self.persons.iter().filter(|p| p.employed).count()
    }

    /// Build department/province indices from the families and the grouped
    /// densities that go with them
    pub fn finalize(&mut self) {
        let mut departments = IdMap::new();
        let mut provinces = IdMap::new();
        for family in &self.families {
            departments.id_of(&family.area);
            provinces.id_of(&family.province);
        }

        self.department_densities = grouped_densities(&self.zones, departments.keys(), |z| z.area_id);
        self.province_densities = grouped_densities(&self.zones, provinces.keys(), |z| z.province_id);
        self.departments = departments;
        self.provinces = provinces;

        info!(
            departments = self.departments.len(),
            provinces = self.provinces.len(),
            "Finalized index maps"
        );
    }

    /// Families in output form; every index must fit 16 bits
    pub fn family_records(&self) -> Result<Vec<FamilyRecord>> {
        self.families
            .iter()
            .map(|f| {
                let department = self
                    .departments
                    .get(&f.area)
                    .ok_or_else(|| invalid(format!("area {} has no department index", f.area)))?;
                let province = self
                    .provinces
                    .get(&f.province)
                    .ok_or_else(|| invalid(format!("province {} has no index", f.province)))?;
                Ok(FamilyRecord {
                    zone: narrow_u16("zone", f.zone)?,
                    department: narrow_u16("department", department)?,
                    province: narrow_u16("province", province)?,
                })
            })
            .collect()
    }

    /// Check the structural invariants of a finished run
    pub fn validate(&self, config: &GenerationConfig) -> Result<()> {
        let max_age = config.categories.max_age()?;

        for (i, family) in self.families.iter().enumerate() {
            if family.zone as usize >= self.zones.len() {
                return Err(invalid(format!("family {} points at zone {} of {}", i, family.zone, self.zones.len())));
            }
            if self.departments.get(&family.area).is_none() || self.provinces.get(&family.province).is_none() {
                return Err(invalid(format!("family {} has unindexed parents", i)));
            }
        }

        let mut last_family = 0;
        for (i, person) in self.persons.iter().enumerate() {
            let family = person.family.0;
            if family as usize >= self.families.len() {
                return Err(invalid(format!("person {} points at family {} of {}", i, family, self.families.len())));
            }
            if family < last_family {
                return Err(invalid(format!("person {} belongs to family {} created after a later member", i, family)));
            }
            last_family = family;

            if person.age > max_age {
                return Err(invalid(format!("person {} is {} years old", i, person.age)));
            }
            if person.school.is_enrolled() && person.age < config.min_school_age {
                return Err(invalid(format!("person {} is enrolled at age {}", i, person.age)));
            }
            if person.employed && person.age < config.min_working_age {
                return Err(invalid(format!("person {} is employed at age {}", i, person.age)));
            }
        }
        Ok(())
    }
}
