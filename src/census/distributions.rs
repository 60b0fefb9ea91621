//! Per-area conditional distributions
//!
//! Each used area gets one sampler per (table, condition value) pair. A
//! conditional sampler whose counts are all zero is stored as `None`; whether
//! that matters is decided by `validate_reachability`, which only complains
//! about draws the generator can actually make.

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::census::categories::{conditioned_columns, cross_columns, FamilySize};
use crate::census::table::{Area, CensusTable};
use crate::core::config::GenerationConfig;
use crate::core::error::{Result, SynthError};
use crate::core::types::{AreaId, Sex};
use crate::sampling::allocator::rounded_mean;
use crate::sampling::categorical::{SamplerError, WeightedCategoricalSampler};

type Sampler<T> = WeightedCategoricalSampler<T>;

/// Every sampler the generator needs for one area
#[derive(Debug, Clone)]
pub struct AreaDistributions {
    pub area: AreaId,
    /// Draws an index into the schema's family sizes
    pub family_size: Option<Sampler<usize>>,
    /// Draws `true` for urban households
    pub urban_rural: Option<Sampler<bool>>,
    /// Role index draws, by family size index
    pub roles_by_size: Vec<Option<Sampler<usize>>>,
    /// By role index
    pub age_by_role: Vec<Option<Sampler<u8>>>,
    pub sex_by_role: Vec<Option<Sampler<Sex>>>,
    /// Draws `true` for "attending", indexed by age
    pub attendance_by_age: Vec<Option<Sampler<bool>>>,
    /// Draws `true` for "employed", indexed by age
    pub employment_by_age: Vec<Option<Sampler<bool>>>,
    /// Rounded mean enrollment of an urban school
    pub school_urban: i64,
    pub school_rural: i64,
}

/// Build a sampler from full column names, mapping each stripped value
///
/// All-zero counts give `None`; a missing column is fatal.
fn conditional<T, F>(area: &Area, columns: &[String], min_buffer: usize, f: F) -> Result<Option<Sampler<T>>>
where
    F: FnMut(String) -> Result<T>,
{
    let weights = area.weights(columns)?;
    match Sampler::new(columns, &weights) {
        Ok(sampler) => Ok(Some(sampler.with_min_buffer(min_buffer).map_values(f)?)),
        Err(SamplerError::AllWeightsZero) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn school_mean(area: AreaId, kind: &str, raw: Option<f64>, fallback: i64) -> i64 {
    // TODO: trace why some provinces come through the enrollment join without a mean
    rounded_mean(raw).unwrap_or_else(|| {
        warn!(
            area = %area,
            kind,
            raw = ?raw,
            fallback,
            "School enrollment mean is not a number, using fallback capacity"
        );
        fallback
    })
}

fn zero_weights(area: AreaId, distribution: String) -> SynthError {
    SynthError::ZeroWeights { area, distribution }
}

impl AreaDistributions {
    pub fn build(area: &Area, config: &GenerationConfig) -> Result<Self> {
        let schema = &config.categories;
        let buffer = config.sampler_min_buffer;
        let max_age = schema.max_age()?;

        let family_size = conditional(area, &schema.family_sizes, buffer, |v| {
            schema.family_size_index(&v)
        })?;
        let urban_rural = conditional(area, &schema.urban_rural, buffer, |v| Ok(v == schema.urban))?;

        let roles_by_size = cross_columns(&schema.family_sizes, &schema.kinship_roles)
            .iter()
            .map(|cols| conditional(area, cols, buffer, |v| schema.role_index(&v)))
            .collect::<Result<Vec<_>>>()?;

        let age_by_role = cross_columns(&schema.kinship_roles, &schema.ages)
            .iter()
            .map(|cols| conditional(area, cols, buffer, |v| schema.parse_age(&v)))
            .collect::<Result<Vec<_>>>()?;

        let sex_by_role = cross_columns(&schema.kinship_roles, &schema.sexes)
            .iter()
            .map(|cols| {
                conditional(area, cols, buffer, |v| {
                    Ok(if v == schema.female { Sex::Female } else { Sex::Male })
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut attendance_by_age = vec![None; max_age as usize + 1];
        let mut employment_by_age = vec![None; max_age as usize + 1];
        for label in &schema.ages {
            let age = schema.parse_age(label)?;
            if age >= config.min_school_age {
                let cols = conditioned_columns(label, &schema.attendance);
                attendance_by_age[age as usize] =
                    conditional(area, &cols, buffer, |v| Ok(v == schema.attending))?;
            }
            if age >= config.min_working_age {
                let cols = conditioned_columns(label, &schema.employment);
                employment_by_age[age as usize] =
                    conditional(area, &cols, buffer, |v| Ok(v == schema.employed))?;
            }
        }

        let fallback = config.default_school_capacity;
        Ok(Self {
            area: area.id,
            family_size,
            urban_rural,
            roles_by_size,
            age_by_role,
            sex_by_role,
            attendance_by_age,
            employment_by_age,
            school_urban: school_mean(area.id, "urban", area.school_urban, fallback),
            school_rural: school_mean(area.id, "rural", area.school_rural, fallback),
        })
    }

    /// Check that every draw reachable from this area's household tables has
    /// a sampler with positive total weight
    pub fn validate_reachability(&self, config: &GenerationConfig) -> Result<()> {
        let schema = &config.categories;
        let family_size = self
            .family_size
            .as_ref()
            .ok_or_else(|| zero_weights(self.area, "family size".into()))?;
        if self.urban_rural.is_none() {
            return Err(zero_weights(self.area, "urban/rural".into()));
        }

        let mut roles = vec![false; schema.kinship_roles.len()];
        for (size_idx, &w) in family_size.weights().iter().enumerate() {
            if w == 0 {
                continue;
            }
            let sampler = self.roles_by_size[size_idx].as_ref().ok_or_else(|| {
                zero_weights(self.area, format!("kinship role | size {}", schema.family_sizes[size_idx]))
            })?;
            for (&role, &rw) in sampler.values().iter().zip(sampler.weights()) {
                if rw > 0 {
                    roles[role] = true;
                }
            }
        }

        let mut ages = vec![false; self.attendance_by_age.len()];
        for role in (0..roles.len()).filter(|&r| roles[r]) {
            let label = &schema.kinship_roles[role];
            let age = self.age_by_role[role]
                .as_ref()
                .ok_or_else(|| zero_weights(self.area, format!("age | role {}", label)))?;
            if self.sex_by_role[role].is_none() {
                return Err(zero_weights(self.area, format!("sex | role {}", label)));
            }
            for (&a, &aw) in age.values().iter().zip(age.weights()) {
                if aw > 0 {
                    ages[a as usize] = true;
                }
            }
        }

        for age in (0..ages.len()).filter(|&a| ages[a]) {
            if age >= config.min_school_age as usize && self.attendance_by_age[age].is_none() {
                return Err(zero_weights(self.area, format!("school attendance | age {}", age)));
            }
            if age >= config.min_working_age as usize && self.employment_by_age[age].is_none() {
                return Err(zero_weights(self.area, format!("employment | age {}", age)));
            }
        }
        Ok(())
    }
}

/// Distributions of every area a run touches
#[derive(Debug, Clone)]
pub struct DistributionSet {
    sizes: Vec<FamilySize>,
    by_area: BTreeMap<AreaId, AreaDistributions>,
}

impl DistributionSet {
    /// Build the samplers of `used` areas in parallel
    pub fn build(census: &CensusTable, used: &[AreaId], config: &GenerationConfig) -> Result<Self> {
        census.check_coverage(used.iter().copied())?;

        let sizes = config
            .categories
            .family_sizes
            .iter()
            .map(|label| config.categories.family_size(label))
            .collect::<Result<Vec<_>>>()?;

        let unique: Vec<AreaId> = used.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let built = unique
            .par_iter()
            .filter_map(|id| census.get(*id))
            .map(|area| AreaDistributions::build(area, config))
            .collect::<Result<Vec<_>>>()?;

        let by_area: BTreeMap<AreaId, AreaDistributions> =
            built.into_iter().map(|d| (d.area, d)).collect();
        info!(areas = by_area.len(), "Built area distributions");

        Ok(Self { sizes, by_area })
    }

    /// Reachability check over the areas whose zones hold at least one household
    pub fn validate_reachability(
        &self,
        with_households: impl IntoIterator<Item = AreaId>,
        config: &GenerationConfig,
    ) -> Result<()> {
        for id in with_households {
            let dist = self.get(id)?;
            dist.validate_reachability(config)?;
            debug!(area = %id, "Distributions reachable");
        }
        Ok(())
    }

    pub fn family_sizes(&self) -> &[FamilySize] {
        &self.sizes
    }

    pub fn get(&self, id: AreaId) -> Result<&AreaDistributions> {
        self.by_area
            .get(&id)
            .ok_or_else(|| SynthError::MissingAreas(vec![id]))
    }

    pub fn get_mut(&mut self, id: AreaId) -> Result<&mut AreaDistributions> {
        self.by_area
            .get_mut(&id)
            .ok_or_else(|| SynthError::MissingAreas(vec![id]))
    }

    pub fn len(&self) -> usize {
        self.by_area.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_area.is_empty()
    }
}

/// Take a sampler the reachability pass has vouched for
pub fn require<'a, T>(
    sampler: &'a mut Option<Sampler<T>>,
    area: AreaId,
    what: impl FnOnce() -> String,
) -> Result<&'a mut Sampler<T>> {
    sampler.as_mut().ok_or_else(|| zero_weights(area, what()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::categories::CategorySchema;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn small_config() -> GenerationConfig {
        GenerationConfig {
            categories: CategorySchema {
                family_sizes: strings(&["1", "2"]),
                open_family_size: "2".into(),
                kinship_roles: strings(&["Jefe(a)", "Hijo(a)"]),
                ages: strings(&["0", "5", "20"]),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Every column present; heads are 20, children 0 or 5
    fn full_area(id: u32) -> Area {
        let mut area = Area::new(AreaId(id)).with_school_means(Some(30.4), None);
        for (c, n) in [("1", 4), ("2", 6), ("Rural agrupado", 1), ("Rural disperso", 0), ("Urbano", 9)] {
            area.set_count(c, n);
        }
        for (c, n) in [
            ("1.Jefe(a)", 5),
            ("1.Hijo(a)", 0),
            ("2.Jefe(a)", 3),
            ("2.Hijo(a)", 3),
            ("Jefe(a).0", 0),
            ("Jefe(a).5", 0),
            ("Jefe(a).20", 8),
            ("Hijo(a).0", 2),
            ("Hijo(a).5", 2),
            ("Hijo(a).20", 0),
            ("Jefe(a).Mujer", 1),
            ("Jefe(a).Varón", 1),
            ("Hijo(a).Mujer", 1),
            ("Hijo(a).Varón", 0),
        ] {
            area.set_count(c, n);
        }
        for age in ["5", "20"] {
            for (v, n) in [("Asiste", 2), ("Asistió", 1), ("Nunca asistió", 0)] {
                area.set_count(format!("{}.{}", age, v), n);
            }
        }
        for (v, n) in [("Desocupado", 1), ("Inactivo", 1), ("Ocupado", 3)] {
            area.set_count(format!("20.{}", v), n);
        }
        area
    }

    #[test]
    fn test_build_maps_values() {
        let config = small_config();
        let dist = AreaDistributions::build(&full_area(1), &config).unwrap();

        assert_eq!(dist.family_size.as_ref().unwrap().values(), &[0, 1]);
        assert_eq!(dist.urban_rural.as_ref().unwrap().values(), &[false, false, true]);
        assert_eq!(dist.age_by_role[0].as_ref().unwrap().values(), &[0, 5, 20]);
        assert_eq!(dist.sex_by_role[1].as_ref().unwrap().values(), &[Sex::Female, Sex::Male]);
        // below working age there is no employment table at all
        assert!(dist.employment_by_age[5].is_none());
        assert!(dist.attendance_by_age[0].is_none());
        assert!(dist.attendance_by_age[5].is_some());
    }

    #[test]
    fn test_school_means_rounded_with_fallback() {
        let config = small_config();
        let dist = AreaDistributions::build(&full_area(1), &config).unwrap();
        assert_eq!(dist.school_rural, 30);
        assert_eq!(dist.school_urban, config.default_school_capacity);
    }

    #[test]
    fn test_unreachable_zero_table_is_fine() {
        let config = small_config();
        let dist = AreaDistributions::build(&full_area(1), &config).unwrap();
        // age 20 for children has zero weight, size "1" never draws a child
        assert!(dist.validate_reachability(&config).is_ok());
    }

    #[test]
    fn test_reachable_zero_table_is_fatal() {
        let config = small_config();
        let mut area = full_area(2);
        area.set_count("20.Desocupado", 0);
        area.set_count("20.Inactivo", 0);
        area.set_count("20.Ocupado", 0);
        let dist = AreaDistributions::build(&area, &config).unwrap();
        let err = dist.validate_reachability(&config).unwrap_err();
        assert!(matches!(err, SynthError::ZeroWeights { area: AreaId(2), .. }));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let config = small_config();
        let mut area = Area::new(AreaId(3));
        area.set_count("1", 1);
        let err = AreaDistributions::build(&area, &config).unwrap_err();
        assert!(matches!(err, SynthError::MissingColumn { area: AreaId(3), .. }));
    }

    #[test]
    fn test_set_requires_coverage() {
        let config = small_config();
        let census = CensusTable::from_areas(vec![full_area(1)]);
        let err = DistributionSet::build(&census, &[AreaId(1), AreaId(8)], &config).unwrap_err();
        assert!(matches!(err, SynthError::MissingAreas(ids) if ids == vec![AreaId(8)]));

        let set = DistributionSet::build(&census, &[AreaId(1)], &config).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.family_sizes(), &[FamilySize::Exact(1), FamilySize::OpenEnded]);
    }
}
