//! Zone-by-zone hierarchical sampling
//!
//! Per zone, in order:
//! 1. urban/rural flag and size category for each household
//! 2. one family per household, then kinship roles for its members
//! 3. age and sex, batched per role across the zone
//! 4. attendance and employment, batched per age, above the eligibility ages
//! 5. a school for every attending person, hosted by a zone drawn from the
//!    catchment list
//!
//! School cursors are shared across zones, so zones are processed
//! sequentially. Samplers are built up front in parallel.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::census::distributions::{require, DistributionSet};
use crate::census::{CensusTable, FamilySize};
use crate::core::config::GenerationConfig;
use crate::core::error::Result;
use crate::core::types::{AreaId, PersonId, ProvinceId, SchoolId};
use crate::geography::{select_zones, ZoneTable};
use crate::population::{Family, Person, PopulationModel};
use crate::sampling::{CapacityCursor, SchoolIdSource, ZoneSchools};
use crate::spatial::{neighbor_densities, NeighborMode, SpatialNeighborIndex};

/// Owns every piece of mutable state of a run
pub struct HierarchicalPopulationGenerator<'a> {
    config: &'a GenerationConfig,
    distributions: DistributionSet,
    sizes: Vec<FamilySize>,
    /// Self-inclusive catchment list per zone
    school_zones: Vec<Vec<u32>>,
    cursors: Vec<ZoneSchools>,
    school_ids: SchoolIdSource,
    rng: ChaCha8Rng,
    model: PopulationModel,
}

impl<'a> HierarchicalPopulationGenerator<'a> {
    /// Select zones, build samplers and neighbor tables, and validate that
    /// every reachable draw is possible
    pub fn new(census: &CensusTable, zones: &ZoneTable, config: &'a GenerationConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, "Seeding random source");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let selected = select_zones(
            zones.zones(),
            config.province.map(ProvinceId),
            config.zone_fraction,
            &mut rng,
        );

        let used: Vec<AreaId> = selected
            .iter()
            .map(|z| z.area_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let distributions = DistributionSet::build(census, &used, config)?;
        distributions.validate_reachability(
            selected
                .iter()
                .filter(|z| z.households > 0)
                .map(|z| z.area_id)
                .collect::<BTreeSet<_>>(),
            config,
        )?;

        let raw: Vec<_> = selected.iter().map(|z| z.centroid).collect();
        let index = SpatialNeighborIndex::new(config.projection.project(&raw));

        let nearest_zones = index.query(config.density_radius, config.max_neighbors, NeighborMode::ExcludeSelf);
        let population: Vec<f64> = selected.iter().map(|z| z.population).collect();
        let surface: Vec<f64> = selected.iter().map(|z| z.surface).collect();
        let nearest_densities = neighbor_densities(&nearest_zones, &population, &surface);

        let school_zones = index.query(config.school_radius, config.max_neighbors, NeighborMode::IncludeSelf);
        info!(
            zones = selected.len(),
            mean_density_neighbors = mean_len(&nearest_zones),
            mean_school_neighbors = mean_len(&school_zones),
            "Neighbor tables built"
        );

        let cursors = selected
            .iter()
            .map(|z| {
                let dist = distributions.get(z.area_id)?;
                Ok(ZoneSchools {
                    urban: CapacityCursor::new(dist.school_urban),
                    rural: CapacityCursor::new(dist.school_rural),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut model = PopulationModel::new(selected, seed);
        model.nearest_zones = nearest_zones;
        model.nearest_densities = nearest_densities;

        Ok(Self {
            config,
            sizes: distributions.family_sizes().to_vec(),
            distributions,
            school_zones,
            cursors,
            school_ids: SchoolIdSource::new(),
            rng,
            model,
        })
    }

    pub fn seed(&self) -> u64 {
        self.model.seed
    }

    /// Generate every zone, then finalize and validate the model
    pub fn run(mut self) -> Result<PopulationModel> {
        let start = Instant::now();
        let total = self.model.zones.len();
        let interval = self.config.progress_interval.max(1);

        for zone in 0..total {
            self.generate_zone(zone)?;
            if (zone + 1) % interval == 0 {
                info!(
                    zones = zone + 1,
                    total,
                    families = self.model.families.len(),
                    persons = self.model.persons.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Progress"
                );
            }
        }

        self.model.schools = self.school_ids.issued();
        self.model.finalize();
        self.model.validate(self.config)?;

        info!(
            families = self.model.families.len(),
            persons = self.model.persons.len(),
            schools = self.model.schools,
            "Population generated"
        );
        Ok(self.model)
    }

    fn generate_zone(&mut self, z: usize) -> Result<()> {
        let Self {
            config,
            distributions,
            sizes,
            school_zones,
            cursors,
            school_ids,
            rng,
            model,
        } = self;

        let zone = &model.zones[z];
        let (area, province, households) = (zone.area_id, zone.province_id, zone.households as usize);
        if households == 0 {
            return Ok(());
        }
        let dist = distributions.get_mut(area)?;
        let schema = &config.categories;

        // 1. household sizing
        let urban = require(&mut dist.urban_rural, area, || "urban/rural".into())?.draw(households, rng);
        let size_idx = require(&mut dist.family_size, area, || "family size".into())?.draw(households, rng);

        // 2. families and placeholder members, grouped by role
        let mut by_role: Vec<Vec<PersonId>> = vec![Vec::new(); schema.kinship_roles.len()];
        for (&s, &is_urban) in size_idx.iter().zip(&urban) {
            let members = sizes[s].resolve(rng, config.large_family_min, config.large_family_max);
            let family = model.push_family(Family {
                zone: z as u32,
                area,
                province,
                urban: is_urban,
            });
            let roles = require(&mut dist.roles_by_size[s], area, || {
                format!("kinship role | size {}", schema.family_sizes[s])
            })?
            .draw(members as usize, rng);
            for role in roles {
                by_role[role].push(model.push_person(Person::placeholder(family)));
            }
        }

        // 3. age and sex per role, regrouped by age
        let mut by_age: Vec<Vec<PersonId>> = vec![Vec::new(); dist.attendance_by_age.len()];
        for (role, members) in by_role.iter().enumerate().filter(|(_, m)| !m.is_empty()) {
            let label = &schema.kinship_roles[role];
            let ages = require(&mut dist.age_by_role[role], area, || format!("age | role {}", label))?
                .draw(members.len(), rng);
            let sexes = require(&mut dist.sex_by_role[role], area, || format!("sex | role {}", label))?
                .draw(members.len(), rng);
            for ((&pid, &age), &sex) in members.iter().zip(&ages).zip(&sexes) {
                let person = &mut model.persons[pid.0 as usize];
                person.age = age;
                person.sex = sex;
                by_age[age as usize].push(pid);
            }
        }

        // 4-5. attendance with school placement, then employment
        for (age, members) in by_age.iter().enumerate().filter(|(_, m)| !m.is_empty()) {
            if age >= config.min_school_age as usize {
                let attending = require(&mut dist.attendance_by_age[age], area, || {
                    format!("school attendance | age {}", age)
                })?
                .draw(members.len(), rng);
                for (&pid, &attends) in members.iter().zip(&attending) {
                    if !attends {
                        continue;
                    }
                    let family = model.persons[pid.0 as usize].family;
                    let is_urban = model.families[family.0 as usize].urban;
                    let host = school_zones[z].choose(rng).copied().unwrap_or(z as u32);
                    let school = cursors[host as usize].cursor_mut(is_urban).assign(school_ids);
                    model.persons[pid.0 as usize].school = SchoolId(school);
                }
            }
            if age >= config.min_working_age as usize {
                let employed = require(&mut dist.employment_by_age[age], area, || {
                    format!("employment | age {}", age)
                })?
                .draw(members.len(), rng);
                for (&pid, &works) in members.iter().zip(&employed) {
                    model.persons[pid.0 as usize].employed = works;
                }
            }
        }

        debug!(
            zone = z,
            area = %area,
            households,
            persons = by_role.iter().map(Vec::len).sum::<usize>(),
            "Zone generated"
        );
        Ok(())
    }
}

fn mean_len(lists: &[Vec<u32>]) -> f64 {
    if lists.is_empty() {
        return 0.0;
    }
    lists.iter().map(Vec::len).sum::<usize>() as f64 / lists.len() as f64
}

/// Generate a population from joined census tables and a zone table
pub fn generate(census: &CensusTable, zones: &ZoneTable, config: &GenerationConfig) -> Result<PopulationModel> {
    HierarchicalPopulationGenerator::new(census, zones, config)?.run()
}
