//! Category labels for the census cross-tabulations
//!
//! Count columns are named `"<value>"` for marginal tables and
//! `"<condition>.<value>"` for cross tables. The schema lists the labels of
//! every dimension and says which label carries which meaning.

use rand::Rng;
use serde::Deserialize;

use crate::core::error::{Result, SynthError};
use crate::core::types::MAX_AGE;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategorySchema {
    /// Household size categories, smallest first
    pub family_sizes: Vec<String>,
    /// The size category that stands for "this many or more"
    pub open_family_size: String,
    /// Relationship to the household head
    pub kinship_roles: Vec<String>,
    /// Single-year ages
    pub ages: Vec<String>,
    pub sexes: Vec<String>,
    pub female: String,
    /// School attendance categories
    pub attendance: Vec<String>,
    pub attending: String,
    /// Activity condition categories
    pub employment: Vec<String>,
    pub employed: String,
    /// Dwelling location categories
    pub urban_rural: Vec<String>,
    pub urban: String,
}

impl Default for CategorySchema {
    fn default() -> Self {
        Self {
            family_sizes: to_strings(&["1", "2", "3", "4", "5", "6", "7", "8 o más"]),
            open_family_size: "8 o más".into(),
            kinship_roles: to_strings(&[
                "Cónyuge o pareja",
                "Hijo(a) / Hijastro(a)",
                "Jefe(a)",
                "Nieto(a)",
                "Otros familiares",
                "Otros no familiares",
                "Padre / Madre / Suegro(a)",
                "Servicio doméstico y sus familiares",
                "Yerno / Nuera",
            ]),
            ages: (0..=MAX_AGE).map(|a| a.to_string()).collect(),
            sexes: to_strings(&["Mujer", "Varón"]),
            female: "Mujer".into(),
            attendance: to_strings(&["Asiste", "Asistió", "Nunca asistió"]),
            attending: "Asiste".into(),
            employment: to_strings(&["Desocupado", "Inactivo", "Ocupado"]),
            employed: "Ocupado".into(),
            urban_rural: to_strings(&["Rural agrupado", "Rural disperso", "Urbano"]),
            urban: "Urbano".into(),
        }
    }
}

fn to_strings(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

/// Resolved household size category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilySize {
    Exact(u32),
    /// Open-ended bucket, resolved uniformly in a configured range on use
    OpenEnded,
}

impl FamilySize {
    /// Number of members for one family of this size category
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R, open_min: u32, open_max: u32) -> u32 {
        match self {
            FamilySize::Exact(n) => *n,
            FamilySize::OpenEnded => rng.gen_range(open_min..open_max),
        }
    }
}

impl CategorySchema {
    pub fn family_size(&self, label: &str) -> Result<FamilySize> {
        if label == self.open_family_size {
            return Ok(FamilySize::OpenEnded);
        }
        label
            .trim()
            .parse::<u32>()
            .map(FamilySize::Exact)
            .map_err(|_| invalid(label, "family size"))
    }

    pub fn parse_age(&self, label: &str) -> Result<u8> {
        match label.trim().parse::<u8>() {
            Ok(age) if age <= MAX_AGE => Ok(age),
            _ => Err(invalid(label, "age")),
        }
    }

    pub fn max_age(&self) -> Result<u8> {
        let mut max = None;
        for label in &self.ages {
            let age = self.parse_age(label)?;
            max = Some(max.map_or(age, |m: u8| m.max(age)));
        }
        max.ok_or_else(|| SynthError::InvalidConfig("age category list is empty".into()))
    }

    pub fn role_index(&self, label: &str) -> Result<usize> {
        self.kinship_roles
            .iter()
            .position(|r| r == label)
            .ok_or_else(|| invalid(label, "kinship role"))
    }

    pub fn family_size_index(&self, label: &str) -> Result<usize> {
        self.family_sizes
            .iter()
            .position(|s| s == label)
            .ok_or_else(|| invalid(label, "family size"))
    }

    /// Check that every list is populated and that each semantic label is one
    /// of its dimension's labels
    pub fn validate(&self) -> Result<()> {
        let dimensions: [(&str, &Vec<String>); 7] = [
            ("family_sizes", &self.family_sizes),
            ("kinship_roles", &self.kinship_roles),
            ("ages", &self.ages),
            ("sexes", &self.sexes),
            ("attendance", &self.attendance),
            ("employment", &self.employment),
            ("urban_rural", &self.urban_rural),
        ];
        for (name, labels) in dimensions {
            if labels.is_empty() {
                return Err(SynthError::InvalidConfig(format!("category list '{}' is empty", name)));
            }
        }

        let semantics: [(&str, &String, &Vec<String>); 5] = [
            ("female", &self.female, &self.sexes),
            ("attending", &self.attending, &self.attendance),
            ("employed", &self.employed, &self.employment),
            ("urban", &self.urban, &self.urban_rural),
            ("open_family_size", &self.open_family_size, &self.family_sizes),
        ];
        for (name, label, labels) in semantics {
            if !labels.contains(label) {
                return Err(SynthError::InvalidConfig(format!(
                    "{} label '{}' is not one of {:?}",
                    name, label, labels
                )));
            }
        }

        for label in &self.family_sizes {
            self.family_size(label)?;
        }
        for label in &self.ages {
            self.parse_age(label)?;
        }
        Ok(())
    }
}

fn invalid(value: &str, context: &str) -> SynthError {
    SynthError::InvalidCategory {
        value: value.to_string(),
        context: context.to_string(),
    }
}

/// Column names of one condition value's row in a cross table
pub fn conditioned_columns(condition: &str, values: &[String]) -> Vec<String> {
    values.iter().map(|v| format!("{}.{}", condition, v)).collect()
}

/// Column names of a cross table, grouped by condition value
pub fn cross_columns(conditions: &[String], values: &[String]) -> Vec<Vec<String>> {
    conditions
        .iter()
        .map(|c| conditioned_columns(c, values))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_schema_is_valid() {
        let schema = CategorySchema::default();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.ages.len(), 111);
        assert_eq!(schema.max_age().unwrap(), 110);
    }

    #[test]
    fn test_cross_columns() {
        let cols = cross_columns(&to_strings(&["1", "2"]), &to_strings(&["Jefe(a)", "Nieto(a)"]));
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0], vec!["1.Jefe(a)", "1.Nieto(a)"]);
        assert_eq!(cols[1], vec!["2.Jefe(a)", "2.Nieto(a)"]);
    }

    #[test]
    fn test_open_family_size_resolves_in_range() {
        let schema = CategorySchema::default();
        let size = schema.family_size("8 o más").unwrap();
        assert_eq!(size, FamilySize::OpenEnded);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let n = size.resolve(&mut rng, 8, 16);
            assert!((8..16).contains(&n));
        }
        assert_eq!(schema.family_size("3").unwrap().resolve(&mut rng, 8, 16), 3);
    }

    #[test]
    fn test_semantic_label_must_exist() {
        let schema = CategorySchema {
            urban: "Ciudad".into(),
            ..Default::default()
        };
        assert!(matches!(schema.validate(), Err(SynthError::InvalidConfig(_))));
    }

    #[test]
    fn test_age_out_of_range_rejected() {
        let schema = CategorySchema::default();
        assert!(schema.parse_age("111").is_err());
        assert!(schema.parse_age("abc").is_err());
        assert_eq!(schema.parse_age("35").unwrap(), 35);
    }
}
