//! Generation configuration with documented constants
//!
//! Every tunable used by the generator is collected here. Defaults reproduce
//! the reference run over the 2010 census tables.

use serde::Deserialize;
use std::path::Path;

use crate::census::categories::CategorySchema;
use crate::core::error::{Result, SynthError};
use crate::spatial::projection::Projection;

/// Configuration for a population generation run
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Seed for the run's random source
    ///
    /// When unset a seed is drawn from the OS and logged, so any run can be
    /// replayed after the fact.
    pub seed: Option<u64>,

    /// Restrict generation to the zones of a single province
    pub province: Option<u32>,

    /// Fraction of zones kept, sampled without replacement (0, 1]
    pub zone_fraction: f64,

    // === SPATIAL ===
    /// Bound for the self-excluding neighbor pass used for local density
    pub density_radius: f64,

    /// Bound for the self-inclusive neighbor pass used for school catchment
    ///
    /// A person's school is hosted by a zone drawn uniformly from this list.
    pub school_radius: f64,

    /// Maximum number of neighbors returned per zone in either pass
    pub max_neighbors: usize,

    /// How input coordinates are turned into planar metres
    pub projection: Projection,

    // === ELIGIBILITY ===
    /// Attendance is only sampled at or above this age
    pub min_school_age: u8,

    /// Employment is only sampled at or above this age
    pub min_working_age: u8,

    // === SCHOOLS ===
    /// Mean school size used when an area's enrollment mean is not a number
    pub default_school_capacity: i64,

    // === FAMILIES ===
    /// Smallest size an open-ended family size category resolves to
    pub large_family_min: u32,

    /// Exclusive upper bound for open-ended family sizes
    pub large_family_max: u32,

    // === SAMPLING ===
    /// Minimum number of draws buffered per sampler refill
    pub sampler_min_buffer: usize,

    // === REPORTING ===
    /// Zones processed between progress lines
    pub progress_interval: usize,

    /// Category labels and their meaning
    pub categories: CategorySchema,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            province: None,
            zone_fraction: 1.0,

            density_radius: 1000.0,
            school_radius: 5000.0,
            max_neighbors: 1200,
            projection: Projection::Planar,

            min_school_age: 3,
            min_working_age: 14,

            default_school_capacity: 100,

            large_family_min: 8,
            large_family_max: 16,

            sampler_min_buffer: 100,

            progress_interval: 1000,

            categories: CategorySchema::default(),
        }
    }
}

impl GenerationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; missing fields keep their defaults
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: GenerationConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.zone_fraction > 0.0 && self.zone_fraction <= 1.0) {
            return Err(SynthError::InvalidConfig(format!(
                "zone_fraction ({}) must be in (0, 1]",
                self.zone_fraction
            )));
        }

        if !(self.density_radius > 0.0) || !(self.school_radius > 0.0) {
            return Err(SynthError::InvalidConfig(format!(
                "neighbor radii must be positive (density {}, school {})",
                self.density_radius, self.school_radius
            )));
        }

        if self.max_neighbors == 0 {
            return Err(SynthError::InvalidConfig("max_neighbors must be at least 1".into()));
        }

        if self.large_family_min >= self.large_family_max {
            return Err(SynthError::InvalidConfig(format!(
                "large family range [{}, {}) is empty",
                self.large_family_min, self.large_family_max
            )));
        }

        if self.sampler_min_buffer == 0 {
            return Err(SynthError::InvalidConfig("sampler_min_buffer must be at least 1".into()));
        }

        let max_age = self.categories.max_age()?;
        if self.min_school_age > max_age || self.min_working_age > max_age {
            return Err(SynthError::InvalidConfig(format!(
                "eligibility ages (school {}, work {}) exceed the oldest age category ({})",
                self.min_school_age, self.min_working_age, max_age
            )));
        }

        self.categories.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_school_age, 3);
        assert_eq!(config.min_working_age, 14);
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let config = GenerationConfig::parse_toml(
            r#"
            seed = 42
            province = 82
            school_radius = 2500.0
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.province, Some(82));
        assert_eq!(config.school_radius, 2500.0);
        assert_eq!(config.density_radius, 1000.0);
        assert_eq!(config.max_neighbors, 1200);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(GenerationConfig::parse_toml("school_radios = 10.0").is_err());
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let config = GenerationConfig { zone_fraction: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(SynthError::InvalidConfig(_))));

        let config = GenerationConfig { zone_fraction: 1.5, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_large_family_range_rejected() {
        let config = GenerationConfig {
            large_family_min: 16,
            large_family_max: 16,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_radius_rejected() {
        let config = GenerationConfig { density_radius: f64::NAN, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
