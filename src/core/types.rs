//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Census aggregation unit identifier (administrative department)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaId(pub u32);

/// Province identifier as it appears in the zone table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProvinceId(pub u32);

/// Family identifier (index into the family list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FamilyId(pub u32);

/// Person identifier (index into the person list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u32);

/// School identifier shared by co-enrolled persons
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SchoolId(pub u32);

impl SchoolId {
    /// Not enrolled
    pub const NONE: SchoolId = SchoolId(0);

    pub fn is_enrolled(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for AreaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ProvinceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Binary sex as tabulated by the census
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    Female,
    Male,
}

impl Sex {
    pub fn is_female(&self) -> bool {
        matches!(self, Sex::Female)
    }
}

/// Oldest age the census tables report
pub const MAX_AGE: u8 = 110;
