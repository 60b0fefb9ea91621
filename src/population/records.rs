//! Family and person records

use serde::{Deserialize, Serialize};

use crate::core::types::{AreaId, FamilyId, ProvinceId, SchoolId, Sex};

/// One sampled household
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Family {
    /// Index of the owning zone in the run's zone order
    pub zone: u32,
    pub area: AreaId,
    pub province: ProvinceId,
    pub urban: bool,
}

/// One person; the id is the position in the person list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub family: FamilyId,
    pub age: u8,
    pub sex: Sex,
    pub school: SchoolId,
    pub employed: bool,
}

impl Person {
    /// Member created before any attribute is drawn
    pub fn placeholder(family: FamilyId) -> Self {
        Self {
            family,
            age: 0,
            sex: Sex::Female,
            school: SchoolId::NONE,
            employed: false,
        }
    }
}

/// Fixed-width form of a family as written to the population file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyRecord {
    pub zone: u16,
    pub department: u16,
    pub province: u16,
}
