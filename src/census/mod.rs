//! Census aggregates: category labels, joined count tables and the per-area
//! samplers built from them

pub mod categories;
pub mod distributions;
pub mod labels;
pub mod table;

pub use categories::{CategorySchema, FamilySize};
pub use distributions::{AreaDistributions, DistributionSet};
pub use table::{Area, CensusDocument, CensusTable};
