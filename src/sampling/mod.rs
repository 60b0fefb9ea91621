//! Sampling primitives: weighted categorical draws and capacity-bounded
//! group allocation

pub mod allocator;
pub mod categorical;

pub use allocator::{rounded_mean, CapacityCursor, SchoolIdSource, ZoneSchools};
pub use categorical::{SamplerError, WeightedCategoricalSampler};
