//! Hierarchical population generation

pub mod generator;

pub use generator::{generate, HierarchicalPopulationGenerator};
