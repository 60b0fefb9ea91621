//! Synthpop - synthetic populations from census aggregates
//!
//! Families and persons are sampled zone by zone from per-area conditional
//! census tables, with schools allocated under capacity and density read off
//! nearest-zone tables.

pub mod census;
pub mod core;
pub mod generation;
pub mod geography;
pub mod population;
pub mod sampling;
pub mod spatial;
