//! Spatial structures over zone centroids
//!
//! Contains:
//! - Sparse hash grid for bounded range queries
//! - Nearest-zone lists and neighbor densities
//! - Projection of input coordinates into metres

pub mod neighbors;
pub mod projection;
pub mod sparse_hash;

pub use neighbors::{density, neighbor_densities, NeighborMode, SpatialNeighborIndex};
pub use projection::Projection;
pub use sparse_hash::SparseHashGrid;
