//! Bounded nearest-zone lists over projected centroids

use geo::{EuclideanDistance, Point};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use super::sparse_hash::SparseHashGrid;

/// Distances at or below this count as the zone itself
const SELF_DISTANCE: f64 = 1e-9;

/// Whether a zone appears in its own neighbor list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborMode {
    /// `0 < distance < bound`, used for density estimation
    ExcludeSelf,
    /// `distance < bound`, used for school catchment
    IncludeSelf,
}

/// Range index over zone centroids in planar metres
pub struct SpatialNeighborIndex {
    centroids: Vec<Point<f64>>,
}

impl SpatialNeighborIndex {
    pub fn new(centroids: Vec<Point<f64>>) -> Self {
        Self { centroids }
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// For every zone, up to `max_count` nearest zones closer than `bound`,
    /// nearest first with ties broken by index
    ///
    /// The zone itself counts toward `max_count` before it is dropped in
    /// `ExcludeSelf` mode, as do other zones sharing its exact location.
    pub fn query(&self, bound: f64, max_count: usize, mode: NeighborMode) -> Vec<Vec<u32>> {
        let mut grid = SparseHashGrid::new(bound);
        grid.rebuild(
            self.centroids
                .iter()
                .enumerate()
                .map(|(i, &p)| (i as u32, p)),
        );

        self.centroids
            .par_iter()
            .map(|center| {
                let mut hits: Vec<(OrderedFloat<f64>, u32)> = grid
                    .query_neighbors(*center)
                    .filter_map(|j| {
                        let d = center.euclidean_distance(&self.centroids[j as usize]);
                        (d < bound).then_some((OrderedFloat(d), j))
                    })
                    .collect();
                hits.sort_unstable();
                hits.truncate(max_count);
                hits.into_iter()
                    .filter(|(d, _)| mode == NeighborMode::IncludeSelf || d.0 > SELF_DISTANCE)
                    .map(|(_, j)| j)
                    .collect()
            })
            .collect()
    }
}

/// Population over surface, zero for an empty surface
pub fn density(population: f64, area: f64) -> f64 {
    if area > 0.0 {
        population / area
    } else {
        0.0
    }
}

/// Per-zone density over each zone's neighbor list
///
/// A zone with no neighbors falls back to its own density.
pub fn neighbor_densities(neighbors: &[Vec<u32>], population: &[f64], area: &[f64]) -> Vec<f64> {
    neighbors
        .iter()
        .enumerate()
        .map(|(i, list)| {
            if list.is_empty() {
                return density(population[i], area[i]);
            }
            let (pop, surface) = list.iter().fold((0.0, 0.0), |(p, a), &j| {
                (p + population[j as usize], a + area[j as usize])
            });
            density(pop, surface)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colinear() -> SpatialNeighborIndex {
        SpatialNeighborIndex::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(30.0, 0.0),
        ])
    }

    #[test]
    fn test_colinear_exclude_self() {
        let lists = colinear().query(15.0, 10, NeighborMode::ExcludeSelf);
        assert_eq!(lists, vec![vec![1], vec![0], vec![]]);
    }

    #[test]
    fn test_colinear_include_self() {
        let lists = colinear().query(15.0, 10, NeighborMode::IncludeSelf);
        assert_eq!(lists, vec![vec![0, 1], vec![1, 0], vec![2]]);
    }

    #[test]
    fn test_sorted_by_distance_and_capped() {
        let index = SpatialNeighborIndex::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(-1.0, 0.0),
            Point::new(0.0, 2.0),
            Point::new(0.0, -2.0),
        ]);
        let lists = index.query(100.0, 4, NeighborMode::ExcludeSelf);
        // self, then 2 at d=1, then 3 and 4 tie at d=2; the cap of 4 drops 1
        assert_eq!(lists[0], vec![2, 3, 4]);

        let lists = index.query(100.0, 4, NeighborMode::IncludeSelf);
        assert_eq!(lists[0], vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_bound_is_strict() {
        let index = SpatialNeighborIndex::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
        let lists = index.query(5.0, 10, NeighborMode::ExcludeSelf);
        assert_eq!(lists, vec![Vec::<u32>::new(), vec![]]);
    }

    #[test]
    fn test_neighbor_densities() {
        let neighbors = vec![vec![1, 2], vec![], vec![0]];
        let population = [100.0, 50.0, 150.0];
        let area = [1.0, 2.0, 0.0];
        let densities = neighbor_densities(&neighbors, &population, &area);
        assert_eq!(densities, vec![100.0, 25.0, 100.0]);
    }

    #[test]
    fn test_density_of_empty_surface_is_zero() {
        assert_eq!(density(10.0, 0.0), 0.0);
        assert_eq!(density(10.0, 4.0), 2.5);
    }
}
