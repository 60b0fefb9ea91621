//! Sparse hash grid over zone centroids

use ahash::AHashMap;
use geo::Point;

/// Buckets zone indices by square cell
///
/// With a cell size equal to a query bound, every point closer than the bound
/// lies in the 3x3 block of cells around the query point.
pub struct SparseHashGrid {
    cell_size: f64,
    cells: AHashMap<(i64, i64), Vec<u32>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Point<f64>) -> (i64, i64) {
        (
            (pos.x() / self.cell_size).floor() as i64,
            (pos.y() / self.cell_size).floor() as i64,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, zone: u32, pos: Point<f64>) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(zone);
    }

    /// Zones in the 3x3 neighborhood of `pos`'s cell
    pub fn query_neighbors(&self, pos: Point<f64>) -> impl Iterator<Item = u32> + '_ {
        let (cx, cy) = self.cell_coord(pos);

        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                self.cells
                    .get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    pub fn rebuild(&mut self, zones: impl Iterator<Item = (u32, Point<f64>)>) {
        self.clear();
        for (zone, pos) in zones {
            self.insert(zone, pos);
        }
    }
}
