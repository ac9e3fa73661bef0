//! Uniform grid for neighbor queries
//!
//! Particles are bucketed by `floor(coord / cell_size)` per axis. A query
//! visits the cells around the query point and yields every particle in
//! them; callers must still filter on exact distance, since the grid is a
//! conservative over-approximation of the support sphere.

use std::collections::HashMap;

use glam::{DVec3, IVec3};

/// Grid rebuilt from the particle snapshot every tick
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    cell_size: f64,
    /// Cell coordinate -> particle indices
    cells: HashMap<IVec3, Vec<usize>>,
}

impl SpatialIndex {
    /// Build an index over `positions` with the given cell size
    pub fn build(positions: &[DVec3], cell_size: f64) -> Self {
        let mut index = Self::default();
        index.rebuild(positions.iter().copied(), cell_size);
        index
    }

    /// Rebuild in place, keeping bucket allocations from the previous tick
    pub fn rebuild<I>(&mut self, positions: I, cell_size: f64)
    where
        I: IntoIterator<Item = DVec3>,
    {
        if cell_size != self.cell_size {
            self.cells.clear();
        } else {
            for bucket in self.cells.values_mut() {
                bucket.clear();
            }
        }
        self.cell_size = cell_size.max(f64::EPSILON);

        for (i, pos) in positions.into_iter().enumerate() {
            let cell = self.cell_of(pos);
            self.cells.entry(cell).or_default().push(i);
        }

        // Drop cells that stayed empty so they aren't visited next frame
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of occupied cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Grid cell containing a position
    #[inline]
    pub fn cell_of(&self, pos: DVec3) -> IVec3 {
        let c = (pos / self.cell_size).floor();
        IVec3::new(c.x as i32, c.y as i32, c.z as i32)
    }

    /// How many cells out from the center cell a query of `radius` must reach
    #[inline]
    fn reach(&self, radius: f64) -> i32 {
        ((radius / self.cell_size).ceil() as i32).max(1)
    }

    /// Visit every candidate neighbor of `pos` (3x3x3 cells when `radius <= cell_size`)
    pub fn for_each_candidate<F>(&self, pos: DVec3, radius: f64, mut visit: F)
    where
        F: FnMut(usize),
    {
        let center = self.cell_of(pos);
        let reach = self.reach(radius);

        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    let cell = center + IVec3::new(dx, dy, dz);
                    if let Some(bucket) = self.cells.get(&cell) {
                        for &i in bucket {
                            visit(i);
                        }
                    }
                }
            }
        }
    }

    /// Candidate neighbors of `pos`, appended to `out` (cleared first)
    pub fn query_into(&self, pos: DVec3, radius: f64, out: &mut Vec<usize>) {
        out.clear();
        self.for_each_candidate(pos, radius, |i| out.push(i));
    }

    /// Candidate neighbors of `pos` as a fresh vector
    pub fn query_neighbors(&self, pos: DVec3, radius: f64) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_into(pos, radius, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_of_uses_floor() {
        let index = SpatialIndex::build(&[], 1.0);
        assert_eq!(index.cell_of(DVec3::new(0.5, 0.5, 0.5)), IVec3::ZERO);
        assert_eq!(index.cell_of(DVec3::new(1.5, 0.5, 0.5)), IVec3::new(1, 0, 0));
        assert_eq!(index.cell_of(DVec3::new(-0.1, 0.0, 0.0)), IVec3::new(-1, 0, 0));
    }

    #[test]
    fn test_query_finds_adjacent_cells_only() {
        let positions = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(0.1, 0.1, 0.1),
            DVec3::new(-0.9, 0.5, 0.2),
            DVec3::new(5.0, 5.0, 5.0),
        ];
        let index = SpatialIndex::build(&positions, 1.0);

        let neighbors = index.query_neighbors(DVec3::ZERO, 1.0);
        assert!(neighbors.contains(&0));
        assert!(neighbors.contains(&1));
        assert!(neighbors.contains(&2));
        assert!(!neighbors.contains(&3));
    }

    #[test]
    fn test_larger_radius_reaches_further() {
        let positions = vec![DVec3::ZERO, DVec3::new(2.5, 0.0, 0.0)];
        let index = SpatialIndex::build(&positions, 1.0);
        assert!(!index.query_neighbors(DVec3::ZERO, 1.0).contains(&1));
        assert!(index.query_neighbors(DVec3::ZERO, 3.0).contains(&1));
    }

    #[test]
    fn test_rebuild_reflects_current_snapshot() {
        let mut index = SpatialIndex::build(&[DVec3::ZERO], 1.0);
        index.rebuild([DVec3::new(10.0, 0.0, 0.0)], 1.0);
        assert!(index.query_neighbors(DVec3::ZERO, 1.0).is_empty());
        assert_eq!(index.query_neighbors(DVec3::new(10.0, 0.0, 0.0), 1.0), vec![0]);
        assert_eq!(index.occupied_cells(), 1);
    }

    #[test]
    fn test_no_duplicates_with_brute_force_agreement() {
        let positions: Vec<DVec3> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.37;
                DVec3::new(t.sin() * 3.0, t.cos() * 2.0, (t * 0.5).sin())
            })
            .collect();
        let index = SpatialIndex::build(&positions, 0.8);
        let query = DVec3::new(0.3, -0.2, 0.1);

        let mut candidates = index.query_neighbors(query, 0.8);
        let before = candidates.len();
        candidates.sort_unstable();
        candidates.dedup();
        assert_eq!(candidates.len(), before);

        for (i, p) in positions.iter().enumerate() {
            if p.distance(query) < 0.8 {
                assert!(candidates.contains(&i), "missed particle {}", i);
            }
        }
    }
}
