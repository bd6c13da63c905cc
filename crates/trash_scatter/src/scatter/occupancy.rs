//! Spatial bookkeeping of already placed objects.
//!
//! [`OccupancyIndex`] is the exact point index used by the synchronous placer.
//! [`AtomicOccupancyGrid`] is the coarse, lock-free cell grid shared by parallel jobs.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec2;

use crate::area::PlacementArea;

/// Uniform spatial hash of placed XZ points.
#[derive(Debug, Clone)]
pub struct OccupancyIndex {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<Vec2>>,
    len: usize,
}

impl OccupancyIndex {
    /// Creates an index bucketing points into square cells of `cell_size`.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    #[inline]
    fn cell_of(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, p: Vec2) {
        let key = self.cell_of(p);
        self.cells.entry(key).or_default().push(p);
        self.len += 1;
    }

    /// True when a stored point lies strictly closer than `radius` to `p`.
    pub fn any_within(&self, p: Vec2, radius: f32) -> bool {
        if self.len == 0 || radius.is_nan() || radius <= 0.0 {
            return false;
        }
        let r2 = radius * radius;

        let (x0, y0) = self.cell_of(p - Vec2::splat(radius));
        let (x1, y1) = self.cell_of(p + Vec2::splat(radius));
        let span = (x1 as i64 - x0 as i64 + 1) * (y1 as i64 - y0 as i64 + 1);

        // Large query radii touch more cells than there are points.
        if span > self.cells.len() as i64 {
            return self.iter().any(|q| q.distance_squared(p) < r2);
        }

        for cy in y0..=y1 {
            for cx in x0..=x1 {
                if let Some(points) = self.cells.get(&(cx, cy)) {
                    if points.iter().any(|q| q.distance_squared(p) < r2) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.cells.values().flat_map(|v| v.iter().copied())
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }
}

const MAX_GRID_CELLS_PER_AXIS: usize = 4096;

/// Fixed grid of atomic occupancy counters over an area.
///
/// Claims are compare-and-swap from zero, so two jobs can never both claim the
/// same free cell. Forced claims increment unconditionally.
#[derive(Debug)]
pub struct AtomicOccupancyGrid {
    origin: Vec2,
    cell_size: f32,
    width: usize,
    height: usize,
    cells: Vec<AtomicU32>,
}

/// Cells held by one successful claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claim {
    cells: Vec<usize>,
}

impl Claim {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl AtomicOccupancyGrid {
    /// Covers `area` with cells of at least `cell_size`.
    ///
    /// The cell size grows when the area would need more than 4096 cells per axis.
    pub fn new(area: &PlacementArea, cell_size: f32) -> Self {
        let extent = area.extent().max(Vec2::splat(f32::MIN_POSITIVE));
        let min_cell = extent.max_element() / MAX_GRID_CELLS_PER_AXIS as f32;
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size.max(min_cell)
        } else {
            min_cell.max(1.0)
        };
        let width = ((extent.x / cell_size).ceil() as usize).clamp(1, MAX_GRID_CELLS_PER_AXIS);
        let height = ((extent.y / cell_size).ceil() as usize).clamp(1, MAX_GRID_CELLS_PER_AXIS);
        let cells = (0..width * height).map(|_| AtomicU32::new(0)).collect();

        Self {
            origin: area.min,
            cell_size,
            width,
            height,
            cells,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn axis_cell(&self, v: f32, origin: f32, len: usize) -> usize {
        let c = ((v - origin) / self.cell_size).floor();
        if c.is_nan() || c < 0.0 {
            0
        } else {
            (c as usize).min(len - 1)
        }
    }

    /// Grid cell index holding `p`; points outside the grid map to the nearest edge cell.
    #[inline]
    pub fn cell_index(&self, p: Vec2) -> usize {
        let x = self.axis_cell(p.x, self.origin.x, self.width);
        let y = self.axis_cell(p.y, self.origin.y, self.height);
        y * self.width + x
    }

    fn cells_in_disk(&self, center: Vec2, radius: f32) -> Vec<usize> {
        let r = radius.max(0.0);
        let x0 = self.axis_cell(center.x - r, self.origin.x, self.width);
        let x1 = self.axis_cell(center.x + r, self.origin.x, self.width);
        let y0 = self.axis_cell(center.y - r, self.origin.y, self.height);
        let y1 = self.axis_cell(center.y + r, self.origin.y, self.height);
        let mut out = Vec::with_capacity((x1 - x0 + 1) * (y1 - y0 + 1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                out.push(y * self.width + x);
            }
        }
        out
    }

    /// Claims every cell touched by the disk, or none of them.
    ///
    /// Cells are claimed in ascending index order and rolled back on the first conflict.
    pub fn try_claim(&self, center: Vec2, radius: f32) -> Option<Claim> {
        let cells = self.cells_in_disk(center, radius);
        for (n, &idx) in cells.iter().enumerate() {
            let won = self.cells[idx]
                .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok();
            if !won {
                for &held in &cells[..n] {
                    self.cells[held].fetch_sub(1, Ordering::AcqRel);
                }
                return None;
            }
        }
        Some(Claim { cells })
    }

    /// Marks every cell touched by the disk as occupied regardless of prior state.
    pub fn force_claim(&self, center: Vec2, radius: f32) -> Claim {
        let cells = self.cells_in_disk(center, radius);
        for &idx in &cells {
            self.cells[idx].fetch_add(1, Ordering::AcqRel);
        }
        Claim { cells }
    }

    /// Returns the cells of a claim to the grid.
    pub fn release(&self, claim: Claim) {
        for idx in claim.cells {
            self.cells[idx].fetch_sub(1, Ordering::AcqRel);
        }
    }

    /// Occupancy counter of the cell holding `p`.
    pub fn count_at(&self, p: Vec2) -> u32 {
        self.cells[self.cell_index(p)].load(Ordering::Acquire)
    }

    /// Number of cells with a non-zero counter.
    pub fn occupied_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.load(Ordering::Acquire) > 0)
            .count()
    }

    /// Largest counter in the grid.
    pub fn max_count(&self) -> u32 {
        self.cells
            .iter()
            .map(|c| c.load(Ordering::Acquire))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn index_reports_points_within_radius() {
        let mut index = OccupancyIndex::new(1.0);
        assert!(!index.any_within(Vec2::ZERO, 10.0));
        index.insert(Vec2::new(0.0, 0.0));
        index.insert(Vec2::new(10.0, 10.0));

        assert_eq!(index.len(), 2);
        assert!(index.any_within(Vec2::new(0.5, 0.0), 1.0));
        assert!(!index.any_within(Vec2::new(3.0, 0.0), 1.0));
        assert!(index.any_within(Vec2::new(9.0, 9.5), 2.0));
    }

    #[test]
    fn distance_equal_to_radius_is_not_within() {
        let mut index = OccupancyIndex::new(0.5);
        index.insert(Vec2::ZERO);
        assert!(!index.any_within(Vec2::new(2.0, 0.0), 2.0));
        assert!(!index.any_within(Vec2::new(0.0, 0.0), 0.0));
    }

    #[test]
    fn large_radius_falls_back_to_scan() {
        let mut index = OccupancyIndex::new(0.1);
        index.insert(Vec2::new(-40.0, 25.0));
        assert!(index.any_within(Vec2::new(40.0, -25.0), 1000.0));
        assert!(!index.any_within(Vec2::new(40.0, -25.0), 10.0));
    }

    #[test]
    fn grid_claims_are_exclusive_until_released() {
        let area = PlacementArea::new(Vec2::ZERO, Vec2::splat(10.0), 0.0);
        let grid = AtomicOccupancyGrid::new(&area, 1.0);
        assert_eq!(grid.dims(), (10, 10));

        let claim = grid.try_claim(Vec2::new(5.5, 5.5), 0.0).expect("free cell");
        assert_eq!(claim.len(), 1);
        assert!(grid.try_claim(Vec2::new(5.1, 5.9), 0.0).is_none());
        assert_eq!(grid.count_at(Vec2::new(5.5, 5.5)), 1);

        grid.release(claim);
        assert_eq!(grid.occupied_cells(), 0);
        assert!(grid.try_claim(Vec2::new(5.1, 5.9), 0.0).is_some());
    }

    #[test]
    fn failed_disk_claim_rolls_back_partial_cells() {
        let area = PlacementArea::new(Vec2::ZERO, Vec2::splat(10.0), 0.0);
        let grid = AtomicOccupancyGrid::new(&area, 1.0);
        let _blocker = grid.try_claim(Vec2::new(6.5, 6.5), 0.0).expect("free cell");

        assert!(grid.try_claim(Vec2::new(5.5, 5.5), 1.0).is_none());
        assert_eq!(grid.occupied_cells(), 1);
    }

    #[test]
    fn forced_claims_stack_counters() {
        let area = PlacementArea::new(Vec2::ZERO, Vec2::splat(4.0), 0.0);
        let grid = AtomicOccupancyGrid::new(&area, 2.0);
        grid.force_claim(Vec2::new(1.0, 1.0), 0.0);
        grid.force_claim(Vec2::new(1.5, 0.5), 0.0);
        assert_eq!(grid.count_at(Vec2::new(1.0, 1.0)), 2);
        assert_eq!(grid.max_count(), 2);
    }

    #[test]
    fn out_of_area_points_map_to_edge_cells() {
        let area = PlacementArea::new(Vec2::ZERO, Vec2::splat(4.0), 0.0);
        let grid = AtomicOccupancyGrid::new(&area, 1.0);
        assert_eq!(grid.cell_index(Vec2::new(-5.0, -5.0)), 0);
        assert_eq!(grid.cell_index(Vec2::new(50.0, 50.0)), 15);
    }

    #[test]
    fn concurrent_claims_on_one_cell_admit_a_single_winner() {
        let area = PlacementArea::new(Vec2::ZERO, Vec2::splat(4.0), 0.0);
        let grid = Arc::new(AtomicOccupancyGrid::new(&area, 4.0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let grid = Arc::clone(&grid);
                std::thread::spawn(move || grid.try_claim(Vec2::new(2.0, 2.0), 0.0).is_some())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(grid.max_count(), 1);
    }
}
