use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Vec2;

/// Upper bound on `cols * rows` for a coverage grid.
pub const MAX_COVERAGE_CELLS: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

/// Visit counts over square cells of the world. Counts only ever grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    counts: Vec<u32>,
    max_count: u32,
}

impl CoverageGrid {
    /// Grid covering a `width × height` world; partial edge cells are included.
    pub fn new(width: f32, height: f32, cell_size: f32) -> Result<Self, ConfigError> {
        let (cols, rows) = Self::dimensions(width, height, cell_size)?;
        Ok(CoverageGrid {
            cell_size,
            cols,
            rows,
            counts: vec![0; cols * rows],
            max_count: 0,
        })
    }

    /// `(cols, rows)` for the given world and cell size, without allocating.
    pub fn dimensions(
        width: f32,
        height: f32,
        cell_size: f32,
    ) -> Result<(usize, usize), ConfigError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::InvalidCoverage("cell_size must be positive"));
        }
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidCoverage("world must have an area"));
        }
        let too_small = ConfigError::InvalidCoverage("cell_size too small for the world");
        let limit = MAX_COVERAGE_CELLS as f32;
        let (cols, rows) = ((width / cell_size).ceil(), (height / cell_size).ceil());
        if !(cols <= limit && rows <= limit) {
            return Err(too_small);
        }
        let (cols, rows) = (cols as usize, rows as usize);
        match cols.checked_mul(rows) {
            Some(cells) if cells <= MAX_COVERAGE_CELLS => Ok((cols, rows)),
            _ => Err(too_small),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing `position`, clamped onto the grid.
    pub fn cell_of(&self, position: Vec2) -> Cell {
        let clamp = |v: f32, n: usize| ((v / self.cell_size).floor().max(0.0) as usize).min(n - 1);
        Cell {
            col: clamp(position.x, self.cols),
            row: clamp(position.y, self.rows),
        }
    }

    pub fn increment(&mut self, cell: Cell) {
        let index = self.index(cell);
        let count = &mut self.counts[index];
        *count = count.saturating_add(1);
        self.max_count = self.max_count.max(*count);
    }

    pub fn record(&mut self, position: Vec2) {
        self.increment(self.cell_of(position));
    }

    pub fn count(&self, cell: Cell) -> u32 {
        self.counts[self.index(cell)]
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// `count / max(max_count, 1)`, in `[0, 1]`.
    pub fn normalized_intensity(&self, cell: Cell) -> f32 {
        self.count(cell) as f32 / self.max_count.max(1) as f32
    }

    fn index(&self, cell: Cell) -> usize {
        let col = cell.col.min(self.cols - 1);
        let row = cell.row.min(self.rows - 1);
        row * self.cols + col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_round_up() {
        let grid = CoverageGrid::new(800.0, 600.0, 10.0).unwrap();
        assert_eq!((grid.cols(), grid.rows()), (80, 60));
        let grid = CoverageGrid::new(805.0, 601.0, 10.0).unwrap();
        assert_eq!((grid.cols(), grid.rows()), (81, 61));
        assert!(CoverageGrid::new(800.0, 600.0, 0.0).is_err());
    }

    #[test]
    fn tiny_cells_are_rejected_not_allocated() {
        assert_eq!(
            CoverageGrid::dimensions(800.0, 600.0, 1e-7),
            Err(ConfigError::InvalidCoverage("cell_size too small for the world"))
        );
        assert!(CoverageGrid::new(800.0, 600.0, 0.05).is_err());
        assert_eq!(CoverageGrid::dimensions(800.0, 600.0, 0.5), Ok((1600, 1200)));
    }

    #[test]
    fn cell_of_floors_and_clamps() {
        let grid = CoverageGrid::new(100.0, 50.0, 10.0).unwrap();
        assert_eq!(grid.cell_of(Vec2::new(15.0, 9.9)), Cell { col: 1, row: 0 });
        assert_eq!(grid.cell_of(Vec2::new(-3.0, 70.0)), Cell { col: 0, row: 4 });
        assert_eq!(grid.cell_of(Vec2::new(100.0, 50.0)), Cell { col: 9, row: 4 });
    }

    #[test]
    fn intensity_is_relative_to_max() {
        let mut grid = CoverageGrid::new(100.0, 100.0, 10.0).unwrap();
        let hot = Cell { col: 2, row: 3 };
        let warm = Cell { col: 5, row: 5 };
        assert_eq!(grid.normalized_intensity(hot), 0.0);
        for _ in 0..4 {
            grid.increment(hot);
        }
        grid.increment(warm);
        assert_eq!(grid.max_count(), 4);
        assert_eq!(grid.normalized_intensity(hot), 1.0);
        assert_eq!(grid.normalized_intensity(warm), 0.25);
        assert_eq!(grid.total(), 5);
    }

    #[test]
    fn record_maps_positions() {
        let mut grid = CoverageGrid::new(100.0, 100.0, 10.0).unwrap();
        grid.record(Vec2::new(55.0, 21.0));
        grid.record(Vec2::new(59.0, 29.0));
        assert_eq!(grid.count(Cell { col: 5, row: 2 }), 2);
        assert_eq!(grid.counts().iter().filter(|&&c| c > 0).count(), 1);
    }
}
