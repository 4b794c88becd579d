use std::collections::HashMap;

use crate::config::NeighborSearch;
use crate::geometry::Vec2;

/// Widest cell span a grid query may need, in cells either side of the centre.
pub const MAX_GRID_SPAN: f32 = 32.0;

/// Finds indices of positions near a query point.
pub trait NeighborIndex: Send + Sync {
    fn rebuild(&mut self, positions: &[Vec2]);

    /// Visit every index whose position is strictly closer than `radius` to `center`.
    fn for_each_within(&self, center: Vec2, radius: f32, visit: &mut dyn FnMut(usize));
}

pub fn build_index(search: NeighborSearch) -> Box<dyn NeighborIndex> {
    match search {
        NeighborSearch::BruteForce => Box::new(BruteForce::default()),
        NeighborSearch::Grid { cell_size } => Box::new(UniformGrid::new(cell_size)),
    }
}

/// Checks every position. Fine for tens of agents.
#[derive(Debug, Default, Clone)]
pub struct BruteForce {
    positions: Vec<Vec2>,
}

impl NeighborIndex for BruteForce {
    fn rebuild(&mut self, positions: &[Vec2]) {
        self.positions.clear();
        self.positions.extend_from_slice(positions);
    }

    fn for_each_within(&self, center: Vec2, radius: f32, visit: &mut dyn FnMut(usize)) {
        let radius_squared = radius * radius;
        for (index, position) in self.positions.iter().enumerate() {
            if (position - center).norm_squared() < radius_squared {
                visit(index);
            }
        }
    }
}

/// Buckets positions into square cells keyed by `floor(p / cell_size)`.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f32,
    positions: Vec<Vec2>,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl UniformGrid {
    pub fn new(cell_size: f32) -> Self {
        UniformGrid {
            cell_size,
            positions: Vec::new(),
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }
}

impl NeighborIndex for UniformGrid {
    fn rebuild(&mut self, positions: &[Vec2]) {
        self.positions.clear();
        self.positions.extend_from_slice(positions);
        self.cells.clear();
        for (index, position) in positions.iter().enumerate() {
            let key = self.cell_of(*position);
            self.cells.entry(key).or_default().push(index);
        }
    }

    fn for_each_within(&self, center: Vec2, radius: f32, visit: &mut dyn FnMut(usize)) {
        let radius_squared = radius * radius;
        let mut check = |index: usize| {
            if (self.positions[index] - center).norm_squared() < radius_squared {
                visit(index);
            }
        };
        let reach = (radius / self.cell_size).ceil();
        // A window wider than the occupied cells is slower than a linear scan.
        if !((2.0 * reach + 1.0).powi(2) <= self.cells.len() as f32) {
            for index in 0..self.positions.len() {
                check(index);
            }
            return;
        }
        let span = reach as i32;
        let (cell_x, cell_y) = self.cell_of(center);
        for x_offset in -span..=span {
            for y_offset in -span..=span {
                let key = (
                    cell_x.saturating_add(x_offset),
                    cell_y.saturating_add(y_offset),
                );
                let Some(near) = self.cells.get(&key) else {
                    continue;
                };
                for &index in near {
                    check(index);
                }
            }
        }
    }
}
