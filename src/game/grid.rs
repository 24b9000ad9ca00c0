use super::action::Direction;
use serde::{Deserialize, Serialize};

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move cell by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Neighbouring cell in a direction; may lie outside the grid
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Fixed-size square board. The size never changes during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    size: usize,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of cells per side
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// Check if a cell is within the grid bounds
    pub fn in_bounds(&self, cell: Cell) -> bool {
        let size = self.size as i32;
        cell.x >= 0 && cell.x < size && cell.y >= 0 && cell.y < size
    }

    pub fn center(&self) -> Cell {
        let mid = (self.size / 2) as i32;
        Cell::new(mid, mid)
    }

    /// Every cell of the board in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let size = self.size as i32;
        (0..size).flat_map(move |y| (0..size).map(move |x| Cell::new(x, y)))
    }
}
