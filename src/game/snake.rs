use std::collections::VecDeque;

use super::action::Direction;
use super::grid::Cell;

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at the front
    body: VecDeque<Cell>,
    /// Direction committed on the last tick
    direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction.
    /// The body trails behind the head, opposite to `direction`.
    pub fn new(head: Cell, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length.max(1) as i32)
            .map(|i| head.moved_by(-dx * i, -dy * i))
            .collect();

        Self { body, direction }
    }

    /// Build a snake from explicit cells, head first.
    ///
    /// Returns `None` for an empty list.
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>, direction: Direction) -> Option<Self> {
        let body: VecDeque<Cell> = cells.into_iter().collect();
        if body.is_empty() {
            return None;
        }
        Some(Self { body, direction })
    }

    /// Replace the whole state
    pub fn reset(&mut self, cells: impl IntoIterator<Item = Cell>, direction: Direction) {
        self.body.clear();
        self.body.extend(cells);
        self.direction = direction;
    }

    /// Prepend a new head
    pub fn advance(&mut self, new_head: Cell) {
        self.body.push_front(new_head);
    }

    /// Drop the tail cell. The head is never removed.
    pub fn shrink(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }

    /// Check if any segment, head and tail included, sits on `cell`
    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Segments from head to tail
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false for a snake built through the public constructors
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
