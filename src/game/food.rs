use rand::Rng;
use rand::seq::IteratorRandom;

use super::grid::{Cell, Grid};
use super::snake::Snake;

/// Random draws tried before falling back to scanning the free cells
const SAMPLE_ATTEMPTS: usize = 64;

/// Places food on a random cell the snake does not occupy
#[derive(Debug, Clone, Copy, Default)]
pub struct FoodSpawner;

impl FoodSpawner {
    pub fn new() -> Self {
        Self
    }

    /// Pick a uniformly random free cell.
    ///
    /// Rejection sampling covers the common sparse board; once the snake covers
    /// most of it the free cells are enumerated and one is chosen directly.
    /// Returns `None` when the snake fills the whole grid.
    pub fn spawn<R: Rng + ?Sized>(&self, rng: &mut R, grid: &Grid, snake: &Snake) -> Option<Cell> {
        if snake.len() >= grid.cell_count() {
            return None;
        }

        let size = grid.size() as i32;
        for _ in 0..SAMPLE_ATTEMPTS {
            let cell = Cell::new(rng.gen_range(0..size), rng.gen_range(0..size));
            if !snake.occupies(cell) {
                return Some(cell);
            }
        }

        grid.cells().filter(|c| !snake.occupies(*c)).choose(rng)
    }
}
