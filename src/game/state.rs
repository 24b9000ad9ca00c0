use std::time::Duration;

use super::grid::Cell;

/// State-machine phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    Idle,
    Running,
    Paused,
    GameOver,
}

impl GamePhase {
    pub fn label(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "game over",
        }
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfHit,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Collision(CollisionKind),
    /// The snake covers every cell; there is nowhere left to put food
    BoardFull,
}

impl GameOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, GameOutcome::BoardFull)
    }
}

/// Read-only view of the engine for a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub board_size: usize,
    /// Head first
    pub snake: Vec<Cell>,
    /// `None` only once the board is full
    pub food: Option<Cell>,
    pub score: u32,
    pub level: u32,
    pub high_score: u32,
    /// The current session has beaten the best score it started with
    pub new_high_score: bool,
    pub overdrive_active: bool,
    pub overdrive_ticks: u32,
    pub phase: GamePhase,
    pub outcome: Option<GameOutcome>,
    pub interval: Duration,
    /// Ticks simulated in the current session
    pub tick_count: u64,
}

impl Snapshot {
    pub fn head(&self) -> Option<Cell> {
        self.snake.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(phase: GamePhase) -> Snapshot {
        Snapshot {
            board_size: 10,
            snake: vec![Cell::new(5, 5), Cell::new(4, 5)],
            food: Some(Cell::new(1, 1)),
            score: 0,
            level: 1,
            high_score: 0,
            new_high_score: false,
            overdrive_active: false,
            overdrive_ticks: 0,
            phase,
            outcome: None,
            interval: Duration::from_millis(120),
            tick_count: 0,
        }
    }

    #[test]
    fn test_default_phase_is_idle() {
        assert_eq!(GamePhase::default(), GamePhase::Idle);
        assert_eq!(GamePhase::GameOver.label(), "game over");
    }

    #[test]
    fn test_outcome_win() {
        assert!(GameOutcome::BoardFull.is_win());
        assert!(!GameOutcome::Collision(CollisionKind::Wall).is_win());
    }

    #[test]
    fn test_snapshot_helpers() {
        assert_eq!(snapshot(GamePhase::Idle).head(), Some(Cell::new(5, 5)));
    }
}
