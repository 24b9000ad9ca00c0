use std::collections::HashSet;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use super::{
    action::{Command, Direction},
    clock::{SimulationClock, TickSchedule},
    config::{ConfigError, GameConfig},
    food::FoodSpawner,
    grid::{Cell, Grid},
    snake::Snake,
    state::{CollisionKind, GameOutcome, GamePhase, Snapshot},
};

/// Signal emitted by the engine, drained by whoever drives it
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// State changed; the renderer should redraw
    Redraw,
    Started,
    Paused,
    Resumed,
    Reset,
    FoodEaten { cell: Cell, score: u32 },
    LevelUp(u32),
    OverdriveStarted { ticks: u32 },
    /// The best score grew; persist it
    HighScore(u32),
    GameOver {
        final_score: u32,
        new_high_score: bool,
        outcome: GameOutcome,
    },
}

/// The game engine that owns one session and runs its state machine
pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    schedule: TickSchedule,
    spawner: FoodSpawner,
    rng: StdRng,
    clock: SimulationClock,

    snake: Snake,
    /// Requested since the last tick, committed at the start of the next one
    queued_direction: Direction,
    food: Option<Cell>,
    score: u32,
    level: u32,
    high_score: u32,
    new_high_score: bool,
    overdrive_ticks: u32,
    phase: GamePhase,
    outcome: Option<GameOutcome>,
    tick_count: u64,

    events: Vec<EngineEvent>,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let grid = Grid::new(config.board_size);
        let snake = Snake::new(grid.center(), Direction::Right, config.initial_snake_length);

        let mut engine = Self {
            schedule: TickSchedule::from_config(&config),
            grid,
            config,
            spawner: FoodSpawner::new(),
            rng,
            clock: SimulationClock::new(),
            queued_direction: snake.direction(),
            snake,
            food: None,
            score: 0,
            level: 1,
            high_score: 0,
            new_high_score: false,
            overdrive_ticks: 0,
            phase: GamePhase::Idle,
            outcome: None,
            tick_count: 0,
            events: Vec::new(),
        };
        engine.new_session();

        Ok(engine)
    }

    /// Seed the best score, typically loaded from storage at boot
    pub fn with_high_score(mut self, high_score: u32) -> Self {
        self.high_score = high_score;
        self
    }

    /// Start a fresh session. Valid from `Idle` or `GameOver`.
    pub fn start(&mut self) -> bool {
        if !self.can_start() {
            return false;
        }

        self.new_session();
        self.begin_running();
        true
    }

    /// Start a session from a prepared board instead of the default layout.
    ///
    /// Rejected when a session is in progress, any snake cell lies off the board,
    /// or two segments share a cell. Food that is off the board or under the snake
    /// is placed again at random.
    pub fn start_with(&mut self, snake: Snake, food: Cell) -> bool {
        if !self.can_start() || !snake.cells().all(|c| self.grid.in_bounds(c)) {
            return false;
        }
        let distinct: HashSet<Cell> = snake.cells().collect();
        if distinct.len() != snake.len() {
            debug!(length = snake.len(), "rejected snake with overlapping segments");
            return false;
        }

        self.new_session();
        self.queued_direction = snake.direction();
        self.snake = snake;
        self.food = if self.grid.in_bounds(food) && !self.snake.occupies(food) {
            Some(food)
        } else {
            self.spawner.spawn(&mut self.rng, &self.grid, &self.snake)
        };
        self.begin_running();
        true
    }

    /// Switch between `Running` and `Paused`; ignored in other phases
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            GamePhase::Idle | GamePhase::GameOver => false,
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.phase = GamePhase::Paused;
        debug!(score = self.score, "paused");
        self.emit(EngineEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Running;
        debug!(score = self.score, "resumed");
        self.emit(EngineEvent::Resumed);
        true
    }

    /// Queue a heading for the next tick.
    ///
    /// Only accepted while running, and never the exact reverse of the committed
    /// direction. Later calls before the tick overwrite earlier ones.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.phase != GamePhase::Running || self.snake.direction().is_opposite(direction) {
            return false;
        }
        self.queued_direction = direction;
        true
    }

    /// Cancel the clock and return to `Idle` with a fresh board. Valid anywhere.
    pub fn reset(&mut self) {
        self.clock.stop();
        self.new_session();
        self.phase = GamePhase::Idle;
        info!("session reset");
        self.emit(EngineEvent::Reset);
    }

    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Move(direction) => self.set_direction(direction),
            Command::TogglePause => self.toggle_pause(),
            Command::Start if self.phase == GamePhase::Paused => self.resume(),
            Command::Start => self.start(),
            Command::Reset => {
                self.reset();
                true
            }
        }
    }

    /// Execute one step of the game. Does nothing unless `Running`.
    ///
    /// Returns true when the step was simulated.
    pub fn tick(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }

        self.snake.set_direction(self.queued_direction);
        let new_head = self.snake.head().moved_in_direction(self.snake.direction());

        // Checked against the body before the tail moves away
        if let Some(kind) = self.check_collision(new_head) {
            self.finish(GameOutcome::Collision(kind));
            return true;
        }

        self.snake.advance(new_head);
        self.tick_count += 1;

        if self.food == Some(new_head) {
            self.eat_food(new_head);
            if self.phase != GamePhase::Running {
                return true;
            }
        } else {
            self.snake.shrink();
        }

        if self.overdrive_ticks > 0 {
            self.overdrive_ticks -= 1;
            if self.overdrive_ticks == 0 {
                let interval = self.current_interval();
                debug!(?interval, "overdrive ended");
                self.clock.restart(interval);
            }
        }

        trace!(head = ?new_head, len = self.snake.len(), "tick");
        self.emit(EngineEvent::Redraw);
        true
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, cell: Cell) -> Option<CollisionKind> {
        if !self.grid.in_bounds(cell) {
            return Some(CollisionKind::Wall);
        }

        if self.snake.occupies(cell) {
            return Some(CollisionKind::SelfHit);
        }

        None
    }

    fn eat_food(&mut self, cell: Cell) {
        let previous = self.score;
        self.score += self.config.food_score;
        debug!(score = self.score, ?cell, "food eaten");
        self.emit(EngineEvent::FoodEaten {
            cell,
            score: self.score,
        });

        let level = self.score / self.config.level_threshold + 1;
        if level > self.level {
            self.level = level;
            debug!(new_level = level, "level up");
            self.emit(EngineEvent::LevelUp(level));
        }

        if self.score > self.high_score {
            self.high_score = self.score;
            self.new_high_score = true;
            self.emit(EngineEvent::HighScore(self.score));
        }

        let threshold = self.config.overdrive_threshold;
        if threshold > 0
            && self.config.overdrive_ticks > 0
            && previous / threshold < self.score / threshold
        {
            self.overdrive_ticks = self.config.overdrive_ticks;
            debug!(ticks = self.overdrive_ticks, "overdrive started");
            self.emit(EngineEvent::OverdriveStarted {
                ticks: self.overdrive_ticks,
            });
        }

        self.food = self.spawner.spawn(&mut self.rng, &self.grid, &self.snake);
        if self.food.is_none() {
            self.finish(GameOutcome::BoardFull);
            return;
        }

        let interval = self.current_interval();
        debug!(?interval, "clock restarted");
        self.clock.restart(interval);
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.phase = GamePhase::GameOver;
        self.outcome = Some(outcome);
        self.clock.stop();

        info!(
            score = self.score,
            new_high_score = self.new_high_score,
            ?outcome,
            "game over"
        );
        self.emit(EngineEvent::GameOver {
            final_score: self.score,
            new_high_score: self.new_high_score,
            outcome,
        });
    }

    fn can_start(&self) -> bool {
        matches!(self.phase, GamePhase::Idle | GamePhase::GameOver)
    }

    fn new_session(&mut self) {
        let head = self.grid.center();
        let length = self.config.initial_snake_length as i32;
        self.snake
            .reset((0..length).map(|i| head.moved_by(-i, 0)), Direction::Right);
        self.queued_direction = Direction::Right;
        self.score = 0;
        self.level = 1;
        self.new_high_score = false;
        self.overdrive_ticks = 0;
        self.outcome = None;
        self.tick_count = 0;
        self.food = self.spawner.spawn(&mut self.rng, &self.grid, &self.snake);
    }

    fn begin_running(&mut self) {
        self.phase = GamePhase::Running;
        let interval = self.current_interval();
        self.clock.start(interval);
        info!(board_size = self.grid.size(), ?interval, "session started");
        self.emit(EngineEvent::Started);
    }

    /// Queue an event, followed by a redraw for phase transitions
    fn emit(&mut self, event: EngineEvent) {
        let transition = matches!(
            event,
            EngineEvent::Started
                | EngineEvent::Paused
                | EngineEvent::Resumed
                | EngineEvent::Reset
                | EngineEvent::GameOver { .. }
        );
        self.events.push(event);
        if transition {
            self.events.push(EngineEvent::Redraw);
        }
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Tick interval for the current score, level and Overdrive state
    pub fn current_interval(&self) -> Duration {
        self.schedule
            .interval(self.score, self.level, self.overdrive_active())
    }

    /// Speed relative to the starting interval, e.g. 2.0 when ticking twice as fast
    pub fn speed_multiplier(&self) -> f64 {
        self.schedule.base().as_secs_f64() / self.current_interval().as_secs_f64()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board_size: self.grid.size(),
            snake: self.snake.cells().collect(),
            food: self.food,
            score: self.score,
            level: self.level,
            high_score: self.high_score,
            new_high_score: self.new_high_score,
            overdrive_active: self.overdrive_active(),
            overdrive_ticks: self.overdrive_ticks,
            phase: self.phase,
            outcome: self.outcome,
            interval: self.current_interval(),
            tick_count: self.tick_count,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn queued_direction(&self) -> Direction {
        self.queued_direction
    }

    pub fn overdrive_active(&self) -> bool {
        self.overdrive_ticks > 0
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// The clock is driven from outside: await `next_tick`, then call `tick`
    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }
}
