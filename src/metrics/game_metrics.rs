use std::time::{Duration, Instant};

use crate::game::EngineEvent;

/// Per-process play statistics shown in the header
pub struct GameMetrics {
    /// Start of the current unpaused stretch
    running_since: Option<Instant>,
    /// Play time banked before the current stretch
    banked: Duration,
    pub elapsed_time: Duration,
    /// Food eaten in the current session
    pub foods_eaten: u32,
    pub best_score: u32,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            running_since: None,
            banked: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            foods_eaten: 0,
            best_score: 0,
            games_played: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.banked + self.running_since.map_or(Duration::ZERO, |t| t.elapsed());
    }

    /// Follow the engine's event stream
    pub fn observe(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Started => self.on_game_start(),
            EngineEvent::Paused => self.freeze(),
            EngineEvent::Resumed => self.running_since = Some(Instant::now()),
            EngineEvent::Reset => self.clear(),
            EngineEvent::FoodEaten { .. } => self.foods_eaten += 1,
            EngineEvent::GameOver { final_score, .. } => self.on_game_over(*final_score),
            _ => {}
        }
    }

    pub fn on_game_start(&mut self) {
        self.clear();
        self.running_since = Some(Instant::now());
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.freeze();
        self.games_played += 1;
        if final_score > self.best_score {
            self.best_score = final_score;
        }
    }

    fn freeze(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += since.elapsed();
        }
        self.update();
    }

    fn clear(&mut self) {
        self.running_since = None;
        self.banked = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
        self.foods_eaten = 0;
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
