use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::game::{EngineEvent, GameConfig, GameEngine};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::persistence::HighScoreStore;
use crate::render::Renderer;

/// Interactive play in the terminal
pub struct HumanMode<S: HighScoreStore> {
    engine: GameEngine,
    store: S,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    needs_redraw: bool,
}

impl<S: HighScoreStore> HumanMode<S> {
    /// Build the engine and seed it with the stored best score.
    ///
    /// An unreadable store is logged and treated as empty.
    pub fn new(config: GameConfig, store: S) -> Result<Self> {
        let high_score = store.load().unwrap_or_else(|e| {
            warn!("Failed to load high score, starting from 0: {:#}", e);
            0
        });
        let engine = GameEngine::new(config)
            .context("Invalid game configuration")?
            .with_high_score(high_score);
        info!(high_score, "engine ready");

        Ok(Self {
            engine,
            store,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            needs_redraw: true,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Refresh the clock display at 30 FPS even when nothing moves
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick; the engine ignores it unless running
                _ = self.engine.clock_mut().next_tick() => {
                    self.engine.tick();
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    self.needs_redraw = true;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            self.process_engine_events();

            if self.should_quit {
                break;
            }

            if self.needs_redraw {
                self.needs_redraw = false;
                let snapshot = self.engine.snapshot();
                let speed = self.engine.speed_multiplier();
                terminal
                    .draw(|frame| {
                        self.renderer.render(frame, &snapshot, &self.metrics, speed);
                    })
                    .context("Failed to draw frame")?;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                // Only process key press events, not release
                if key.kind != KeyEventKind::Press {
                    return;
                }

                match self.input_handler.handle_key_event(key) {
                    KeyAction::Command(command) => {
                        self.engine.handle_command(command);
                    }
                    KeyAction::Quit => {
                        self.should_quit = true;
                    }
                    KeyAction::None => {}
                }
            }
            Event::Resize(..) => self.needs_redraw = true,
            _ => {}
        }
    }

    /// Route engine signals to metrics, storage and the screen
    fn process_engine_events(&mut self) {
        for event in self.engine.drain_events() {
            self.metrics.observe(&event);

            match event {
                EngineEvent::Redraw => self.needs_redraw = true,
                EngineEvent::HighScore(high_score) => {
                    if let Err(e) = self.store.save(high_score) {
                        warn!("Failed to save high score {}: {:#}", high_score, e);
                    }
                }
                _ => {}
            }
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Direction, GamePhase, Snake};
    use crate::persistence::MemoryStore;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(mode: &mut HumanMode<MemoryStore>, code: KeyCode) {
        mode.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn test_game_initialization() {
        let mode = HumanMode::new(GameConfig::default(), MemoryStore::new(90)).unwrap();
        assert_eq!(mode.engine.phase(), GamePhase::Idle);
        assert_eq!(mode.engine.high_score(), 90);
    }

    #[test]
    fn test_invalid_config() {
        assert!(HumanMode::new(GameConfig::new(2), MemoryStore::default()).is_err());
    }

    #[test]
    fn test_keys_drive_engine() {
        let mut mode = HumanMode::new(GameConfig::small(), MemoryStore::default()).unwrap();

        press(&mut mode, KeyCode::Enter);
        assert_eq!(mode.engine.phase(), GamePhase::Running);

        press(&mut mode, KeyCode::Up);
        assert_eq!(mode.engine.queued_direction(), Direction::Up);

        press(&mut mode, KeyCode::Char(' '));
        assert_eq!(mode.engine.phase(), GamePhase::Paused);

        press(&mut mode, KeyCode::Char('r'));
        assert_eq!(mode.engine.phase(), GamePhase::Idle);

        press(&mut mode, KeyCode::Char('q'));
        assert!(mode.should_quit);
    }

    #[test]
    fn test_new_high_score_is_saved() {
        let mut mode = HumanMode::new(GameConfig::small(), MemoryStore::new(0)).unwrap();
        let snake = Snake::new(Cell::new(5, 5), Direction::Right, 3);
        assert!(mode.engine.start_with(snake, Cell::new(6, 5)));
        mode.process_engine_events();
        mode.needs_redraw = false;

        mode.engine.tick();
        mode.process_engine_events();

        assert_eq!(mode.store.saves(), 1);
        assert_eq!(mode.store.load().unwrap(), 10);
        assert_eq!(mode.metrics.foods_eaten, 1);
        assert!(mode.needs_redraw);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_drives_ticks() {
        let mut mode = HumanMode::new(GameConfig::small(), MemoryStore::default()).unwrap();
        press(&mut mode, KeyCode::Enter);
        let head = mode.engine.snake().head();

        mode.engine.clock_mut().next_tick().await;
        mode.engine.tick();

        assert_eq!(mode.engine.snake().head(), head.moved_in_direction(Direction::Right));
    }
}
