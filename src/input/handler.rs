use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Command, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Command(Command),
    Quit,
    None,
}

/// Maps raw key presses to engine commands. Reversal filtering is the engine's job.
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Up => Self::movement(Direction::Up),
            KeyCode::Down => Self::movement(Direction::Down),
            KeyCode::Left => Self::movement(Direction::Left),
            KeyCode::Right => Self::movement(Direction::Right),

            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'w' => Self::movement(Direction::Up),
                's' => Self::movement(Direction::Down),
                'a' => Self::movement(Direction::Left),
                'd' => Self::movement(Direction::Right),
                ' ' | 'p' => KeyAction::Command(Command::TogglePause),
                'r' => KeyAction::Command(Command::Reset),
                'q' => KeyAction::Quit,
                _ => KeyAction::None,
            },

            KeyCode::Enter => KeyAction::Command(Command::Start),
            KeyCode::Esc => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }

    fn movement(direction: Direction) -> KeyAction {
        KeyAction::Command(Command::Move(direction))
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
