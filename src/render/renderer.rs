use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{Cell, GamePhase, Snapshot};
use crate::metrics::GameMetrics;

/// Draws an engine [`Snapshot`] into the terminal
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        snapshot: &Snapshot,
        metrics: &GameMetrics,
        speed_multiplier: f64,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(snapshot, metrics, speed_multiplier);
        frame.render_widget(stats, chunks[0]);

        // Two columns per cell plus the border
        let side = u16::try_from(snapshot.board_size).unwrap_or(u16::MAX);
        let grid_width = side.saturating_mul(2).saturating_add(2);
        let grid_height = side.saturating_add(2);
        let game_area = centered(chunks[1], grid_width, grid_height);
        frame.render_widget(self.render_grid(snapshot, game_area), game_area);

        if let Some(overlay) = self.render_overlay(snapshot) {
            let area = centered(game_area, game_area.width.min(44), 9);
            frame.render_widget(Clear, area);
            frame.render_widget(overlay, area);
        }

        let controls = self.render_controls(snapshot.phase);
        frame.render_widget(controls, chunks[2]);
    }

    /// Only the cells that fit inside `area` are built
    fn render_grid(&self, snapshot: &Snapshot, area: Rect) -> Paragraph<'_> {
        let head = snapshot.head();
        let body_color = if snapshot.overdrive_active {
            Color::Magenta
        } else {
            Color::Green
        };
        let rows = snapshot
            .board_size
            .min(usize::from(area.height.saturating_sub(2)));
        let columns = snapshot
            .board_size
            .min(usize::from(area.width.saturating_sub(2) / 2));
        let mut lines = Vec::with_capacity(rows);

        for y in 0..rows {
            let mut spans = Vec::with_capacity(columns);

            for x in 0..columns {
                let cell = Cell::new(x as i32, y as i32);

                let span = if Some(cell) == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if snapshot.snake.contains(&cell) {
                    Span::styled("□ ", Style::default().fg(body_color))
                } else if Some(cell) == snapshot.food {
                    Span::styled(
                        "● ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(span);
            }

            lines.push(Line::from(spans));
        }

        let title = if snapshot.overdrive_active {
            format!(" Cobra  OVERDRIVE {} ", snapshot.overdrive_ticks)
        } else {
            " Cobra ".to_string()
        };

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(if snapshot.overdrive_active {
                    Color::Magenta
                } else {
                    Color::White
                }))
                .title(title)
                .title_bottom(format!(
                    " {} · tick {} ",
                    snapshot.phase.label(),
                    snapshot.tick_count
                )),
        )
    }

    fn render_stats(
        &self,
        snapshot: &Snapshot,
        metrics: &GameMetrics,
        speed_multiplier: f64,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(
                snapshot.score.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(snapshot.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Level: ", label),
            Span::styled(snapshot.level.to_string(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(format!("{:.1}x", speed_multiplier), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ]),
        Line::from(vec![
            Span::styled("Games: ", label),
            Span::styled(metrics.games_played.to_string(), value),
            Span::raw("    "),
            Span::styled("Food: ", label),
            Span::styled(metrics.foods_eaten.to_string(), value),
            Span::raw("    "),
            Span::styled("Session best: ", label),
            Span::styled(metrics.best_score.to_string(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_overlay(&self, snapshot: &Snapshot) -> Option<Paragraph<'_>> {
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };
        let hint = |t: &'static str| Span::styled(t, Style::default().fg(Color::Gray));

        let (title, color, mut text) = match snapshot.phase {
            GamePhase::Running => return None,
            GamePhase::Idle => (
                " Cobra ",
                Color::Cyan,
                vec![Line::from("Eat, grow, and don't hit anything.")],
            ),
            GamePhase::Paused => (
                " Paused ",
                Color::Yellow,
                vec![Line::from("Take a breath.")],
            ),
            GamePhase::GameOver => {
                let headline = if snapshot.outcome.is_some_and(|o| o.is_win()) {
                    "BOARD CLEARED"
                } else {
                    "GAME OVER"
                };
                let verdict = if snapshot.new_high_score {
                    "New record!"
                } else {
                    "So close. Next one."
                };
                (
                    " Game Over ",
                    Color::Red,
                    vec![
                        Line::from(Span::styled(
                            headline,
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        )),
                        Line::from(vec![
                            Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                            Span::styled(
                                snapshot.score.to_string(),
                                Style::default()
                                    .fg(Color::White)
                                    .add_modifier(Modifier::BOLD),
                            ),
                        ]),
                        Line::from(verdict),
                    ],
                )
            }
        };

        text.push(Line::from(""));
        text.push(match snapshot.phase {
            GamePhase::Paused => Line::from(vec![
                hint("Press "),
                key("Space", Color::Green),
                hint(" or "),
                key("Enter", Color::Green),
                hint(" to continue"),
            ]),
            _ => Line::from(vec![
                hint("Press "),
                key("Enter", Color::Green),
                hint(" to play or "),
                key("Q", Color::Red),
                hint(" to quit"),
            ]),
        });

        Some(
            Paragraph::new(text).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(color))
                    .title(title),
            ),
        )
    }

    fn render_controls(&self, phase: GamePhase) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
        ];
        if phase != GamePhase::Running {
            spans.push(Span::styled("Enter", Style::default().fg(Color::Green)));
            spans.push(Span::raw(" start | "));
        }
        spans.extend([
            Span::styled("R", Style::default().fg(Color::Yellow)),
            Span::raw(" reset | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]);

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rect of at most `width` x `height` centred inside `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
