use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameState, Position};
use crate::metrics::GameMetrics;

/// Mode-specific information shown under the header
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub mode: &'static str,
    pub paused: bool,
    /// Extra text such as the loaded checkpoint
    pub detail: Option<String>,
    /// Key help shown in the footer
    pub controls: &'static str,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        metrics: &GameMetrics,
        status: &StatusLine,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(2), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, metrics, status), chunks[0]);

        let board_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        if state.is_alive {
            frame.render_widget(self.render_grid(state), board_area);
        } else {
            frame.render_widget(self.render_game_over(state, metrics), board_area);
        }

        frame.render_widget(self.render_controls(status), chunks[2]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let head = state.snake.head();
        let mut lines = Vec::with_capacity(state.rows() as usize);

        for row in 0..state.rows() {
            let mut spans = Vec::with_capacity(state.columns() as usize);

            for col in 0..state.columns() {
                let pos = Position::new(col * state.block_size, row * state.block_size);

                let cell = if pos == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.occupies(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if pos == state.food {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        state: &GameState,
        metrics: &GameMetrics,
        status: &StatusLine,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let stats = Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Games: ", label),
            Span::styled(metrics.games_played.to_string(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(format!("{:.1}", state.speed), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ]);

        let mut mode = vec![Span::styled(
            status.mode,
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(detail) = &status.detail {
            mode.push(Span::raw("  "));
            mode.push(Span::styled(detail.clone(), Style::default().fg(Color::Gray)));
        }
        if status.paused {
            mode.push(Span::styled(
                "  PAUSED",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(vec![stats, Line::from(mode)]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let bold_white = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(state.score.to_string(), bold_white),
            ]),
            Line::from(vec![
                Span::styled("Best: ", Style::default().fg(Color::Yellow)),
                Span::styled(metrics.high_score.to_string(), bold_white),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, status: &StatusLine) -> Paragraph<'_> {
        let text = Line::from(vec![Span::styled(
            status.controls,
            Style::default().fg(Color::Cyan),
        )]);

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Snake};
    use ratatui::{Terminal, backend::TestBackend};

    fn small_state() -> GameState {
        let snake = Snake::new(Position::new(60, 40), Direction::Right, 3, 20);
        GameState::new(snake, Direction::Right, Position::new(120, 100), 200, 160, 20)
    }

    fn draw(state: &GameState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let status = StatusLine {
            mode: "WATCH",
            paused: true,
            detail: None,
            controls: "Q quit",
        };
        terminal
            .draw(|frame| Renderer::new().render(frame, state, &GameMetrics::new(), &status))
            .unwrap();

        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_board_shows_snake_and_food() {
        let screen = draw(&small_state());

        assert_eq!(screen.matches('■').count(), 1);
        assert_eq!(screen.matches('□').count(), 2);
        assert!(screen.contains('O'));
        assert!(screen.contains("PAUSED"));
    }

    #[test]
    fn test_game_over_screen() {
        let mut state = small_state();
        state.is_alive = false;
        state.score = 7;

        let screen = draw(&state);

        assert!(screen.contains("GAME OVER"));
        assert!(screen.contains("Final Score: 7"));
    }
}
