use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::game::{GameOverCause, GameState, Phase, Position};
use crate::session::SessionStats;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        stats: &SessionStats,
        high_score: u32,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let header = self.render_stats(state, stats, high_score);
        frame.render_widget(header, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match state.phase {
            Phase::GameOver(cause) => {
                let game_over = self.render_game_over(state, cause, high_score);
                frame.render_widget(game_over, game_area);
            }
            phase => {
                let grid = self.render_grid(state, phase);
                frame.render_widget(grid, game_area);
            }
        }

        let controls = self.render_controls(state.phase);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, state: &GameState, phase: Phase) -> Paragraph<'_> {
        let mut lines = Vec::new();

        for y in 0..state.grid_height {
            let mut spans = Vec::new();

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == state.snake.head() {
                    // Snake head - distinct color
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.collides_with_body(pos) {
                    // Snake body
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if pos == state.food {
                    // Food
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    // Empty cell
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let (title, border_color) = match phase {
            Phase::Idle => (" Snake - press Enter to start ", Color::Yellow),
            Phase::Paused => (" Snake - PAUSED ", Color::Yellow),
            _ => (" Snake ", Color::White),
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border_color))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        state: &GameState,
        stats: &SessionStats,
        high_score: u32,
    ) -> Paragraph<'_> {
        let ticks_per_sec = 1000.0 / state.tick_interval.as_millis().max(1) as f64;

        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("High: ", Style::default().fg(Color::Yellow)),
            Span::styled(high_score.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Speed: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{:.1}/s", ticks_per_sec),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(stats.format_time(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Games: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                stats.games_played.to_string(),
                Style::default().fg(Color::White),
            ),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over(
        &self,
        state: &GameState,
        cause: GameOverCause,
        high_score: u32,
    ) -> Paragraph<'_> {
        let cause_text = match cause {
            GameOverCause::Wall => "Hit the wall",
            GameOverCause::SelfCollision => "Ran into yourself",
            GameOverCause::BoardFull => "Board full - a perfect game",
        };

        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![Span::styled(
                cause_text,
                Style::default().fg(Color::Gray),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if state.score >= high_score && state.score > 0 {
            text.push(Line::from(""));
            text.push(Line::from(vec![Span::styled(
                "New high score!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )]));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to play again or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, phase: Phase) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to steer | "),
        ];

        match phase {
            Phase::Idle => {
                spans.push(Span::styled("Enter", Style::default().fg(Color::Green)));
                spans.push(Span::raw(" to start | "));
            }
            Phase::Running | Phase::Paused => {
                spans.push(Span::styled("Space", Style::default().fg(Color::Green)));
                spans.push(Span::raw(" to pause | "));
                spans.push(Span::styled("R", Style::default().fg(Color::Yellow)));
                spans.push(Span::raw(" to reset | "));
            }
            Phase::GameOver(_) => {
                spans.push(Span::styled("Enter", Style::default().fg(Color::Green)));
                spans.push(Span::raw(" to play again | "));
            }
        }

        spans.push(Span::styled("Q", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" to quit"));

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
