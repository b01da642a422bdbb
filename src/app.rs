use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::game::{GameConfig, GameEngine, GameState, Phase};
use crate::input::{Command, InputHandler};
use crate::render::Renderer;
use crate::session::SessionStats;
use crate::storage::HighScoreStore;

/// Render at 30 FPS regardless of game speed
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Owns the terminal and drives the game: one task multiplexes keyboard
/// events, the tick timer, and the render timer. Ticks are applied only
/// while the game is Running, so updates never overlap.
pub struct App {
    engine: GameEngine,
    state: GameState,
    stats: SessionStats,
    store: HighScoreStore,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    /// Set when the tick interval must be re-armed (speed change, resume)
    retime: bool,
}

impl App {
    pub fn new(config: GameConfig, store: HighScoreStore) -> Self {
        let mut engine = GameEngine::new(config);
        let state = engine.reset();

        Self {
            engine,
            state,
            stats: SessionStats::new(),
            store,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            retime: false,
        }
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

        let mut tick_timer = make_tick_timer(self.state.tick_interval);
        let mut render_timer = interval(RENDER_INTERVAL);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick; disabled outside the Running phase
                _ = tick_timer.tick(), if self.state.is_running() => {
                    self.on_tick();
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.stats.update();
                    terminal.draw(|frame| {
                        self.renderer.render(
                            frame,
                            &self.state,
                            &self.stats,
                            self.store.high_score(),
                        );
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.retime {
                tick_timer = make_tick_timer(self.state.tick_interval);
                self.retime = false;
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let command = self.input_handler.handle_key_event(key);
            self.apply_command(command);
        }
    }

    /// Apply a key command, dropping anything invalid for the current phase
    fn apply_command(&mut self, command: Command) {
        match command {
            Command::Steer(direction) => {
                self.engine.change_direction(&mut self.state, direction);
            }
            Command::Start => match self.state.phase {
                Phase::Idle => self.start_game(),
                Phase::GameOver(_) => {
                    self.reset_game();
                    self.start_game();
                }
                _ => {}
            },
            Command::TogglePause => {
                let was_paused = self.state.phase == Phase::Paused;
                self.engine.toggle_pause(&mut self.state);

                // Re-arm the timer on resume so the first tick after a
                // pause comes a full interval later
                if was_paused && self.state.is_running() {
                    self.retime = true;
                }
            }
            Command::Reset => self.reset_game(),
            Command::Quit => self.should_quit = true,
            Command::None => {}
        }
    }

    fn on_tick(&mut self) {
        let outcome = self.engine.tick(&mut self.state);

        if outcome.interval_changed {
            self.retime = true;
        }

        if outcome.ended.is_some() {
            self.finish_game();
        }
    }

    fn start_game(&mut self) {
        self.engine.start(&mut self.state);
        self.stats.on_game_start();
        self.retime = true;
    }

    fn reset_game(&mut self) {
        self.state = self.engine.reset();
        self.retime = true;
    }

    fn finish_game(&mut self) {
        self.stats.on_game_over();

        // A failed write must not take down the game; the score still
        // shows on screen
        let _ = self.store.record(self.state.score);
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

fn make_tick_timer(period: Duration) -> Interval {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
