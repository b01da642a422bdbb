use super::{
    config::GameConfig,
    direction::Direction,
    state::{GameOverCause, GameState, Phase, Position, Snake},
};
use rand::Rng;
use std::time::Duration;

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Whether the snake ate food this tick
    pub ate_food: bool,
    /// Why the game ended, if it did
    pub ended: Option<GameOverCause>,
    /// Whether the tick interval changed; the host must re-arm its timer
    pub interval_changed: bool,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: rand::rngs::ThreadRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: rand::thread_rng(),
        }
    }

    /// Build a fresh Idle game: single-segment snake at the grid centre,
    /// no heading, zero score, base tick interval.
    pub fn reset(&mut self) -> GameState {
        let center = Position::new(
            (self.config.grid_width / 2) as i32,
            (self.config.grid_height / 2) as i32,
        );
        let snake = Snake::spawn(center);

        // A fresh board always has free cells
        let food = self
            .spawn_food(&snake)
            .unwrap_or(Position::new(0, 0));

        GameState::new(
            snake,
            food,
            self.config.grid_width,
            self.config.grid_height,
            self.config.initial_tick_interval(),
        )
    }

    /// Idle -> Running. A snake that has never moved heads right.
    /// No-op in any other phase.
    pub fn start(&mut self, state: &mut GameState) {
        if state.phase != Phase::Idle {
            return;
        }

        if state.heading.is_none() {
            state.heading = Some(Direction::Right);
        }
        state.phase = Phase::Running;
    }

    /// Running <-> Paused. No-op in Idle or GameOver.
    pub fn toggle_pause(&mut self, state: &mut GameState) {
        state.phase = match state.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            other => other,
        };
    }

    /// Record a requested direction to apply at the next tick.
    ///
    /// Dropped silently unless the game is Running, and rejected if it
    /// would reverse the heading applied on the previous tick.
    pub fn change_direction(&mut self, state: &mut GameState, direction: Direction) {
        if !state.is_running() {
            return;
        }

        if let Some(heading) = state.heading {
            if heading.is_opposite(direction) {
                return;
            }
        }

        state.pending = Some(direction);
    }

    /// Advance the game by one tick. No-op unless Running.
    pub fn tick(&mut self, state: &mut GameState) -> TickOutcome {
        if !state.is_running() {
            return TickOutcome::default();
        }

        if let Some(pending) = state.pending.take() {
            state.heading = Some(pending);
        }

        let Some(heading) = state.heading else {
            // Running implies a heading; treat the impossible as a no-op
            return TickOutcome::default();
        };

        let new_head = state.snake.head().moved_in_direction(heading);

        if let Some(cause) = self.check_collision(state, new_head) {
            state.phase = Phase::GameOver(cause);
            return TickOutcome {
                ended: Some(cause),
                ..Default::default()
            };
        }

        let ate_food = new_head == state.food;
        state.snake.advance(new_head, ate_food);

        let mut outcome = TickOutcome {
            ate_food,
            ..Default::default()
        };

        if ate_food {
            state.score += self.config.points_per_food;
            state.foods_eaten += 1;

            if state.foods_eaten % self.config.foods_per_speedup == 0 {
                outcome.interval_changed = self.speed_up(state);
            }

            match self.spawn_food(&state.snake) {
                Some(food) => state.food = food,
                None => {
                    // Snake fills the grid; nowhere left to eat
                    state.phase = Phase::GameOver(GameOverCause::BoardFull);
                    outcome.ended = Some(GameOverCause::BoardFull);
                }
            }
        }

        outcome
    }

    /// Shorten the tick interval by one step, floored. Returns true if
    /// the interval actually changed.
    fn speed_up(&self, state: &mut GameState) -> bool {
        let current = state.tick_interval;
        let floor = Duration::from_millis(self.config.min_tick_ms);
        let step = Duration::from_millis(self.config.speedup_step_ms);

        let next = current.saturating_sub(step).max(floor);
        state.tick_interval = next;
        next != current
    }

    /// Check if the new head position ends the game
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<GameOverCause> {
        if !state.is_in_bounds(pos) {
            return Some(GameOverCause::Wall);
        }

        if state.snake.collides_with_body(pos) {
            return Some(GameOverCause::SelfCollision);
        }

        None
    }

    /// Pick a uniformly random free cell, or None if the snake covers
    /// the whole grid.
    fn spawn_food(&mut self, snake: &Snake) -> Option<Position> {
        let free: Vec<Position> = (0..self.config.grid_height as i32)
            .flat_map(|y| (0..self.config.grid_width as i32).map(move |x| Position::new(x, y)))
            .filter(|pos| !snake.body.contains(pos))
            .collect();

        if free.is_empty() {
            return None;
        }

        Some(free[self.rng.gen_range(0..free.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_game(engine: &mut GameEngine) -> GameState {
        let mut state = engine.reset();
        engine.start(&mut state);
        state
    }

    #[test]
    fn test_reset() {
        let mut engine = GameEngine::new(GameConfig::default());
        let state = engine.reset();

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.score, 0);
        assert_eq!(state.foods_eaten, 0);
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.snake.head(), Position::new(10, 10));
        assert_eq!(state.heading, None);
        assert_eq!(state.tick_interval, Duration::from_millis(300));
        assert_ne!(state.food, state.snake.head());
    }

    #[test]
    fn test_start_defaults_heading_right() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = engine.reset();

        engine.start(&mut state);

        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.heading, Some(Direction::Right));
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = running_game(&mut engine);

        state.phase = Phase::GameOver(GameOverCause::Wall);
        engine.start(&mut state);
        assert_eq!(state.phase, Phase::GameOver(GameOverCause::Wall));
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = running_game(&mut engine);
        let initial_head = state.snake.head();

        // Keep the test deterministic: food out of the path
        state.food = Position::new(0, 0);

        let outcome = engine.tick(&mut state);

        assert_eq!(outcome.ended, None);
        assert!(!outcome.ate_food);
        assert_eq!(state.snake.head(), initial_head.moved_in_direction(Direction::Right));
        assert_eq!(state.snake.len(), 1);
    }

    #[test]
    fn test_tick_is_noop_unless_running() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = engine.reset();
        let before = state.clone();

        engine.tick(&mut state);
        assert_eq!(state, before);

        engine.start(&mut state);
        engine.toggle_pause(&mut state);
        let paused = state.clone();
        engine.tick(&mut state);
        assert_eq!(state, paused);
    }

    #[test]
    fn test_pause_toggles() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = engine.reset();

        // Not running yet: toggling does nothing
        engine.toggle_pause(&mut state);
        assert_eq!(state.phase, Phase::Idle);

        engine.start(&mut state);
        engine.toggle_pause(&mut state);
        assert_eq!(state.phase, Phase::Paused);
        engine.toggle_pause(&mut state);
        assert_eq!(state.phase, Phase::Running);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = running_game(&mut engine);

        // Place food directly in front of the snake
        state.food = state.snake.head().moved_in_direction(Direction::Right);
        let initial_length = state.snake.len();

        let outcome = engine.tick(&mut state);

        assert!(outcome.ate_food);
        assert_eq!(state.score, 10);
        assert_eq!(state.foods_eaten, 1);
        assert_eq!(state.snake.len(), initial_length + 1);
        assert!(!state.is_occupied_by_snake(state.food));
    }

    #[test]
    fn test_score_stays_multiple_of_ten() {
        let mut engine = GameEngine::new(GameConfig::new(30, 30));
        let mut state = running_game(&mut engine);

        for _ in 0..7 {
            // Food is always one cell ahead, so every tick scores
            let heading = state.heading.unwrap();
            state.food = state.snake.head().moved_in_direction(heading);
            engine.tick(&mut state);
            assert_eq!(state.score % 10, 0);
        }
        assert_eq!(state.score, 70);
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = running_game(&mut engine);
        state.snake = Snake::spawn(Position::new(9, 5));
        state.food = Position::new(0, 0);

        let outcome = engine.tick(&mut state);

        assert_eq!(outcome.ended, Some(GameOverCause::Wall));
        assert_eq!(state.phase, Phase::GameOver(GameOverCause::Wall));
        // The snake does not move into the wall
        assert_eq!(state.snake.head(), Position::new(9, 5));
    }

    #[test]
    fn test_self_collision() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = running_game(&mut engine);

        // Body: (5,5), (4,5), (3,5), (2,5), heading Right
        state.snake = Snake::with_length(Position::new(5, 5), Direction::Right, 4);
        state.food = Position::new(9, 9);

        // Right: (6,5) ...
        engine.tick(&mut state);
        // Down: (6,6) ...
        engine.change_direction(&mut state, Direction::Down);
        engine.tick(&mut state);
        // Left: (5,6) ...
        engine.change_direction(&mut state, Direction::Left);
        engine.tick(&mut state);
        // Up into (5,5), still occupied by the tail end of the body
        engine.change_direction(&mut state, Direction::Up);
        let outcome = engine.tick(&mut state);

        assert_eq!(outcome.ended, Some(GameOverCause::SelfCollision));
        assert!(state.is_game_over());
    }

    #[test]
    fn test_reversal_rejected() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = running_game(&mut engine);
        assert_eq!(state.heading, Some(Direction::Right));

        engine.change_direction(&mut state, Direction::Left);
        assert_eq!(state.pending, None);

        engine.change_direction(&mut state, Direction::Up);
        assert_eq!(state.pending, Some(Direction::Up));
    }

    #[test]
    fn test_direction_ignored_when_not_running() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = engine.reset();

        engine.change_direction(&mut state, Direction::Up);
        assert_eq!(state.pending, None);

        engine.start(&mut state);
        engine.toggle_pause(&mut state);
        engine.change_direction(&mut state, Direction::Up);
        assert_eq!(state.pending, None);
    }

    #[test]
    fn test_pending_applies_at_tick() {
        let mut engine = GameEngine::new(GameConfig::small());
        let mut state = running_game(&mut engine);
        state.food = Position::new(0, 0);
        let head = state.snake.head();

        engine.change_direction(&mut state, Direction::Down);
        engine.tick(&mut state);

        assert_eq!(state.heading, Some(Direction::Down));
        assert_eq!(state.snake.head(), head.moved_in_direction(Direction::Down));
        assert_eq!(state.pending, None);
    }

    #[test]
    fn test_every_fifth_food_speeds_up() {
        let mut engine = GameEngine::new(GameConfig::new(30, 30));
        let mut state = running_game(&mut engine);
        let base = state.tick_interval;

        for i in 1..=10u32 {
            let heading = state.heading.unwrap();
            state.food = state.snake.head().moved_in_direction(heading);
            engine.tick(&mut state);

            let expected_steps = i / 5;
            assert_eq!(
                state.tick_interval,
                base - Duration::from_millis(10) * expected_steps,
                "after {i} foods"
            );
        }
    }

    #[test]
    fn test_speed_never_drops_below_floor() {
        let config = GameConfig::small();
        let floor = Duration::from_millis(config.min_tick_ms);
        let mut engine = GameEngine::new(config);
        let mut state = running_game(&mut engine);

        state.tick_interval = Duration::from_millis(55);
        state.foods_eaten = 4;
        state.food = state.snake.head().moved_in_direction(Direction::Right);

        let outcome = engine.tick(&mut state);
        assert!(outcome.interval_changed);
        assert_eq!(state.tick_interval, floor);

        // Already at the floor: no further change reported
        state.foods_eaten = 9;
        state.food = state.snake.head().moved_in_direction(state.heading.unwrap());
        let outcome = engine.tick(&mut state);
        assert!(!outcome.interval_changed);
        assert_eq!(state.tick_interval, floor);
    }

    #[test]
    fn test_food_never_spawns_on_snake() {
        let mut engine = GameEngine::new(GameConfig::new(5, 5));

        for _ in 0..50 {
            let mut state = running_game(&mut engine);
            state.snake = Snake::with_length(Position::new(4, 2), Direction::Right, 5);
            state.food = state.snake.head().moved_in_direction(Direction::Down);
            engine.change_direction(&mut state, Direction::Down);
            engine.tick(&mut state);

            assert!(!state.is_occupied_by_snake(state.food));
        }
    }

    #[test]
    fn test_board_full_ends_game() {
        let mut engine = GameEngine::new(GameConfig::new(2, 2));
        let mut state = running_game(&mut engine);

        // Snake occupies three of four cells, food on the last one;
        // heading Right from (0,0) eats it and fills the board
        state.snake = Snake {
            body: vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 1),
            ],
        };
        state.food = Position::new(1, 0);

        let outcome = engine.tick(&mut state);

        assert!(outcome.ate_food);
        assert_eq!(outcome.ended, Some(GameOverCause::BoardFull));
        assert_eq!(state.phase, Phase::GameOver(GameOverCause::BoardFull));
    }
}
