use std::time::Duration;

use super::direction::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0; insertion order is movement order
    pub body: Vec<Position>,
}

impl Snake {
    /// Create a single-segment snake, as a fresh game starts with
    pub fn spawn(head: Position) -> Self {
        Self { body: vec![head] }
    }

    /// Create a snake of a given length trailing away from the direction
    /// of travel. Used by tests that need a body to collide with.
    pub fn with_length(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];
        let (dx, dy) = direction.delta();

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(-dx, -dy));
        }

        Self { body }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// Advance the head one cell, growing if `grow` is true
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// No free cell left to place food on
    BoardFull,
}

/// Where the game sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting to start; the snake has no heading yet
    Idle,
    /// Ticks advance the snake
    Running,
    /// Frozen mid-game; resumable
    Paused,
    /// Terminal until reset
    GameOver(GameOverCause),
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    /// Direction applied on the most recent tick; None until the game starts
    pub heading: Option<Direction>,
    /// Direction requested since the last tick, applied at the next one
    pub pending: Option<Direction>,
    pub phase: Phase,
    pub score: u32,
    pub foods_eaten: u32,
    /// Delay between ticks; shrinks as food is eaten
    pub tick_interval: Duration,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl GameState {
    pub fn new(
        snake: Snake,
        food: Position,
        grid_width: usize,
        grid_height: usize,
        tick_interval: Duration,
    ) -> Self {
        Self {
            snake,
            food,
            heading: None,
            pending: None,
            phase: Phase::Idle,
            score: 0,
            foods_eaten: 0,
            tick_interval,
            grid_width,
            grid_height,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.body.contains(&pos)
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }
}
