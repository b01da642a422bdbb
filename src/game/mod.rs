//! Core game logic for Snake
//!
//! Everything in here is pure state manipulation with no I/O or rendering
//! dependencies, so the whole game can be driven and tested synchronously.

pub mod config;
pub mod direction;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use config::GameConfig;
pub use direction::Direction;
pub use engine::{GameEngine, TickOutcome};
pub use state::{GameOverCause, GameState, Phase, Position, Snake};
