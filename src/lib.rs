//! Snake TUI - a grid-based snake arcade game for the terminal
//!
//! This library provides:
//! - Core game logic: movement, collisions, growth, speed scaling (game module)
//! - The async event/tick/render loop that owns the terminal (app module)
//! - ratatui rendering (render module)
//! - Keyboard command mapping (input module)
//! - Persistent high score (storage module)

pub mod app;
pub mod game;
pub mod input;
pub mod render;
pub mod session;
pub mod storage;
