use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Base speed setting; higher means a shorter initial tick interval
    pub base_speed: u64,
    /// Points awarded per food eaten
    pub points_per_food: u32,
    /// Number of foods between speed-ups
    pub foods_per_speedup: u32,
    /// Milliseconds shaved off the tick interval at each speed-up
    pub speedup_step_ms: u64,
    /// Shortest allowed tick interval in milliseconds
    pub min_tick_ms: u64,
    /// Longest allowed tick interval in milliseconds
    pub max_tick_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            base_speed: 50,
            points_per_food: 10,
            foods_per_speedup: 5,
            speedup_step_ms: 10,
            min_tick_ms: 50,
            max_tick_ms: 300,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// The tick interval a fresh game starts with.
    ///
    /// Derived from the base speed: a base of 50 gives 300 ms per tick,
    /// clamped so extreme settings stay playable.
    pub fn initial_tick_interval(&self) -> Duration {
        let ms = 350u64
            .saturating_sub(self.base_speed)
            .clamp(self.min_tick_ms, self.max_tick_ms);
        Duration::from_millis(ms)
    }

    /// Total number of cells in the grid
    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }
}
