use std::time::{Duration, Instant};

/// Per-session play statistics shown in the header. The persistent high
/// score lives in [`crate::storage`]; this only tracks the current run
/// of the program.
pub struct SessionStats {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub games_played: u32,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            games_played: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self) {
        self.games_played += 1;
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
