//! Persistent high score
//!
//! One non-negative integer survives across sessions, stored as a tiny
//! JSON file under a fixed key. A missing or unreadable file reads as 0.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the high-score file, relative to the working directory
pub const DEFAULT_HIGH_SCORE_FILE: &str = "snake_high_score.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SaveData {
    high_score: u32,
}

/// Loads the high score once at startup and writes it back only when a
/// finished game beats it.
pub struct HighScoreStore {
    path: PathBuf,
    high_score: u32,
}

impl HighScoreStore {
    /// Open the store at `path`, reading the current high score if the
    /// file exists
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let high_score = read_save(&path).unwrap_or_default().high_score;
        Self { path, high_score }
    }

    /// The best score seen so far, including past sessions
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Record a finished game's score. The file is written only when the
    /// score beats the stored value; returns true if it did.
    pub fn record(&mut self, score: u32) -> Result<bool> {
        if score <= self.high_score {
            return Ok(false);
        }

        self.high_score = score;
        let json = serde_json::to_string_pretty(&SaveData { high_score: score })
            .context("Failed to serialize high score")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(true)
    }
}

fn read_save(path: &Path) -> Option<SaveData> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn temp_store_path(tag: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "snake_tui_test_{}_{}_{}.json",
            tag,
            std::process::id(),
            n
        ))
    }

    #[test]
    fn test_missing_file_reads_as_zero() {
        let store = HighScoreStore::open(temp_store_path("missing"));
        assert_eq!(store.high_score(), 0);
    }

    #[test]
    fn test_corrupt_file_reads_as_zero() {
        let path = temp_store_path("corrupt");
        fs::write(&path, "not json").unwrap();

        let store = HighScoreStore::open(&path);
        assert_eq!(store.high_score(), 0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_record_persists_only_improvements() {
        let path = temp_store_path("record");

        let mut store = HighScoreStore::open(&path);
        assert!(store.record(30).unwrap());
        assert!(!store.record(20).unwrap());
        assert!(!store.record(30).unwrap());
        assert_eq!(store.high_score(), 30);

        // A fresh store sees the persisted value
        let reopened = HighScoreStore::open(&path);
        assert_eq!(reopened.high_score(), 30);

        let _ = fs::remove_file(&path);
    }
}
