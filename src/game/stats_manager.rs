use crate::model::{GameStats, GlobalStats};
use log::{trace, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::storage::StorageError;

const HIGH_SCORE_LIMIT: usize = 20;

/// Keeps the fastest solves and running totals in the data directory.
#[derive(Debug)]
pub struct StatsManager {
    data_dir: PathBuf,
    scores: Vec<GameStats>,
    global_stats: GlobalStats,
}

impl StatsManager {
    pub fn new(data_dir: &Path) -> Self {
        let mut manager = Self {
            data_dir: data_dir.to_path_buf(),
            scores: Vec::new(),
            global_stats: GlobalStats::default(),
        };
        manager.load_all();
        manager
    }

    fn scores_path(&self) -> PathBuf {
        self.data_dir.join("scores.json")
    }

    fn global_stats_path(&self) -> PathBuf {
        self.data_dir.join("global_stats.json")
    }

    fn load_all(&mut self) {
        if let Ok(contents) = fs::read_to_string(self.scores_path()) {
            match serde_json::from_str(&contents) {
                Ok(scores) => self.scores = scores,
                Err(err) => warn!(target: "stats", "Ignoring unreadable scores: {}", err),
            }
        }

        if let Ok(contents) = fs::read_to_string(self.global_stats_path()) {
            match serde_json::from_str(&contents) {
                Ok(stats) => self.global_stats = stats,
                Err(err) => warn!(target: "stats", "Ignoring unreadable global stats: {}", err),
            }
        }
    }

    fn save(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)?;
        fs::write(
            self.scores_path(),
            serde_json::to_string_pretty(&self.scores)?,
        )?;
        fs::write(
            self.global_stats_path(),
            serde_json::to_string_pretty(&self.global_stats)?,
        )?;
        Ok(())
    }

    pub fn record_game(&mut self, stats: &GameStats) -> Result<(), StorageError> {
        trace!(target: "stats", "Recording {:?}", stats);
        self.scores.push(stats.clone());
        // stable sort keeps the earlier record first on ties
        self.scores.sort_by_key(|score| score.completion_time);
        self.scores.truncate(HIGH_SCORE_LIMIT);

        self.global_stats.total_puzzles_solved += 1;
        self.global_stats.total_time_played += stats.completion_time;
        self.global_stats.total_hints_used += u32::from(stats.hints_used);

        self.save()
    }

    pub fn get_high_scores(&self, limit: usize) -> Vec<GameStats> {
        self.scores.iter().take(limit).cloned().collect()
    }

    pub fn get_global_stats(&self) -> GlobalStats {
        self.global_stats.clone()
    }
}
