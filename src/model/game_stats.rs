use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::{DurationSeconds, TimestampSeconds};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct GameStats {
    #[serde_as(as = "DurationSeconds<u64>")]
    pub completion_time: Duration,
    pub hints_used: u8,
    pub level: usize,
    pub word_length: usize,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub solved_at: SystemTime,
    pub playthrough_id: Uuid,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Default, Eq, PartialEq)]
pub struct GlobalStats {
    pub total_puzzles_solved: u32,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub total_time_played: Duration,
    pub total_hints_used: u32,
}
