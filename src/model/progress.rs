use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use super::HeartRegen;
use crate::game::storage::{keys, KeyValueStore, StorageError};

pub const MAX_HEARTS: u8 = 5;
pub const MAX_HINTS_PER_LEVEL: u8 = 3;
/// Highest level index accepted from storage.
pub const MAX_LEVEL: usize = u32::MAX as usize;

/// Per-level hint usage as it is written to storage: `{"0": {"count": 2}}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct HintUsageRecord {
    count: u8,
}

/// Everything about the player that survives a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub level: usize,
    pub coins: u32,
    pub hearts: u8,
    /// Fastest solve, in whole seconds.
    pub best_time: Option<u64>,
    pub hint_usage: BTreeMap<usize, u8>,
    pub heart_regen: HeartRegen,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: 0,
            coins: 0,
            hearts: MAX_HEARTS,
            best_time: None,
            hint_usage: BTreeMap::new(),
            heart_regen: HeartRegen::idle(),
        }
    }
}

impl Progress {
    pub fn hints_used(&self, level: usize) -> u8 {
        self.hint_usage.get(&level).copied().unwrap_or(0)
    }

    pub fn has_hearts(&self) -> bool {
        self.hearts > 0
    }

    /// Reads progress from `store`. Missing or malformed values fall back to their defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();

        let mut level = parse_or(store, keys::LEVEL, defaults.level);
        if level > MAX_LEVEL {
            warn!(target: "storage", "Clamping stored level {} to {}", level, MAX_LEVEL);
            level = MAX_LEVEL;
        }
        let coins = parse_or(store, keys::COINS, defaults.coins);
        let hearts = parse_or(store, keys::HEARTS, defaults.hearts).min(MAX_HEARTS);
        let best_time = store
            .get(keys::TOP_TIME)
            .and_then(|value| value.trim().parse::<u64>().ok());

        let hint_usage = store
            .get(keys::USED_HINTS)
            .and_then(|json| {
                serde_json::from_str::<BTreeMap<usize, HintUsageRecord>>(&json)
                    .map_err(|err| warn!(target: "storage", "Ignoring unreadable hint usage: {}", err))
                    .ok()
            })
            .map(|records| {
                records
                    .into_iter()
                    .filter(|(_, record)| record.count > 0)
                    .map(|(level, record)| (level, record.count.min(MAX_HINTS_PER_LEVEL)))
                    .collect()
            })
            .unwrap_or_default();

        let last_heart_lost_at = store
            .get(keys::LAST_HEART_USED_AT)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(|millis| UNIX_EPOCH + Duration::from_millis(millis));
        let seconds_remaining = parse_or(store, keys::HEART_REGEN_SECONDS, 0u32);

        let progress = Self {
            level,
            coins,
            hearts,
            best_time,
            hint_usage,
            heart_regen: HeartRegen {
                last_heart_lost_at,
                seconds_remaining,
            },
        };
        trace!(target: "storage", "Loaded progress {:?}", progress);
        progress
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let hint_usage: BTreeMap<usize, HintUsageRecord> = self
            .hint_usage
            .iter()
            .map(|(level, count)| (*level, HintUsageRecord { count: *count }))
            .collect();

        let last_heart_used_at = self.heart_regen.last_heart_lost_at.map(|timestamp| {
            timestamp
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis()
                .to_string()
        });

        let mut changes = vec![
            (keys::LEVEL, Some(self.level.to_string())),
            (keys::COINS, Some(self.coins.to_string())),
            (keys::HEARTS, Some(self.hearts.to_string())),
            (keys::USED_HINTS, Some(serde_json::to_string(&hint_usage)?)),
            (
                keys::HEART_REGEN_SECONDS,
                Some(self.heart_regen.seconds_remaining.to_string()),
            ),
            (keys::LAST_HEART_USED_AT, last_heart_used_at),
        ];
        if let Some(best_time) = self.best_time {
            changes.push((keys::TOP_TIME, Some(best_time.to_string())));
        }
        store.apply(changes)
    }

    /// Seconds until the next heart, or `None` while hearts are full.
    pub fn regen_countdown(&self) -> Option<u32> {
        (self.hearts < MAX_HEARTS).then_some(self.heart_regen.seconds_remaining)
    }

    pub fn last_heart_lost_at(&self) -> Option<SystemTime> {
        self.heart_regen.last_heart_lost_at
    }
}

fn parse_or<T: std::str::FromStr>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    match store.get(key) {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(target: "storage", "Ignoring unreadable value for {}: {:?}", key, value);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::storage::MemoryStore;

    #[test]
    fn test_empty_store_loads_defaults() {
        let store = MemoryStore::default();
        assert_eq!(Progress::load(&store), Progress::default());
    }

    #[test]
    fn test_save_then_load_keeps_progress() {
        let mut store = MemoryStore::default();
        let lost_at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        let progress = Progress {
            level: 4,
            coins: 250,
            hearts: 0,
            best_time: Some(12),
            hint_usage: BTreeMap::from([(1, 2), (4, 3)]),
            heart_regen: HeartRegen {
                last_heart_lost_at: Some(lost_at),
                seconds_remaining: 120,
            },
        };

        progress.save(&mut store).unwrap();

        assert_eq!(store.get(keys::HEARTS).as_deref(), Some("0"));
        assert_eq!(
            store.get(keys::LAST_HEART_USED_AT).as_deref(),
            Some("1700000000123")
        );
        assert_eq!(Progress::load(&store), progress);
    }

    #[test]
    fn test_hint_usage_uses_count_records() {
        let mut store = MemoryStore::default();
        let progress = Progress {
            hint_usage: BTreeMap::from([(2, 1)]),
            ..Progress::default()
        };

        progress.save(&mut store).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&store.get(keys::USED_HINTS).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"2": {"count": 1}}));
    }

    #[test]
    fn test_out_of_range_values_are_clamped_or_ignored() {
        let mut store = MemoryStore::default();
        store.set(keys::HEARTS, "9".to_string()).unwrap();
        store.set(keys::COINS, "lots".to_string()).unwrap();
        store
            .set(keys::USED_HINTS, r#"{"0":{"count":7}}"#.to_string())
            .unwrap();

        let progress = Progress::load(&store);

        assert_eq!(progress.hearts, MAX_HEARTS);
        assert_eq!(progress.coins, 0);
        assert_eq!(progress.hints_used(0), MAX_HINTS_PER_LEVEL);
    }

    #[test]
    fn test_huge_stored_level_is_clamped() {
        let mut store = MemoryStore::default();
        store.set(keys::LEVEL, usize::MAX.to_string()).unwrap();

        assert_eq!(Progress::load(&store).level, MAX_LEVEL);
    }

    #[test]
    fn test_full_hearts_remove_loss_timestamp() {
        let mut store = MemoryStore::default();
        store
            .set(keys::LAST_HEART_USED_AT, "1700000000000".to_string())
            .unwrap();

        Progress::default().save(&mut store).unwrap();

        assert_eq!(store.get(keys::LAST_HEART_USED_AT), None);
    }
}
