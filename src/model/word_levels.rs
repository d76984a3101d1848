use std::fs;
use std::path::Path;

use log::{error, trace};
use serde::{Deserialize, Serialize};

use crate::game::storage::StorageError;

const BUILTIN_WORD_LEVELS: &str = include_str!("../../data/word_levels.json");

/// Word lists indexed by level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordLevels {
    levels: Vec<Vec<String>>,
}

impl WordLevels {
    pub fn new(levels: Vec<Vec<String>>) -> Self {
        Self { levels }
    }

    /// The lists shipped with the game.
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_WORD_LEVELS).unwrap_or_else(|err| {
            error!(target: "word_levels", "Built-in word lists are unreadable: {}", err);
            Self::default()
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, StorageError> {
        let contents = fs::read_to_string(path)?;
        let levels: Self = serde_json::from_str(&contents)?;
        trace!(target: "word_levels", "Loaded {} levels from {:?}", levels.len(), path);
        Ok(levels)
    }

    /// Words for `level`; empty when the level has none.
    pub fn words_for(&self, level: usize) -> &[String] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
