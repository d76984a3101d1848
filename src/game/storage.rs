use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{trace, warn};

/// Name of the file-backed store inside the data directory.
pub const STORAGE_FILE: &str = "storage.json";

pub mod keys {
    pub const LEVEL: &str = "level";
    pub const COINS: &str = "coins";
    pub const HEARTS: &str = "hearts";
    pub const USED_HINTS: &str = "usedHints";
    pub const HEART_REGEN_SECONDS: &str = "heartRegenSeconds";
    pub const LAST_HEART_USED_AT: &str = "lastHeartUsedAt";
    pub const TOP_TIME: &str = "topTime";
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed stored JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat string key/value storage, the only persistence the game relies on.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;

    /// Applies a batch of changes; `None` removes the key.
    fn apply(&mut self, changes: Vec<(&str, Option<String>)>) -> Result<(), StorageError> {
        for (key, value) in changes {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }
}

/// Keeps every pair in one JSON object file and rewrites it on each change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    #[cfg(test)]
    flushes: usize,
}

impl FileStore {
    /// Opens the store at `path`. An unreadable file is treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(target: "storage", "Discarding unreadable store {:?}: {}", path, err);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        trace!(target: "storage", "Opened {:?} with {} keys", path, entries.len());
        Self {
            path,
            entries,
            #[cfg(test)]
            flushes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a sibling temp file and renames it over the store, so readers never see a partial file.
    fn flush(&mut self) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, contents)?;
        fs::rename(&staging, &self.path)?;
        #[cfg(test)]
        {
            self.flushes += 1;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if self.entries.get(key) == Some(&value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.flush()
    }

    fn apply(&mut self, changes: Vec<(&str, Option<String>)>) -> Result<(), StorageError> {
        let mut changed = false;
        for (key, value) in changes {
            changed |= match value {
                Some(value) => self.entries.insert(key.to_string(), value.clone()) != Some(value),
                None => self.entries.remove(key).is_some(),
            };
        }
        if changed {
            self.flush()?;
        }
        Ok(())
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}
