use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::storage::StorageError;

const APP_DIR: &str = "word-jumble";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_version")]
    version: u32,

    /// Ring the terminal bell for click, correct and wrong sounds.
    #[serde(default = "default_true")]
    pub sound_enabled: bool,

    /// Show the "under development" notice at start.
    #[serde(default = "default_true")]
    pub show_welcome: bool,

    /// Replacement word lists; the built-in lists are used when unset.
    #[serde(default)]
    pub word_list_path: Option<PathBuf>,
}

// Helper functions for default values
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: default_version(),
            sound_enabled: true,
            show_welcome: true,
            word_list_path: None,
        }
    }
}

impl Settings {
    /// Loads settings from `data_dir`, writing the defaults out when none exist yet.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::settings_path(data_dir);
        if let Ok(contents) = fs::read_to_string(&path) {
            if let Ok(mut settings) = serde_json::from_str::<Settings>(&contents) {
                settings.migrate();
                return settings;
            }
            log::warn!(target: "settings", "Ignoring unreadable settings at {:?}", path);
        }
        let default = Settings::default();
        if let Err(err) = default.save(data_dir) {
            log::warn!(target: "settings", "Could not write default settings: {}", err);
        }
        default
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), StorageError> {
        fs::create_dir_all(data_dir)?;
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(Self::settings_path(data_dir), contents)?;
        Ok(())
    }

    fn settings_path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    fn migrate(&mut self) {
        if self.version == 0 {
            self.version = 1;
        }
    }

    /// `WORD_JUMBLE_DATA_DIR` when set, otherwise `word-jumble` under the platform's
    /// per-user data directory.
    pub fn data_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os("WORD_JUMBLE_DATA_DIR").filter(|dir| !dir.is_empty()) {
            return PathBuf::from(dir);
        }
        match dirs::data_dir() {
            Some(dir) => dir.join(APP_DIR),
            None => {
                log::warn!(target: "settings", "No user data directory; using the working directory");
                PathBuf::from(format!(".{}", APP_DIR))
            }
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.trim().parse::<u64>().ok())
    }
}
