pub mod clock;
pub mod game_engine;
pub mod puzzle_generator;
pub mod settings;
pub mod stats_manager;
pub mod storage;

pub use clock::{Clock, SystemClock};
pub use game_engine::{EngineOptions, GameEngine, HEART_PRICE, HINT_PRICE, SOLVE_REWARD};
pub use settings::Settings;
pub use stats_manager::StatsManager;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, STORAGE_FILE};
