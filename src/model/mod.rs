mod game_engine_command;
mod game_engine_event;
mod game_stats;
mod heart_regen;
mod hint;
mod input_event;
mod progress;
mod puzzle;
mod word_levels;

pub use game_engine_command::GameEngineCommand;
pub use game_engine_event::{
    GameEngineEvent, InputRejection, ProgressView, Purchase, PurchaseDecline, PuzzleView,
    SoundCue,
};
pub use game_stats::{GameStats, GlobalStats};
pub use heart_regen::{HeartRegen, HEART_REGEN_TIME};
pub use hint::Hint;
pub use input_event::{InputEvent, UiEvent};
pub use progress::{Progress, MAX_HEARTS, MAX_HINTS_PER_LEVEL, MAX_LEVEL};
pub use puzzle::{Puzzle, PLACEHOLDER_WORD};
pub use word_levels::WordLevels;
