use super::{GameStats, Hint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Click,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRejection {
    /// Submitted before every letter was picked.
    Incomplete { selected: usize, required: usize },
    NoHeartsLeft,
    NoSuchLetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    Hint,
    Heart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseDecline {
    NotEnoughCoins { coins: u32, price: u32 },
    HintLimitReached,
    HeartsFull,
}

/// What the front end needs to draw the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub level: usize,
    pub coins: u32,
    pub hearts: u8,
    pub max_hearts: u8,
    /// Seconds until the next heart; `None` while hearts are full.
    pub regen_seconds: Option<u32>,
    pub best_time: Option<u64>,
}

/// What the front end needs to draw the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleView {
    pub level: usize,
    pub shuffled: Vec<char>,
    pub guess: Vec<char>,
    pub word_length: usize,
    pub hints_used: u8,
    pub max_hints: u8,
    pub hints: Vec<Hint>,
    pub is_placeholder: bool,
    /// Only filled in debug mode.
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEngineEvent {
    ProgressUpdated(ProgressView),
    PuzzleUpdated(PuzzleView),
    InputRejected(InputRejection),
    PuzzleSolved {
        stats: GameStats,
        reward: u32,
        new_best: bool,
    },
    WrongGuess {
        hearts: u8,
    },
    HeartsRestored {
        restored: u8,
        hearts: u8,
    },
    PurchaseDeclined(Purchase, PurchaseDecline),
    ProgressReset,
    SoundCue(SoundCue),
}
