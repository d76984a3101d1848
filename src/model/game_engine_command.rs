#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEngineCommand {
    /// Re-emit the full progress and puzzle state.
    InitDisplay,
    /// Pick the pooled letter at this zero-based position.
    PickLetter(usize),
    /// Pick the first pooled letter matching this one.
    PickChar(char),
    Undo,
    Submit,
    BuyHint,
    BuyHeart,
    /// Advance the heart regeneration countdown to the current time.
    Tick,
    ResetProgress,
}
