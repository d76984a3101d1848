/// Raw input reaching the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A line typed at the prompt.
    Line(String),
    /// The one-second interval timer fired.
    Tick,
}

/// Requests handled by the front end itself rather than the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ShowHelp,
    ShowStats,
    Quit,
    UnknownInput(String),
}
