pub mod input_translator;
pub mod stats_view;
pub mod terminal_ui;

pub use input_translator::InputTranslator;
pub use stats_view::StatsView;
pub use terminal_ui::TerminalUi;
