use itertools::Itertools;
use log::{error, trace};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::destroyable::Destroyable;
use crate::events::{EventObserver, Unsubscriber};
use crate::game::settings::Settings;
use crate::game::stats_manager::StatsManager;
use crate::helpers::format_time;
use crate::model::{
    GameEngineEvent, InputRejection, ProgressView, Purchase, PurchaseDecline, PuzzleView,
    SoundCue, UiEvent,
};
use crate::ui::stats_view::StatsView;

const BELL: &str = "\x07";

pub const WELCOME_TEXT: &str = "\
🚧 Site Under Development
This game is currently in development. Some features may change or be unstable.";

pub const HELP_TEXT: &str = "\
Type letters (or a whole word) to pick them, or a number to pick the letter at that position.
A word using exactly the letters left is always read as letters; put ! in front of a command
to force it (for example !reset).
  undo     put the last picked letter back
  submit   check your guess
  hint     buy a hint (100 coins, 3 per level)
  heart    buy a heart (100 coins)
  status   show the board again
  stats    show your fastest solves
  reset    start over from level 1
  quit     leave the game";

pub fn render_progress(progress: &ProgressView) -> String {
    let mut lines = vec![format!(
        "Level {}   ❤️ {}/{}   💰 {}",
        progress.level.saturating_add(1),
        progress.hearts,
        progress.max_hearts,
        progress.coins
    )];
    if let Some(best_time) = progress.best_time {
        lines.push(format!("⏱ Fastest: {}s", best_time));
    }
    if let Some(seconds) = progress.regen_seconds {
        lines.push(format!("Hearts regenerate in: {}", format_time(seconds)));
    }
    if progress.hearts == 0 {
        lines.push("💔 No hearts left. Please wait for refill.".to_string());
    }
    lines.join("\n")
}

pub fn render_puzzle(puzzle: &PuzzleView) -> String {
    let mut lines = Vec::new();
    if puzzle.is_placeholder {
        lines.push("There are no words for this level yet.".to_string());
    }

    let blanks = puzzle.word_length.saturating_sub(puzzle.guess.len());
    let guess = puzzle
        .guess
        .iter()
        .map(char::to_string)
        .chain(std::iter::repeat("_".to_string()).take(blanks))
        .join(" ");
    lines.push(format!("Guess:   {}", guess));

    let letters = puzzle
        .shuffled
        .iter()
        .enumerate()
        .map(|(i, letter)| format!("[{}]{}", i + 1, letter))
        .join(" ");
    lines.push(format!("Letters: {}", letters));

    if !puzzle.hints.is_empty() {
        let hints = puzzle.hints.iter().join(", ");
        let (first, rest) = hints.split_at(hints.chars().next().map_or(0, char::len_utf8));
        lines.push(format!("Hint: {}{}", first.to_uppercase(), rest));
    }
    lines.push(format!("Hints used: {}/{}", puzzle.hints_used, puzzle.max_hints));

    if let Some(answer) = &puzzle.answer {
        lines.push(format!("[debug] answer: {}", answer));
    }
    lines.join("\n")
}

fn describe_rejection(rejection: &InputRejection) -> String {
    match rejection {
        InputRejection::Incomplete { selected, required } => format!(
            "❗ You selected only {} letters. Please select all {} letters before submitting.",
            selected, required
        ),
        InputRejection::NoHeartsLeft => "💔 No hearts left. Please wait for refill.".to_string(),
        InputRejection::NoSuchLetter => "That letter is not available.".to_string(),
    }
}

fn describe_decline(purchase: &Purchase, reason: &PurchaseDecline) -> String {
    let item = match purchase {
        Purchase::Hint => "hint",
        Purchase::Heart => "heart",
    };
    match reason {
        PurchaseDecline::NotEnoughCoins { coins, price } => format!(
            "Not enough coins: a {} costs {}💰, you have {}💰.",
            item, price, coins
        ),
        PurchaseDecline::HintLimitReached => "All hints for this level are used.".to_string(),
        PurchaseDecline::HeartsFull => "Your hearts are already full.".to_string(),
    }
}

/// Line-oriented front end: prints engine events and handles the front-end-only requests.
pub struct TerminalUi {
    output: Box<dyn Write>,
    sound_enabled: bool,
    stats_manager: Rc<RefCell<StatsManager>>,
    quit_requested: bool,
    engine_subscription: Option<Unsubscriber<GameEngineEvent>>,
    ui_subscription: Option<Unsubscriber<UiEvent>>,
}

impl Destroyable for TerminalUi {
    fn destroy(&mut self) {
        if let Some(subscription) = self.engine_subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(subscription) = self.ui_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl TerminalUi {
    pub fn new(
        output: Box<dyn Write>,
        game_engine_event_observer: EventObserver<GameEngineEvent>,
        ui_event_observer: EventObserver<UiEvent>,
        settings: &Settings,
        stats_manager: &Rc<RefCell<StatsManager>>,
    ) -> Rc<RefCell<Self>> {
        let terminal_ui = Rc::new(RefCell::new(Self {
            output,
            sound_enabled: settings.sound_enabled,
            stats_manager: Rc::clone(stats_manager),
            quit_requested: false,
            engine_subscription: None,
            ui_subscription: None,
        }));

        let engine_subscription = {
            let terminal_ui = terminal_ui.clone();
            game_engine_event_observer.subscribe(move |event| {
                terminal_ui.borrow_mut().handle_engine_event(event);
            })
        };
        let ui_subscription = {
            let terminal_ui = terminal_ui.clone();
            ui_event_observer.subscribe(move |event| {
                terminal_ui.borrow_mut().handle_ui_event(event);
            })
        };
        {
            let mut ui = terminal_ui.borrow_mut();
            ui.engine_subscription = Some(engine_subscription);
            ui.ui_subscription = Some(ui_subscription);
        }

        terminal_ui
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn print(&mut self, text: &str) {
        if let Err(err) = writeln!(self.output, "{}", text).and_then(|_| self.output.flush()) {
            error!(target: "terminal_ui", "Failed to write output: {}", err);
        }
    }

    pub fn prompt(&mut self) {
        if let Err(err) = write!(self.output, "> ").and_then(|_| self.output.flush()) {
            error!(target: "terminal_ui", "Failed to write prompt: {}", err);
        }
    }

    fn play(&mut self, cue: &SoundCue) {
        trace!(target: "terminal_ui", "Sound cue {:?}", cue);
        if self.sound_enabled {
            if let Err(err) = write!(self.output, "{}", BELL).and_then(|_| self.output.flush()) {
                error!(target: "terminal_ui", "Failed to ring bell: {}", err);
            }
        }
    }

    fn handle_engine_event(&mut self, event: &GameEngineEvent) {
        match event {
            GameEngineEvent::ProgressUpdated(progress) => self.print(&render_progress(progress)),
            GameEngineEvent::PuzzleUpdated(puzzle) => self.print(&render_puzzle(puzzle)),
            GameEngineEvent::InputRejected(rejection) => {
                self.print(&describe_rejection(rejection))
            }
            GameEngineEvent::PuzzleSolved {
                stats,
                reward,
                new_best,
            } => {
                let mut message = format!(
                    "✅ Correct! Solved in {}s (+{}💰).",
                    stats.completion_time.as_secs(),
                    reward
                );
                if *new_best {
                    message.push_str(" New fastest time!");
                }
                self.print(&message);
                if let Err(err) = self.stats_manager.borrow_mut().record_game(stats) {
                    error!(target: "terminal_ui", "Failed to record stats: {}", err);
                }
            }
            GameEngineEvent::WrongGuess { hearts } => self.print(&format!(
                "❌ Not quite. {} heart(s) left; here is a new word.",
                hearts
            )),
            GameEngineEvent::HeartsRestored { restored, hearts } => self.print(&format!(
                "❤️ {} heart(s) restored, you now have {}.",
                restored, hearts
            )),
            GameEngineEvent::PurchaseDeclined(purchase, reason) => {
                self.print(&describe_decline(purchase, reason))
            }
            GameEngineEvent::ProgressReset => self.print("Progress reset. Back to level 1."),
            GameEngineEvent::SoundCue(cue) => self.play(cue),
        }
    }

    fn handle_ui_event(&mut self, event: &UiEvent) {
        match event {
            UiEvent::ShowHelp => self.print(HELP_TEXT),
            UiEvent::ShowStats => {
                let text = StatsView::render(&self.stats_manager.borrow());
                self.print(&text);
            }
            UiEvent::Quit => self.quit_requested = true,
            UiEvent::UnknownInput(input) => self.print(&format!(
                "Didn't understand {:?}. Type \"help\" for commands.",
                input
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Channel;
    use crate::model::{GameStats, Hint};
    use crate::tests::TempDataDir;
    use std::time::{Duration, SystemTime};
    use test_context::test_context;
    use uuid::Uuid;

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    fn puzzle_view() -> PuzzleView {
        PuzzleView {
            level: 0,
            shuffled: vec!['T', 'A'],
            guess: vec!['C'],
            word_length: 3,
            hints_used: 0,
            max_hints: 3,
            hints: vec![],
            is_placeholder: false,
            answer: None,
        }
    }

    #[test]
    fn test_render_progress_with_countdown_and_no_hearts() {
        let text = render_progress(&ProgressView {
            level: 2,
            coins: 250,
            hearts: 0,
            max_hearts: 5,
            regen_seconds: Some(61),
            best_time: Some(9),
        });
        assert_eq!(
            text,
            "Level 3   ❤️ 0/5   💰 250\n⏱ Fastest: 9s\nHearts regenerate in: 01:01\n💔 No hearts left. Please wait for refill."
        );
    }

    #[test]
    fn test_render_progress_saturates_level() {
        let text = render_progress(&ProgressView {
            level: usize::MAX,
            coins: 0,
            hearts: 5,
            max_hearts: 5,
            regen_seconds: None,
            best_time: None,
        });
        assert!(text.starts_with(&format!("Level {}", usize::MAX)));
    }

    #[test]
    fn test_render_puzzle_shows_blanks_positions_and_hints() {
        let view = PuzzleView {
            hints_used: 2,
            hints: vec![
                Hint::FirstLetter('C'),
                Hint::LetterAt {
                    position: 1,
                    letter: 'A',
                },
            ],
            ..puzzle_view()
        };
        assert_eq!(
            render_puzzle(&view),
            "Guess:   C _ _\nLetters: [1]T [2]A\nHint: First letter is C, letter at position 2 is A\nHints used: 2/3"
        );
    }

    #[test_context(TempDataDir)]
    #[test]
    fn test_events_are_printed_and_stats_recorded(ctx: &mut TempDataDir) {
        let (event_emitter, event_observer) = Channel::new::<GameEngineEvent>();
        let (ui_emitter, ui_observer) = Channel::new::<UiEvent>();
        let buffer = SharedBuffer::default();
        let stats_manager = Rc::new(RefCell::new(StatsManager::new(&ctx.path)));
        let mut settings = Settings::default();
        settings.sound_enabled = false;
        let ui = TerminalUi::new(
            Box::new(buffer.clone()),
            event_observer,
            ui_observer,
            &settings,
            &stats_manager,
        );

        event_emitter.emit(&GameEngineEvent::InputRejected(InputRejection::Incomplete {
            selected: 1,
            required: 3,
        }));
        event_emitter.emit(&GameEngineEvent::SoundCue(SoundCue::Correct));
        event_emitter.emit(&GameEngineEvent::PuzzleSolved {
            stats: GameStats {
                completion_time: Duration::from_secs(7),
                hints_used: 0,
                level: 0,
                word_length: 3,
                solved_at: SystemTime::now(),
                playthrough_id: Uuid::new_v4(),
            },
            reward: 100,
            new_best: true,
        });

        let text = buffer.text();
        assert!(text.contains("You selected only 1 letters. Please select all 3 letters"));
        assert!(text.contains("✅ Correct! Solved in 7s (+100💰). New fastest time!"));
        assert!(!text.contains(BELL));
        assert_eq!(stats_manager.borrow().get_global_stats().total_puzzles_solved, 1);

        assert!(!ui.borrow().quit_requested());
        ui_emitter.emit(&UiEvent::Quit);
        assert!(ui.borrow().quit_requested());

        ui.borrow_mut().destroy();
        ui_emitter.emit(&UiEvent::ShowHelp);
        assert!(!buffer.text().contains("put the last picked letter back"));
    }

    #[test_context(TempDataDir)]
    #[test]
    fn test_sound_cues_ring_bell_when_enabled(ctx: &mut TempDataDir) {
        let (event_emitter, event_observer) = Channel::new::<GameEngineEvent>();
        let (_ui_emitter, ui_observer) = Channel::new::<UiEvent>();
        let buffer = SharedBuffer::default();
        let stats_manager = Rc::new(RefCell::new(StatsManager::new(&ctx.path)));
        let _ui = TerminalUi::new(
            Box::new(buffer.clone()),
            event_observer,
            ui_observer,
            &Settings::default(),
            &stats_manager,
        );

        event_emitter.emit(&GameEngineEvent::SoundCue(SoundCue::Wrong));
        assert_eq!(buffer.text(), BELL);
    }

    #[test_context(TempDataDir)]
    #[test]
    fn test_write_failures_are_logged_not_fatal(ctx: &mut TempDataDir) {
        let (event_emitter, event_observer) = Channel::new::<GameEngineEvent>();
        let (ui_emitter, ui_observer) = Channel::new::<UiEvent>();
        let stats_manager = Rc::new(RefCell::new(StatsManager::new(&ctx.path)));
        let ui = TerminalUi::new(
            Box::new(BrokenPipe),
            event_observer,
            ui_observer,
            &Settings::default(),
            &stats_manager,
        );

        event_emitter.emit(&GameEngineEvent::SoundCue(SoundCue::Correct));
        event_emitter.emit(&GameEngineEvent::ProgressReset);
        ui.borrow_mut().prompt();
        ui_emitter.emit(&UiEvent::Quit);

        assert!(ui.borrow().quit_requested());
    }
}
