use log::{error, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::clock::Clock;
use super::puzzle_generator::generate_puzzle;
use super::settings::Settings;
use super::storage::KeyValueStore;
use crate::destroyable::Destroyable;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    GameEngineCommand, GameEngineEvent, GameStats, HeartRegen, Hint, InputRejection, Progress,
    ProgressView, Purchase, PurchaseDecline, Puzzle, PuzzleView, SoundCue, WordLevels, MAX_HEARTS,
    MAX_HINTS_PER_LEVEL, MAX_LEVEL,
};

/// Coins granted for solving a puzzle.
pub const SOLVE_REWARD: u32 = 100;
pub const HEART_PRICE: u32 = 100;
pub const HINT_PRICE: u32 = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Seed for word picks and shuffles; random when unset.
    pub seed: Option<u64>,
    /// Exposes the answer in puzzle updates.
    pub debug_mode: bool,
}

impl EngineOptions {
    pub fn from_env() -> Self {
        Self {
            seed: Settings::seed_from_env(),
            debug_mode: Settings::is_debug_mode(),
        }
    }
}

/// Owns the player's progress and the puzzle in play, and applies every command to them.
pub struct GameEngine {
    progress: Progress,
    puzzle: Puzzle,
    word_levels: WordLevels,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    rng: StdRng,
    seed: u64,
    debug_mode: bool,
    subscription: Option<Unsubscriber<GameEngineCommand>>,
    game_engine_event_emitter: EventEmitter<GameEngineEvent>,
}

impl Destroyable for GameEngine {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl GameEngine {
    pub fn new(
        game_engine_command_observer: EventObserver<GameEngineCommand>,
        game_engine_event_emitter: EventEmitter<GameEngineEvent>,
        word_levels: WordLevels,
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        options: EngineOptions,
    ) -> Rc<RefCell<Self>> {
        let seed = options.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let now = clock.now();

        let mut progress = Progress::load(store.as_ref());
        let restored = progress.heart_regen.advance(&mut progress.hearts, now);
        if restored > 0 {
            info!(target: "game_engine", "Restored {} hearts since last session", restored);
        }

        let puzzle = generate_puzzle(&word_levels, progress.level, now, &mut rng);
        info!(
            target: "game_engine",
            "Starting at level {}; seed: {}", progress.level, seed
        );

        let mut engine = Self {
            progress,
            puzzle,
            word_levels,
            store,
            clock,
            rng,
            seed,
            debug_mode: options.debug_mode,
            subscription: None,
            game_engine_event_emitter,
        };
        engine.persist();

        let refcell = Rc::new(RefCell::new(engine));
        GameEngine::wire_subscription(refcell.clone(), game_engine_command_observer);
        refcell
    }

    fn wire_subscription(
        game_engine: Rc<RefCell<Self>>,
        game_engine_command_observer: EventObserver<GameEngineCommand>,
    ) {
        let game_engine_handler = game_engine.clone();
        let subscription = game_engine_command_observer.subscribe(move |command| {
            game_engine_handler.borrow_mut().handle_command(command);
        });
        game_engine.borrow_mut().subscription = Some(subscription);
    }

    pub fn handle_command(&mut self, command: &GameEngineCommand) {
        trace!(target: "game_engine", "Handling command: {:?}", command);
        match command {
            GameEngineCommand::InitDisplay => self.sync_display(),
            GameEngineCommand::PickLetter(index) => {
                let index = *index;
                self.pick_with(|puzzle| puzzle.pick(index))
            }
            GameEngineCommand::PickChar(letter) => {
                let letter = *letter;
                self.pick_with(|puzzle| puzzle.pick_letter(letter))
            }
            GameEngineCommand::Undo => self.undo(),
            GameEngineCommand::Submit => self.submit(),
            GameEngineCommand::BuyHint => self.buy_hint(),
            GameEngineCommand::BuyHeart => self.buy_heart(),
            GameEngineCommand::Tick => self.tick(),
            GameEngineCommand::ResetProgress => self.reset_progress(),
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn revealed_hints(&self) -> Vec<Hint> {
        Hint::revealed(&self.puzzle, self.progress.hints_used(self.puzzle.level))
    }

    fn emit(&self, event: GameEngineEvent) {
        self.game_engine_event_emitter.emit(&event);
    }

    fn reject(&self, rejection: InputRejection) {
        trace!(target: "game_engine", "Rejected input: {:?}", rejection);
        self.emit(GameEngineEvent::InputRejected(rejection));
    }

    fn decline(&self, purchase: Purchase, reason: PurchaseDecline) {
        trace!(target: "game_engine", "Declined {:?}: {:?}", purchase, reason);
        self.emit(GameEngineEvent::PurchaseDeclined(purchase, reason));
    }

    pub fn progress_view(&self) -> ProgressView {
        ProgressView {
            level: self.progress.level,
            coins: self.progress.coins,
            hearts: self.progress.hearts,
            max_hearts: MAX_HEARTS,
            regen_seconds: self.progress.regen_countdown(),
            best_time: self.progress.best_time,
        }
    }

    pub fn puzzle_view(&self) -> PuzzleView {
        PuzzleView {
            level: self.puzzle.level,
            shuffled: self.puzzle.shuffled.clone(),
            guess: self.puzzle.guess.clone(),
            word_length: self.puzzle.word_len(),
            hints_used: self.progress.hints_used(self.puzzle.level),
            max_hints: MAX_HINTS_PER_LEVEL,
            hints: self.revealed_hints(),
            is_placeholder: self.puzzle.is_placeholder(),
            answer: self.debug_mode.then(|| self.puzzle.word_string()),
        }
    }

    fn sync_display(&self) {
        self.emit(GameEngineEvent::ProgressUpdated(self.progress_view()));
        self.emit(GameEngineEvent::PuzzleUpdated(self.puzzle_view()));
    }

    fn persist(&mut self) {
        if let Err(err) = self.progress.save(self.store.as_mut()) {
            error!(target: "game_engine", "Failed to save progress: {}", err);
        }
    }

    fn new_puzzle(&mut self, started_at: std::time::SystemTime) {
        self.puzzle = generate_puzzle(
            &self.word_levels,
            self.progress.level,
            started_at,
            &mut self.rng,
        );
    }

    fn pick_with(&mut self, pick: impl FnOnce(&mut Puzzle) -> Option<char>) {
        if !self.progress.has_hearts() {
            self.reject(InputRejection::NoHeartsLeft);
            return;
        }
        match pick(&mut self.puzzle) {
            Some(letter) => {
                trace!(target: "game_engine", "Picked {}", letter);
                self.emit(GameEngineEvent::PuzzleUpdated(self.puzzle_view()));
            }
            None => self.reject(InputRejection::NoSuchLetter),
        }
    }

    fn undo(&mut self) {
        if self.puzzle.undo().is_some() {
            self.emit(GameEngineEvent::SoundCue(SoundCue::Click));
            self.emit(GameEngineEvent::PuzzleUpdated(self.puzzle_view()));
        }
    }

    fn submit(&mut self) {
        if !self.progress.has_hearts() {
            self.reject(InputRejection::NoHeartsLeft);
            return;
        }
        if !self.puzzle.is_complete() {
            self.reject(InputRejection::Incomplete {
                selected: self.puzzle.guess.len(),
                required: self.puzzle.word_len(),
            });
            return;
        }

        if self.puzzle.is_solved() {
            self.complete_puzzle();
        } else {
            self.fail_puzzle();
        }
    }

    fn complete_puzzle(&mut self) {
        let now = self.clock.now();
        let seconds = self.puzzle.elapsed(now).as_secs();
        let new_best = self.progress.best_time.map_or(true, |best| seconds < best);
        if new_best {
            self.progress.best_time = Some(seconds);
        }
        self.progress.coins = self.progress.coins.saturating_add(SOLVE_REWARD);

        let stats = GameStats {
            completion_time: Duration::from_secs(seconds),
            hints_used: self.progress.hints_used(self.puzzle.level),
            level: self.puzzle.level,
            word_length: self.puzzle.word_len(),
            solved_at: now,
            playthrough_id: self.puzzle.playthrough_id,
        };
        info!(
            target: "game_engine",
            "Solved level {} in {}s (best: {:?})", stats.level, seconds, self.progress.best_time
        );

        self.progress.level = self.progress.level.saturating_add(1).min(MAX_LEVEL);
        self.new_puzzle(now);
        self.persist();

        self.emit(GameEngineEvent::SoundCue(SoundCue::Correct));
        self.emit(GameEngineEvent::PuzzleSolved {
            stats,
            reward: SOLVE_REWARD,
            new_best,
        });
        self.sync_display();
    }

    fn fail_puzzle(&mut self) {
        let now = self.clock.now();
        info!(
            target: "game_engine",
            "Wrong guess {} for level {}", self.puzzle.guess_string(), self.puzzle.level
        );
        self.progress.hearts = self.progress.hearts.saturating_sub(1);
        self.progress.heart_regen = HeartRegen::after_change(self.progress.hearts, now);

        // the level timer keeps running across replacement words
        self.new_puzzle(self.puzzle.started_at);
        self.persist();

        self.emit(GameEngineEvent::SoundCue(SoundCue::Wrong));
        self.emit(GameEngineEvent::WrongGuess {
            hearts: self.progress.hearts,
        });
        self.sync_display();
    }

    fn buy_hint(&mut self) {
        let level = self.puzzle.level;
        let used = self.progress.hints_used(level);
        if used >= MAX_HINTS_PER_LEVEL {
            self.decline(Purchase::Hint, PurchaseDecline::HintLimitReached);
            return;
        }
        if self.progress.coins < HINT_PRICE {
            self.decline(
                Purchase::Hint,
                PurchaseDecline::NotEnoughCoins {
                    coins: self.progress.coins,
                    price: HINT_PRICE,
                },
            );
            return;
        }

        self.progress.coins -= HINT_PRICE;
        self.progress.hint_usage.insert(level, used + 1);
        self.persist();

        self.emit(GameEngineEvent::SoundCue(SoundCue::Click));
        self.sync_display();
    }

    fn buy_heart(&mut self) {
        if self.progress.hearts >= MAX_HEARTS {
            self.decline(Purchase::Heart, PurchaseDecline::HeartsFull);
            return;
        }
        if self.progress.coins < HEART_PRICE {
            self.decline(
                Purchase::Heart,
                PurchaseDecline::NotEnoughCoins {
                    coins: self.progress.coins,
                    price: HEART_PRICE,
                },
            );
            return;
        }

        self.progress.coins -= HEART_PRICE;
        self.progress.hearts += 1;
        self.progress.heart_regen = HeartRegen::after_change(self.progress.hearts, self.clock.now());
        self.persist();

        self.emit(GameEngineEvent::SoundCue(SoundCue::Click));
        self.emit(GameEngineEvent::ProgressUpdated(self.progress_view()));
    }

    fn tick(&mut self) {
        let now = self.clock.now();
        let restored = self
            .progress
            .heart_regen
            .advance(&mut self.progress.hearts, now);
        if restored == 0 {
            return;
        }

        info!(
            target: "game_engine",
            "Restored {} heart(s); now {}", restored, self.progress.hearts
        );
        self.persist();
        self.emit(GameEngineEvent::HeartsRestored {
            restored,
            hearts: self.progress.hearts,
        });
        self.emit(GameEngineEvent::ProgressUpdated(self.progress_view()));
    }

    fn reset_progress(&mut self) {
        info!(target: "game_engine", "Resetting progress");
        if let Err(err) = self.store.clear() {
            error!(target: "game_engine", "Failed to clear storage: {}", err);
        }
        self.progress = Progress::default();
        self.new_puzzle(self.clock.now());
        self.persist();

        self.emit(GameEngineEvent::ProgressReset);
        self.sync_display();
    }
}
