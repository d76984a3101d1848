use std::{cell::RefCell, rc::Rc};

use log::trace;

use crate::{
    destroyable::Destroyable,
    events::{EventEmitter, EventObserver, Unsubscriber},
    model::{GameEngineCommand, GameEngineEvent, InputEvent, UiEvent},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Commands(Vec<GameEngineCommand>),
    Ui(UiEvent),
    Nothing,
}

fn command_word(input: &str) -> Option<Translation> {
    let command = match input.to_lowercase().as_str() {
        "undo" | "back" => GameEngineCommand::Undo,
        "submit" | "check" => GameEngineCommand::Submit,
        "hint" | "buy hint" => GameEngineCommand::BuyHint,
        "heart" | "buy heart" => GameEngineCommand::BuyHeart,
        "status" | "look" => GameEngineCommand::InitDisplay,
        "reset" => GameEngineCommand::ResetProgress,
        "stats" => return Some(Translation::Ui(UiEvent::ShowStats)),
        "help" | "?" => return Some(Translation::Ui(UiEvent::ShowHelp)),
        "quit" | "exit" => return Some(Translation::Ui(UiEvent::Quit)),
        _ => return None,
    };
    Some(Translation::Commands(vec![command]))
}

/// True when `token` uses every letter left in `pool` exactly once, ignoring case.
fn spells_pool(token: &str, pool: &[char]) -> bool {
    let mut letters: Vec<char> = token.chars().flat_map(char::to_uppercase).collect();
    let mut pool: Vec<char> = pool.iter().flat_map(|c| c.to_uppercase()).collect();
    if letters.is_empty() || letters.len() != pool.len() {
        return false;
    }
    letters.sort_unstable();
    pool.sort_unstable();
    letters == pool
}

/// Turns a typed line into engine commands or front-end requests.
///
/// A single word made of exactly the letters left in `pool` is always read as picks, so an
/// answer like RESET is never mistaken for a command. Otherwise command words win over
/// letters, and a leading `!` forces a command. Anything else is read as whitespace-separated
/// tokens: a number picks the pooled letter at that 1-based position, letters pick matching
/// pooled letters in order.
pub fn translate_line(line: &str, pool: &[char]) -> Translation {
    let input = line.trim();
    if input.is_empty() {
        return Translation::Nothing;
    }

    if let Some(forced) = input.strip_prefix('!') {
        return command_word(forced.trim())
            .unwrap_or_else(|| Translation::Ui(UiEvent::UnknownInput(input.to_string())));
    }

    if spells_pool(input, pool) {
        return Translation::Commands(input.chars().map(GameEngineCommand::PickChar).collect());
    }

    if let Some(translation) = command_word(input) {
        return translation;
    }

    let mut commands = Vec::new();
    for token in input.split_whitespace() {
        if let Ok(position) = token.parse::<usize>() {
            if position == 0 {
                return Translation::Ui(UiEvent::UnknownInput(input.to_string()));
            }
            commands.push(GameEngineCommand::PickLetter(position - 1));
        } else if token.chars().all(char::is_alphabetic) {
            commands.extend(token.chars().map(GameEngineCommand::PickChar));
        } else {
            return Translation::Ui(UiEvent::UnknownInput(input.to_string()));
        }
    }
    Translation::Commands(commands)
}

pub struct InputTranslator {
    game_engine_command_emitter: EventEmitter<GameEngineCommand>,
    ui_event_emitter: EventEmitter<UiEvent>,
    /// Letters still in the pool, as of the last puzzle update.
    pool: Rc<RefCell<Vec<char>>>,
    input_subscription: Option<Unsubscriber<InputEvent>>,
    puzzle_subscription: Option<Unsubscriber<GameEngineEvent>>,
}

impl Destroyable for InputTranslator {
    fn destroy(&mut self) {
        if let Some(subscription) = self.input_subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(subscription) = self.puzzle_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl InputTranslator {
    pub fn new(
        game_engine_command_emitter: EventEmitter<GameEngineCommand>,
        ui_event_emitter: EventEmitter<UiEvent>,
        input_event_observer: EventObserver<InputEvent>,
        game_engine_event_observer: EventObserver<GameEngineEvent>,
    ) -> Rc<RefCell<Self>> {
        let input_translator = Rc::new(RefCell::new(Self {
            game_engine_command_emitter,
            ui_event_emitter,
            pool: Rc::new(RefCell::new(Vec::new())),
            input_subscription: None,
            puzzle_subscription: None,
        }));

        InputTranslator::bind_input_observer(input_translator.clone(), input_event_observer);
        InputTranslator::bind_puzzle_observer(&input_translator, game_engine_event_observer);

        input_translator
    }

    fn bind_input_observer(
        input_translator: Rc<RefCell<Self>>,
        input_event_observer: EventObserver<InputEvent>,
    ) {
        let subscription = {
            let input_translator = input_translator.clone();
            input_event_observer.subscribe(move |event| {
                input_translator.borrow().handle_input_event(event);
            })
        };

        input_translator.borrow_mut().input_subscription = Some(subscription);
    }

    // Engine events arrive while an input event is still being handled, so this listener
    // only touches the shared pool and never borrows the translator.
    fn bind_puzzle_observer(
        input_translator: &Rc<RefCell<Self>>,
        game_engine_event_observer: EventObserver<GameEngineEvent>,
    ) {
        let pool = input_translator.borrow().pool.clone();
        let subscription = game_engine_event_observer.subscribe(move |event| {
            if let GameEngineEvent::PuzzleUpdated(view) = event {
                *pool.borrow_mut() = view.shuffled.clone();
            }
        });

        input_translator.borrow_mut().puzzle_subscription = Some(subscription);
    }

    fn handle_input_event(&self, event: &InputEvent) {
        match event {
            InputEvent::Tick => self
                .game_engine_command_emitter
                .emit(&GameEngineCommand::Tick),
            InputEvent::Line(line) => {
                let translation = translate_line(line, &self.pool.borrow());
                trace!(target: "input_translator", "{:?} -> {:?}", line, translation);
                match translation {
                    Translation::Commands(commands) => {
                        for command in commands {
                            self.game_engine_command_emitter.emit(&command);
                        }
                    }
                    Translation::Ui(ui_event) => self.ui_event_emitter.emit(&ui_event),
                    Translation::Nothing => (),
                }
            }
        }
    }
}
