use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::{error, info};

use word_jumble::events::Channel;
use word_jumble::game::{
    EngineOptions, FileStore, GameEngine, Settings, StatsManager, SystemClock, STORAGE_FILE,
};
use word_jumble::model::{GameEngineCommand, GameEngineEvent, InputEvent, UiEvent, WordLevels};
use word_jumble::ui::terminal_ui::WELCOME_TEXT;
use word_jumble::ui::{InputTranslator, TerminalUi};
use word_jumble::Destroyable;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

fn init_logging() {
    env_logger::init();
}

fn load_word_levels(settings: &Settings) -> WordLevels {
    match &settings.word_list_path {
        Some(path) => WordLevels::from_file(path).unwrap_or_else(|err| {
            error!("Could not load word lists from {:?}: {}", path, err);
            WordLevels::builtin()
        }),
        None => WordLevels::builtin(),
    }
}

/// Feeds typed lines and the one-second ticker into a single queue for the main loop.
fn spawn_input_sources() -> mpsc::Receiver<Option<InputEvent>> {
    let (sender, receiver) = mpsc::channel();

    let line_sender = sender.clone();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_sender.send(Some(InputEvent::Line(line))).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    error!("Failed to read input: {}", err);
                    break;
                }
            }
        }
        // end of input
        let _ = line_sender.send(None);
    });

    thread::spawn(move || loop {
        thread::sleep(TICK_INTERVAL);
        if sender.send(Some(InputEvent::Tick)).is_err() {
            return;
        }
    });

    receiver
}

fn main() {
    init_logging();

    let data_dir = Settings::data_dir();
    info!("Using data directory {:?}", data_dir);
    let settings = Settings::load(&data_dir);
    let word_levels = load_word_levels(&settings);
    let store = FileStore::open(data_dir.join(STORAGE_FILE));
    let stats_manager = Rc::new(RefCell::new(StatsManager::new(&data_dir)));

    let (game_engine_command_emitter, game_engine_command_observer) =
        Channel::new::<GameEngineCommand>();
    let (game_engine_event_emitter, game_engine_event_observer) =
        Channel::new::<GameEngineEvent>();
    let (ui_event_emitter, ui_event_observer) = Channel::new::<UiEvent>();
    let (input_event_emitter, input_event_observer) = Channel::new::<InputEvent>();

    let terminal_ui = TerminalUi::new(
        Box::new(std::io::stdout()),
        game_engine_event_observer.clone(),
        ui_event_observer,
        &settings,
        &stats_manager,
    );
    let input_translator = InputTranslator::new(
        game_engine_command_emitter.clone(),
        ui_event_emitter,
        input_event_observer,
        game_engine_event_observer,
    );
    let game_engine = GameEngine::new(
        game_engine_command_observer,
        game_engine_event_emitter,
        word_levels,
        Box::new(store),
        Box::new(SystemClock),
        EngineOptions::from_env(),
    );

    if settings.show_welcome {
        terminal_ui.borrow_mut().print(WELCOME_TEXT);
    }
    terminal_ui.borrow_mut().print("Type \"help\" for commands.");
    game_engine_command_emitter.emit(&GameEngineCommand::InitDisplay);
    terminal_ui.borrow_mut().prompt();

    let inputs = spawn_input_sources();
    while let Ok(Some(event)) = inputs.recv() {
        let is_line = matches!(event, InputEvent::Line(_));
        input_event_emitter.emit(&event);
        if terminal_ui.borrow().quit_requested() {
            break;
        }
        if is_line {
            terminal_ui.borrow_mut().prompt();
        }
    }

    info!("Exiting at seed {}", game_engine.borrow().seed());
    input_translator.borrow_mut().destroy();
    game_engine.borrow_mut().destroy();
    terminal_ui.borrow_mut().destroy();
}
