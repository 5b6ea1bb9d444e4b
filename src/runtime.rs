use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

/// A key press the game understands. Anything else never leaves the reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Home,
    Tab,
    Quit,
}

impl Input {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let input = match key.code {
            KeyCode::Esc => Input::Quit,
            KeyCode::Char('c') if ctrl => Input::Quit,
            KeyCode::Char(_) if ctrl => return None,
            KeyCode::Char(c) => Input::Char(c),
            KeyCode::Backspace => Input::Backspace,
            KeyCode::Delete => Input::Delete,
            KeyCode::Enter => Input::Enter,
            KeyCode::Left => Input::Left,
            KeyCode::Right => Input::Right,
            KeyCode::Up | KeyCode::PageUp => Input::Up,
            KeyCode::Down | KeyCode::PageDown => Input::Down,
            KeyCode::Home => Input::Home,
            KeyCode::Tab => Input::Tab,
            _ => return None,
        };
        Some(input)
    }

    /// One event per character, for scripted play.
    pub fn typed(text: &str) -> Vec<GameEvent> {
        text.chars().map(|c| GameEvent::Input(Input::Char(c))).collect()
    }
}

/// What the app loop receives each step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Input(Input),
    Resize,
    Tick,
}

/// Channel of game events, fed by the terminal reader thread or by a test.
pub struct EventSource {
    rx: Receiver<GameEvent>,
}

impl EventSource {
    /// Spawns a thread translating crossterm events until the app hangs up.
    pub fn terminal() -> Self {
        let (tx, source) = Self::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                // Release and repeat events would type every letter twice on
                // terminals that report them.
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    match Input::from_key(&key) {
                        Some(input) => GameEvent::Input(input),
                        None => continue,
                    }
                }
                Ok(CtEvent::Resize(_, _)) => GameEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    debug!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        source
    }

    pub fn channel() -> (Sender<GameEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

/// Hands the app one event at a time, or a tick when nothing arrived in time.
pub struct Runner {
    source: EventSource,
    tick: Duration,
}

impl Runner {
    pub fn new(source: EventSource, tick: Duration) -> Self {
        Self { source, tick }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn step(&self) -> GameEvent {
        match self.source.rx.recv_timeout(self.tick) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}
