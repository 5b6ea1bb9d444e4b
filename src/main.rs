pub mod ui;

use chrono::{Local, NaiveDate};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};

use eartle::{
    app_dirs::AppDirs,
    celebration::CelebrationAnimation,
    collab::{DailyWord, DailyWordSupply, Identity, IdentityProvider, Leaderboard, LeaderboardEntry},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    report::{Notification, ReportMode, Reporter},
    runtime::{EventSource, GameEvent, Input, Runner},
    session::{GameResult, GameSession, SessionEvent},
    store::Store,
    words::WordList,
};

const TICK_RATE: Duration = Duration::from_millis(100);
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);
pub const LEADERBOARD_PAGE: usize = 10;
/// Used only if the embedded list has nothing in the configured lengths.
const FALLBACK_WORD: &str = "CRANE";

/// daily word-guessing game for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Guess the hidden word in six tries. Letters in the right spot turn green, letters elsewhere in the word turn yellow. Play practice rounds or today's daily puzzle and climb the local leaderboard."
)]
pub struct Cli {
    /// play today's puzzle and submit the result to the leaderboard
    #[clap(short = 'd', long)]
    daily: bool,

    /// play as this user (remembered for next time)
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// practice against a fixed word
    #[clap(short = 'w', long, value_parser = parse_word)]
    word: Option<String>,

    /// open the leaderboard first
    #[clap(short = 'l', long)]
    leaderboard: bool,

    /// database file (defaults to ~/.local/state/eartle/eartle.db)
    #[clap(long)]
    db: Option<PathBuf>,

    /// log level for the log file, e.g. debug or warn
    #[clap(long)]
    log_level: Option<String>,
}

fn parse_word(raw: &str) -> Result<String, String> {
    let word = raw.trim().to_ascii_uppercase();
    if !(2..=12).contains(&word.len()) {
        return Err("word must be 2-12 letters".to_string());
    }
    if !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("word may only contain letters a-z".to_string());
    }
    Ok(word)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Playing,
    Leaderboard,
    /// The daily word could not be fetched; the reason is shown with a retry hint.
    DailyUnavailable(String),
}

#[derive(Debug, Default)]
pub struct LeaderboardState {
    pub offset: usize,
    pub entries: Vec<LeaderboardEntry>,
    pub error: Option<String>,
}

impl LeaderboardState {
    pub fn page(&self) -> usize {
        self.offset / LEADERBOARD_PAGE + 1
    }

    pub fn has_next(&self) -> bool {
        self.entries.len() == LEADERBOARD_PAGE
    }
}

/// What the event loop should do after one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Redraw,
    Idle,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub cli: Cli,
    pub config: Config,
    pub session: GameSession,
    pub mode: ReportMode,
    pub daily: Option<DailyWord>,
    pub state: AppState,
    pub identity: Option<Identity>,
    pub reporter: Reporter,
    pub last_result: Option<GameResult>,
    pub show_result: bool,
    pub notification: Option<(Notification, Instant)>,
    pub celebration: CelebrationAnimation,
    pub leaderboard: LeaderboardState,
    pub viewport: (u16, u16),
    store: Store,
    words: WordList,
}

impl App {
    pub fn new(cli: Cli, config: Config, store: Store, words: WordList, now: Instant) -> Self {
        let first_word = cli
            .word
            .clone()
            .unwrap_or_else(|| random_word(&words, &config));

        let mut app = Self {
            session: GameSession::new(&first_word),
            mode: ReportMode::Local,
            daily: None,
            state: AppState::Playing,
            identity: None,
            reporter: Reporter::new(),
            last_result: None,
            show_result: false,
            notification: None,
            celebration: CelebrationAnimation::new(),
            leaderboard: LeaderboardState::default(),
            viewport: (80, 24),
            cli,
            config,
            store,
            words,
        };

        app.sign_in(now);
        if app.cli.daily {
            app.start_daily(Local::now().date_naive(), now);
        }
        if app.cli.leaderboard {
            app.open_leaderboard();
        }
        app
    }

    fn sign_in(&mut self, now: Instant) {
        let Some(username) = self.cli.user.clone().or_else(|| self.config.username.clone()) else {
            return;
        };
        match self
            .store
            .sign_in(&username, self.config.display_name.as_deref())
        {
            Ok(identity) => {
                info!(user = %identity.username, "signed in");
                self.identity = Some(identity);
            }
            Err(err) => {
                warn!(%err, %username, "sign-in failed");
                self.notify(Notification::error(err.to_string()), now);
            }
        }
    }

    fn notify(&mut self, notification: Notification, now: Instant) {
        self.notification = Some((notification, now));
    }

    /// Clears everything tied to the previous game.
    fn begin_game(&mut self, word: &str, mode: ReportMode) {
        self.session.reset(word);
        self.mode = mode;
        self.reporter.reset();
        self.last_result = None;
        self.show_result = false;
        self.celebration.stop();
        self.state = AppState::Playing;
    }

    pub fn new_practice(&mut self) {
        let word = random_word(&self.words, &self.config);
        self.daily = None;
        self.begin_game(&word, ReportMode::Local);
        debug!(length = word.len(), "practice game started");
    }

    pub fn start_daily(&mut self, today: NaiveDate, now: Instant) {
        let fetched = self
            .store
            .daily_word(today)
            .and_then(|response| response.into_daily_word(today));

        let daily = match fetched {
            Ok(daily) => daily,
            Err(err) => {
                error!(%err, %today, "daily word fetch failed");
                self.state = AppState::DailyUnavailable(err.to_string());
                return;
            }
        };

        self.begin_game(
            &daily.word,
            ReportMode::Daily {
                daily_word_id: daily.daily_word_id.clone(),
            },
        );
        info!(date = %daily.date, "daily game started");

        let completion = match &self.identity {
            Some(identity) => self
                .store
                .completion(&identity.id, &daily.daily_word_id)
                .unwrap_or_else(|err| {
                    warn!(%err, "could not look up today's completion");
                    None
                }),
            None => None,
        };
        if let Some(done) = completion {
            self.notify(
                Notification::info(format!(
                    "You already completed today's challenge. Your score: {}",
                    done.score
                )),
                now,
            );
        }
        self.daily = Some(daily);
    }

    fn on_finished(&mut self, result: GameResult, now: Instant) {
        self.show_result = true;
        let outcome = self
            .reporter
            .report(&result, &self.mode, self.identity.as_ref(), &self.store);
        if let Some(notification) = outcome.notification() {
            self.notify(notification, now);
        }
        self.last_result = Some(result);
    }

    pub fn retry_submission(&mut self, now: Instant) {
        if !self.reporter.can_retry() {
            return;
        }
        if let Some(result) = self.last_result.clone() {
            self.on_finished(result, now);
        }
    }

    fn apply(&mut self, events: Vec<SessionEvent>, now: Instant) {
        for event in events {
            if let SessionEvent::Finished(result) = event {
                self.on_finished(result, now);
            }
        }
    }

    pub fn open_leaderboard(&mut self) {
        self.state = AppState::Leaderboard;
        self.refresh_leaderboard();
    }

    pub fn refresh_leaderboard(&mut self) {
        match self.store.leaderboard(LEADERBOARD_PAGE, self.leaderboard.offset) {
            Ok(entries) => {
                self.leaderboard.entries = entries;
                self.leaderboard.error = None;
            }
            Err(err) => {
                error!(%err, "leaderboard query failed");
                self.leaderboard.entries.clear();
                self.leaderboard.error = Some("Failed to load leaderboard".to_string());
            }
        }
    }

    fn close_leaderboard(&mut self) {
        self.state = AppState::Playing;
    }

    /// Advances timers and animations; true when the screen changed.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        let mut changed = self.session.poll_tick(now).is_some();

        if self.session.poll_celebration(now) {
            let (width, height) = self.viewport;
            self.celebration.start(width, height, now);
            changed = true;
        }
        if self.celebration.is_active {
            self.celebration.update(now);
            changed = true;
        }
        if let Some((_, shown_at)) = &self.notification {
            if now.saturating_duration_since(*shown_at) >= NOTIFICATION_TTL {
                self.notification = None;
                changed = true;
            }
        }
        changed
    }

    pub fn on_event(&mut self, event: GameEvent, now: Instant) -> Step {
        let step = match event {
            GameEvent::Tick => {
                if self.on_tick(now) {
                    Step::Redraw
                } else {
                    Step::Idle
                }
            }
            GameEvent::Resize => Step::Redraw,
            GameEvent::Input(input) => {
                if self.handle_input(input, now) {
                    Step::Redraw
                } else {
                    Step::Quit
                }
            }
        };
        // Focus moves only after the event that requested it is fully handled.
        self.session.flush_focus();
        step
    }

    /// Returns false when the player asked to quit.
    pub fn handle_input(&mut self, input: Input, now: Instant) -> bool {
        if input == Input::Quit {
            return false;
        }

        match self.state.clone() {
            AppState::Playing if !self.session.is_finished() => {
                if input == Input::Tab {
                    self.open_leaderboard();
                } else {
                    let events = self.session.handle_input(input, now);
                    self.apply(events, now);
                }
            }
            AppState::Playing => match input {
                Input::Char('n') => self.new_practice(),
                Input::Char('d') => self.start_daily(Local::now().date_naive(), now),
                Input::Char('u') => self.retry_submission(now),
                Input::Char('l') | Input::Tab => self.open_leaderboard(),
                Input::Enter | Input::Char(' ') => self.show_result = !self.show_result,
                _ => {}
            },
            AppState::Leaderboard => match input {
                Input::Up => {
                    if self.leaderboard.offset > 0 {
                        self.leaderboard.offset =
                            self.leaderboard.offset.saturating_sub(LEADERBOARD_PAGE);
                        self.refresh_leaderboard();
                    }
                }
                Input::Down => {
                    if self.leaderboard.has_next() {
                        self.leaderboard.offset += LEADERBOARD_PAGE;
                        self.refresh_leaderboard();
                    }
                }
                Input::Home => {
                    self.leaderboard.offset = 0;
                    self.refresh_leaderboard();
                }
                Input::Char('r') => self.refresh_leaderboard(),
                Input::Char('b') | Input::Tab | Input::Backspace => self.close_leaderboard(),
                _ => {}
            },
            AppState::DailyUnavailable(_) => match input {
                Input::Char('r') => self.start_daily(Local::now().date_naive(), now),
                Input::Char('p') => self.new_practice(),
                Input::Char('l') => self.open_leaderboard(),
                _ => {}
            },
        }
        true
    }
}

fn random_word(words: &WordList, config: &Config) -> String {
    let (min, max) = config.practice_lengths();
    words
        .random_practice_word(&mut rand::thread_rng(), min, max)
        .unwrap_or_else(|| FALLBACK_WORD.to_string())
}

fn open_store(cli: &Cli) -> eartle::Result<Store> {
    let Some(path) = cli.db.clone().or_else(AppDirs::db_path) else {
        warn!("no state directory, scores will not be kept");
        return Store::in_memory();
    };
    match Store::open(&path) {
        Ok(store) => Ok(store),
        Err(err) => {
            warn!(%err, path = %path.display(), "falling back to in-memory store");
            Store::in_memory()
        }
    }
}

/// Persists the player chosen with `--user` so the next launch signs in again.
fn remember_user(app: &App, config: &mut Config, config_store: &impl ConfigStore) {
    let Some(identity) = &app.identity else {
        return;
    };
    if config.username.as_deref() == Some(identity.username.as_str()) {
        return;
    }
    config.username = Some(identity.username.clone());
    if let Err(err) = config_store.save(config) {
        warn!(%err, "could not save config");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    let _log_guard = match AppDirs::log_dir() {
        Some(dir) => logging::init(&dir, &level)?,
        None => None,
    };
    info!(version = env!("CARGO_PKG_VERSION"), "starting eartle");

    let store = open_store(&cli)?;
    let words = WordList::embedded()?;
    let mut app = App::new(cli, config.clone(), store, words, Instant::now());
    remember_user(&app, &mut config, &config_store);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(%err, "event loop failed");
    }
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(EventSource::terminal(), TICK_RATE);

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let event = runner.step();
        if matches!(event, GameEvent::Tick | GameEvent::Resize) {
            let size = terminal.size().unwrap_or_default();
            app.viewport = (size.width, size.height);
        }

        match app.on_event(event, Instant::now()) {
            Step::Quit => break,
            Step::Redraw => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            Step::Idle => {}
        }
    }

    app.session.teardown();
    info!("bye");
    Ok(())
}
