use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::focus::{FocusRequest, FocusScheduler};
use crate::row::{GuessRow, RowCompletion, RowEffect};
use crate::runtime::Input;
use crate::timer::{TickSchedule, Timer};

pub const MAX_ATTEMPTS: usize = 6;
pub const CELEBRATION_DELAY: Duration = Duration::from_millis(500);

/// Outcome of a finished game, passed by value to reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub has_won: bool,
    pub total_guesses: usize,
    pub time_taken: Duration,
    pub target_word: String,
}

/// What a committed row did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowVerdict {
    Advanced(usize),
    Won(GameResult),
    Lost(GameResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TimerStarted(Instant),
    Focus(FocusRequest),
    Advanced(usize),
    Finished(GameResult),
}

/// One puzzle: six guess rows against a fixed target word.
#[derive(Debug)]
pub struct GameSession {
    target: String,
    rows: Vec<GuessRow>,
    current_row: usize,
    has_won: bool,
    total_guesses: usize,
    timer: Timer,
    ticks: TickSchedule,
    focus: FocusScheduler,
    generation: u64,
    celebrate_at: Option<Instant>,
}

impl GameSession {
    pub fn new(target: &str) -> Self {
        let target = target.trim().to_ascii_uppercase();
        let mut session = Self {
            rows: Vec::new(),
            target,
            current_row: 0,
            has_won: false,
            total_guesses: 0,
            timer: Timer::new(),
            ticks: TickSchedule::default(),
            focus: FocusScheduler::new(),
            generation: 1,
            celebrate_at: None,
        };
        session.rows = session.build_rows();
        session
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn word_length(&self) -> usize {
        self.target.chars().count()
    }

    pub fn rows(&self) -> &[GuessRow] {
        &self.rows
    }

    pub fn current_row(&self) -> usize {
        self.current_row
    }

    pub fn has_won(&self) -> bool {
        self.has_won
    }

    pub fn total_guesses(&self) -> usize {
        self.total_guesses
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.timer.has_ended()
    }

    pub fn pending_focus(&self) -> Option<FocusRequest> {
        self.focus.pending()
    }

    pub fn type_char(&mut self, raw: &str, now: Instant) -> Vec<SessionEvent> {
        self.edit(now, |row| {
            let column = row.focus_column();
            row.apply_char(column, raw)
        })
    }

    pub fn backspace(&mut self, now: Instant) -> Vec<SessionEvent> {
        self.edit(now, |row| {
            let column = row.focus_column();
            row.apply_delete(column)
        })
    }

    pub fn delete_forward(&mut self, now: Instant) -> Vec<SessionEvent> {
        self.edit(now, |row| {
            let column = row.focus_column();
            row.apply_forward_delete(column)
        })
    }

    pub fn enter(&mut self, now: Instant) -> Vec<SessionEvent> {
        self.edit(now, GuessRow::apply_enter)
    }

    pub fn move_left(&mut self) -> bool {
        self.focus.cancel();
        match self.active_row_mut() {
            Some(row) => row.move_focus_left(),
            None => false,
        }
    }

    pub fn move_right(&mut self) -> bool {
        self.focus.cancel();
        match self.active_row_mut() {
            Some(row) => row.move_focus_right(),
            None => false,
        }
    }

    /// Routes a board key to the active row. Keys without a board meaning
    /// are left to the caller and produce nothing here.
    pub fn handle_input(&mut self, input: Input, now: Instant) -> Vec<SessionEvent> {
        match input {
            Input::Char(c) => {
                let mut buf = [0u8; 4];
                self.type_char(c.encode_utf8(&mut buf), now)
            }
            Input::Backspace => self.backspace(now),
            Input::Delete => self.delete_forward(now),
            Input::Enter => self.enter(now),
            Input::Left => {
                self.move_left();
                vec![]
            }
            Input::Right => {
                self.move_right();
                vec![]
            }
            Input::Up | Input::Down | Input::Home | Input::Tab | Input::Quit => vec![],
        }
    }

    /// Applies the focus transfer scheduled by the previous edit, if it is
    /// still current.
    pub fn flush_focus(&mut self) -> Option<FocusRequest> {
        let request = self.focus.fire()?;
        if self.is_finished() || request.row != self.current_row {
            return None;
        }
        self.rows[request.row]
            .apply_focus(request.column)
            .then_some(request)
    }

    /// Starts the timer on the very first letter of the game. Returns
    /// whether this call started it.
    pub fn on_first_input(&mut self, now: Instant) -> bool {
        if self.is_finished() || !self.timer.start(now) {
            return false;
        }
        self.ticks.arm(now);
        debug!(generation = self.generation, "timer started");
        true
    }

    /// Evaluates a committed row. Win is checked before exhaustion, so a
    /// correct guess on the last row counts as a win.
    pub fn on_row_complete(
        &mut self,
        completion: RowCompletion,
        now: Instant,
    ) -> Result<RowVerdict, SessionError> {
        if completion.generation != self.generation {
            return Err(SessionError::StaleGeneration {
                got: completion.generation,
                current: self.generation,
            });
        }
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        if completion.row_index != self.current_row {
            return Err(SessionError::UnexpectedRow {
                got: completion.row_index,
                current: self.current_row,
            });
        }

        let row_index = completion.row_index;
        self.rows[row_index].record(&completion.values);
        self.total_guesses = row_index + 1;

        let guess = self.rows[row_index].guess();
        if guess == self.target {
            self.has_won = true;
            let result = self.finish(now, row_index + 1);
            self.celebrate_at = Some(now + CELEBRATION_DELAY);
            info!(guesses = result.total_guesses, target = %self.target, "puzzle solved");
            Ok(RowVerdict::Won(result))
        } else if row_index < MAX_ATTEMPTS - 1 {
            self.current_row = row_index + 1;
            self.rows[self.current_row].activate();
            debug!(row = self.current_row, %guess, "guess missed, next row");
            Ok(RowVerdict::Advanced(self.current_row))
        } else {
            self.has_won = false;
            let result = self.finish(now, MAX_ATTEMPTS);
            info!(target = %self.target, "out of attempts");
            Ok(RowVerdict::Lost(result))
        }
    }

    /// Starts over with a new target; completions from before the reset are
    /// rejected as stale.
    pub fn reset(&mut self, new_target: &str) {
        self.target = new_target.trim().to_ascii_uppercase();
        self.generation += 1;
        self.current_row = 0;
        self.has_won = false;
        self.total_guesses = 0;
        self.timer = Timer::new();
        self.ticks = TickSchedule::default();
        self.focus.cancel();
        self.celebrate_at = None;
        self.rows = self.build_rows();
        debug!(generation = self.generation, "session reset");
    }

    /// Stops ticking and drops pending focus when the owner goes away.
    pub fn teardown(&mut self) {
        self.ticks.disarm();
        self.focus.cancel();
    }

    /// Elapsed time at each whole second while the clock runs.
    pub fn poll_tick(&mut self, now: Instant) -> Option<Duration> {
        if self.is_finished() {
            return None;
        }
        self.ticks.poll(now)
    }

    /// True exactly once, when the delayed win presentation is due.
    pub fn poll_celebration(&mut self, now: Instant) -> bool {
        match self.celebrate_at {
            Some(at) if now >= at => {
                self.celebrate_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.timer.display(now)
    }

    fn build_rows(&self) -> Vec<GuessRow> {
        let len = self.word_length();
        let mut rows: Vec<GuessRow> = (0..MAX_ATTEMPTS)
            .map(|i| GuessRow::new(i, &self.target, len, self.generation))
            .collect();
        rows[0].activate();
        rows
    }

    fn active_row_mut(&mut self) -> Option<&mut GuessRow> {
        if self.is_finished() {
            return None;
        }
        self.rows.get_mut(self.current_row)
    }

    fn finish(&mut self, now: Instant, total_guesses: usize) -> GameResult {
        self.timer.stop(now);
        self.ticks.disarm();
        self.focus.cancel();
        self.total_guesses = total_guesses;
        for row in &mut self.rows {
            row.deactivate();
        }
        GameResult {
            has_won: self.has_won,
            total_guesses,
            time_taken: self.timer.display(now),
            target_word: self.target.clone(),
        }
    }

    fn edit<F>(&mut self, now: Instant, apply: F) -> Vec<SessionEvent>
    where
        F: FnOnce(&mut GuessRow) -> Vec<RowEffect>,
    {
        let stamp = self.focus.begin_edit();
        let row_index = self.current_row;
        let effects = match self.active_row_mut() {
            Some(row) => apply(row),
            None => return vec![],
        };

        let mut events = Vec::new();
        for effect in effects {
            match effect {
                RowEffect::FirstInput => {
                    if self.on_first_input(now) {
                        events.push(SessionEvent::TimerStarted(now));
                    }
                }
                RowEffect::Focus(column) => {
                    if let Some(request) = self.focus.schedule(row_index, column, stamp) {
                        events.push(SessionEvent::Focus(request));
                    }
                }
                RowEffect::Complete(completion) => match self.on_row_complete(completion, now) {
                    Ok(RowVerdict::Advanced(next)) => events.push(SessionEvent::Advanced(next)),
                    Ok(RowVerdict::Won(result)) | Ok(RowVerdict::Lost(result)) => {
                        events.push(SessionEvent::Finished(result))
                    }
                    Err(err) => warn!(%err, "row completion rejected"),
                },
            }
        }
        events
    }
}
