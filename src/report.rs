use tracing::{error, info, warn};

use crate::collab::{Identity, Leaderboard, SubmissionOutcome, SubmissionRequest};
use crate::session::GameResult;

/// Where a finished game goes.
#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum ReportMode {
    /// Practice game; the result stays on screen.
    Local,
    /// Daily puzzle; the result is submitted to the leaderboard.
    Daily { daily_word_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A short user-facing message shown over the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Local(GameResult),
    NewRecord { score: i64, message: String },
    Recorded { score: i64, message: String },
    AlreadyCompleted { score: i64, message: String },
    SignInRequired,
    /// The game was already submitted; nothing was sent.
    AlreadyReported,
    /// The leaderboard answered but refused the submission.
    Failed { error: String },
    /// The leaderboard could not be reached or errored out.
    Unavailable,
}

impl ReportOutcome {
    /// Local results have no notification; the result dialog shows them.
    pub fn notification(&self) -> Option<Notification> {
        let notification = match self {
            ReportOutcome::Local(_) => return None,
            ReportOutcome::NewRecord { score, message } => Notification::new(
                NotificationLevel::Success,
                format!("{message}! Score: {score}"),
            ),
            ReportOutcome::Recorded { score, message } => {
                Notification::info(format!("{message}. Score: {score}"))
            }
            ReportOutcome::AlreadyCompleted { score, message } => {
                Notification::info(format!("{message}. Your score: {score}"))
            }
            ReportOutcome::SignInRequired => {
                Notification::info("Please sign in to submit your score to the leaderboard")
            }
            ReportOutcome::AlreadyReported => Notification::info("Score already submitted"),
            ReportOutcome::Failed { error } => {
                Notification::error(format!("Failed to submit score: {error}"))
            }
            ReportOutcome::Unavailable => {
                Notification::error("Error submitting score to leaderboard")
            }
        };
        Some(notification)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ReportOutcome::Failed { .. } | ReportOutcome::Unavailable)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ReportState {
    #[default]
    Pending,
    Reported,
    Failed,
}

/// Turns a finished game into a leaderboard submission, once.
///
/// Only a successful submission marks the game reported; a failed one
/// leaves the reporter pending so the player can retry.
#[derive(Debug, Default)]
pub struct Reporter {
    state: ReportState,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reported(&self) -> bool {
        self.state == ReportState::Reported
    }

    pub fn can_retry(&self) -> bool {
        self.state == ReportState::Failed
    }

    pub fn reset(&mut self) {
        self.state = ReportState::Pending;
    }

    pub fn report(
        &mut self,
        result: &GameResult,
        mode: &ReportMode,
        identity: Option<&Identity>,
        leaderboard: &dyn Leaderboard,
    ) -> ReportOutcome {
        let daily_word_id = match mode {
            ReportMode::Local => return ReportOutcome::Local(result.clone()),
            ReportMode::Daily { daily_word_id } => daily_word_id,
        };

        if self.is_reported() {
            return ReportOutcome::AlreadyReported;
        }

        let Some(identity) = identity else {
            info!("daily result not submitted, no signed-in user");
            return ReportOutcome::SignInRequired;
        };

        let request = SubmissionRequest {
            user_id: identity.id.clone(),
            daily_word_id: daily_word_id.clone(),
            guesses_count: result.total_guesses as u32,
            duration_seconds: result.time_taken.as_secs(),
            won: result.has_won,
        };

        let response = match leaderboard.submit(&request) {
            Ok(response) => response,
            Err(err) => {
                error!(%err, user = %identity.username, "leaderboard submission failed");
                self.state = ReportState::Failed;
                return ReportOutcome::Unavailable;
            }
        };

        let outcome = match response.outcome() {
            SubmissionOutcome::NewRecord { score, message } => {
                ReportOutcome::NewRecord { score, message }
            }
            SubmissionOutcome::Recorded { score, message } => {
                ReportOutcome::Recorded { score, message }
            }
            SubmissionOutcome::AlreadyCompleted { score, message } => {
                ReportOutcome::AlreadyCompleted { score, message }
            }
            SubmissionOutcome::Failed { error } => {
                warn!(%error, "leaderboard rejected submission");
                self.state = ReportState::Failed;
                return ReportOutcome::Failed { error };
            }
        };

        info!(
            user = %identity.username,
            guesses = request.guesses_count,
            seconds = request.duration_seconds,
            won = request.won,
            "daily result submitted"
        );
        self.state = ReportState::Reported;
        outcome
    }
}
