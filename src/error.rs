use thiserror::Error;

/// Errors surfaced by the collaborators, storage and configuration layers.
#[derive(Debug, Error)]
pub enum EartleError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("daily word unavailable: {0}")]
    DailyWordUnavailable(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("word list unavailable: {0}")]
    WordList(String),

    #[error("unknown daily word id {0}")]
    UnknownDailyWord(String),

    #[error("unknown user {0}")]
    UnknownUser(String),
}

pub type Result<T> = std::result::Result<T, EartleError>;

/// Misuse of a [`crate::session::GameSession`]; never mutates the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("completion belongs to generation {got}, session is at {current}")]
    StaleGeneration { got: u64, current: u64 },

    #[error("session already finished")]
    Finished,

    #[error("row {got} completed while row {current} is active")]
    UnexpectedRow { got: usize, current: usize },
}
