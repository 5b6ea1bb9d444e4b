use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

use crate::collab::{
    sort_by_score, validate_username, DailyCompletion, DailyWordResponse, DailyWordSupply,
    Identity, IdentityProvider, Leaderboard, LeaderboardEntry, SubmissionRequest,
    SubmissionResponse,
};
use crate::error::{EartleError, Result};
use crate::session::MAX_ATTEMPTS;
use crate::words::WordList;

/// Seconds under which a win earns a time bonus.
const TIME_BONUS_WINDOW_SECS: i64 = 300;

/// Score for one daily puzzle: fewer guesses and a faster finish score
/// higher, a loss scores nothing.
pub fn score_for(guesses: u32, duration_seconds: u64, won: bool) -> i64 {
    if !won {
        return 0;
    }
    let unused = (MAX_ATTEMPTS as i64 + 1 - guesses as i64).max(1);
    let seconds = i64::try_from(duration_seconds).unwrap_or(i64::MAX);
    let time_bonus = TIME_BONUS_WINDOW_SECS.saturating_sub(seconds).max(0) / 3;
    unused * 100 + time_bonus
}

/// Local SQLite home of players, daily words and leaderboard scores.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    daily_pool: Vec<String>,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened store");
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                avatar TEXT,
                email_verified BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                last_active_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS daily_words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL UNIQUE,
                word TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS leaderboard (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                daily_word_id INTEGER NOT NULL REFERENCES daily_words(id),
                guesses INTEGER NOT NULL,
                duration_seconds INTEGER NOT NULL,
                won BOOLEAN NOT NULL,
                score INTEGER NOT NULL,
                completed_at TEXT NOT NULL,
                UNIQUE (user_id, daily_word_id)
            );

            CREATE INDEX IF NOT EXISTS idx_leaderboard_user ON leaderboard(user_id);
            "#,
        )?;

        Ok(Store {
            conn,
            daily_pool: WordList::embedded()?.daily_pool(),
        })
    }

    /// Replaces the candidate words for the word of the day.
    pub fn with_daily_pool(mut self, pool: Vec<String>) -> Self {
        self.daily_pool = pool;
        self
    }

    fn pick_daily_word(&self, date: NaiveDate) -> Option<&String> {
        if self.daily_pool.is_empty() {
            return None;
        }
        let day = date.signed_duration_since(NaiveDate::MIN).num_days();
        let index = day.rem_euclid(self.daily_pool.len() as i64) as usize;
        self.daily_pool.get(index)
    }

    fn parse_id(raw: &str, not_found: fn(String) -> EartleError) -> Result<i64> {
        raw.parse::<i64>().map_err(|_| not_found(raw.to_string()))
    }

    fn user_by_id(&self, id: i64) -> Result<Option<Identity>> {
        let identity = self
            .conn
            .query_row(
                "SELECT id, username, display_name, avatar, email_verified FROM users WHERE id = ?1",
                [id],
                row_to_identity,
            )
            .optional()?;
        Ok(identity)
    }

    fn daily_word_exists(&self, id: i64) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT id FROM daily_words WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}

fn row_to_identity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Identity> {
    Ok(Identity {
        id: row.get::<_, i64>(0)?.to_string(),
        username: row.get(1)?,
        display_name: row.get(2)?,
        avatar: row.get(3)?,
        email_verified: row.get(4)?,
    })
}

impl DailyWordSupply for Store {
    fn daily_word(&self, date: NaiveDate) -> Result<DailyWordResponse> {
        let key = date.format("%Y-%m-%d").to_string();

        let Some(word) = self.pick_daily_word(date).cloned() else {
            return Ok(DailyWordResponse {
                success: false,
                error: Some("No words available".to_string()),
                ..Default::default()
            });
        };

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO daily_words (date, word) VALUES (?1, ?2)",
            params![key, word.to_ascii_lowercase()],
        )?;

        let (id, word): (i64, String) = self.conn.query_row(
            "SELECT id, word FROM daily_words WHERE date = ?1",
            [&key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        if inserted > 0 {
            info!(date = %key, "new daily word drawn");
        }

        Ok(DailyWordResponse {
            success: true,
            word: Some(word),
            daily_word_id: Some(id.to_string()),
            date: Some(key),
            is_new: Some(inserted > 0),
            error: None,
        })
    }
}

impl Leaderboard for Store {
    fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResponse> {
        let user_id = Self::parse_id(&request.user_id, EartleError::UnknownUser)?;
        let daily_word_id = Self::parse_id(&request.daily_word_id, EartleError::UnknownDailyWord)?;

        if self.user_by_id(user_id)?.is_none() {
            return Err(EartleError::UnknownUser(request.user_id.clone()));
        }
        if !self.daily_word_exists(daily_word_id)? {
            return Err(EartleError::UnknownDailyWord(request.daily_word_id.clone()));
        }
        if !(1..=MAX_ATTEMPTS as u32).contains(&request.guesses_count) {
            return Ok(SubmissionResponse {
                success: false,
                error: Some("Invalid guess count".to_string()),
                ..Default::default()
            });
        }
        // SQLite integers are signed.
        let Ok(duration_seconds) = i64::try_from(request.duration_seconds) else {
            return Ok(SubmissionResponse {
                success: false,
                error: Some("Invalid duration".to_string()),
                ..Default::default()
            });
        };

        let attempted = score_for(request.guesses_count, request.duration_seconds, request.won);

        let prior: Option<i64> = self
            .conn
            .query_row(
                "SELECT score FROM leaderboard WHERE user_id = ?1 AND daily_word_id = ?2",
                params![user_id, daily_word_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(score) = prior {
            return Ok(SubmissionResponse {
                success: true,
                message: Some("Already completed today's challenge".to_string()),
                score: Some(score),
                previous_score: Some(score),
                attempted_score: Some(attempted),
                is_new_record: Some(false),
                already_completed: Some(true),
                error: None,
            });
        }

        let best: Option<i64> = self.conn.query_row(
            "SELECT MAX(score) FROM leaderboard WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;

        self.conn.execute(
            r#"
            INSERT INTO leaderboard
            (user_id, daily_word_id, guesses, duration_seconds, won, score, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                user_id,
                daily_word_id,
                request.guesses_count,
                duration_seconds,
                request.won,
                attempted,
                Local::now().to_rfc3339(),
            ],
        )?;

        let is_new_record = match best {
            Some(best) => attempted > best,
            None => attempted > 0,
        };

        Ok(SubmissionResponse {
            success: true,
            message: Some(if is_new_record {
                "New personal best".to_string()
            } else {
                "Score submitted".to_string()
            }),
            score: Some(attempted),
            previous_score: best,
            attempted_score: Some(attempted),
            is_new_record: Some(is_new_record),
            already_completed: Some(false),
            error: None,
        })
    }

    fn leaderboard(&self, limit: usize, offset: usize) -> Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                u.id,
                u.username,
                u.display_name,
                u.avatar,
                SUM(l.score) AS total_score,
                SUM(l.guesses) AS total_guesses,
                SUM(l.duration_seconds) AS total_duration
            FROM leaderboard l
            JOIN users u ON u.id = l.user_id
            GROUP BY u.id
            ORDER BY total_score DESC, u.username ASC
            LIMIT ?1 OFFSET ?2
            "#,
        )?;

        let entries = stmt
            .query_map(params![limit as i64, offset as i64], |row| {
                Ok(LeaderboardEntry {
                    id: row.get::<_, i64>(0)?.to_string(),
                    username: row.get(1)?,
                    display_name: row.get(2)?,
                    avatar: row.get(3)?,
                    score: row.get(4)?,
                    guesses: row.get(5)?,
                    duration: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(sort_by_score(entries))
    }

    fn completion(&self, user_id: &str, daily_word_id: &str) -> Result<Option<DailyCompletion>> {
        let (Ok(user_id), Ok(daily_word_id)) = (user_id.parse::<i64>(), daily_word_id.parse::<i64>())
        else {
            return Ok(None);
        };

        let completion = self
            .conn
            .query_row(
                r#"
                SELECT score, guesses, duration_seconds, won, completed_at
                FROM leaderboard
                WHERE user_id = ?1 AND daily_word_id = ?2
                "#,
                params![user_id, daily_word_id],
                |row| {
                    Ok(DailyCompletion {
                        score: row.get(0)?,
                        guesses: row.get(1)?,
                        duration: row.get(2)?,
                        won: row.get(3)?,
                        completed_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(completion)
    }
}

impl IdentityProvider for Store {
    /// Signs in as `username`, creating the player on first use.
    fn sign_in(&self, username: &str, display_name: Option<&str>) -> Result<Identity> {
        validate_username(username)?;
        let now = Local::now().to_rfc3339();
        let display_name = display_name
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(username);

        self.conn.execute(
            r#"
            INSERT INTO users (username, display_name, email_verified, created_at, last_active_at)
            VALUES (?1, ?2, 1, ?3, ?3)
            ON CONFLICT(username) DO UPDATE SET
                display_name = excluded.display_name,
                last_active_at = excluded.last_active_at
            "#,
            params![username, display_name, now],
        )?;

        self.user_by_username(username)?
            .ok_or_else(|| EartleError::UnknownUser(username.to_string()))
    }

    fn user_by_username(&self, username: &str) -> Result<Option<Identity>> {
        let identity = self
            .conn
            .query_row(
                "SELECT id, username, display_name, avatar, email_verified FROM users WHERE username = ?1",
                [username],
                row_to_identity,
            )
            .optional()?;
        Ok(identity)
    }
}
