//! Records and traits for the services the game talks to: identity, the
//! daily puzzle supply and the leaderboard. Field names follow the JSON the
//! services exchange, so records pass through serde untouched.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{EartleError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub email_verified: bool,
}

/// Raw answer of the daily puzzle supply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWordResponse {
    pub success: bool,
    pub word: Option<String>,
    pub daily_word_id: Option<String>,
    pub date: Option<String>,
    pub is_new: Option<bool>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyWord {
    pub word: String,
    pub daily_word_id: String,
    pub date: NaiveDate,
}

impl DailyWordResponse {
    /// Validates the answer. A missing word or id is a fetch failure the
    /// caller may retry, never a panic.
    pub fn into_daily_word(self, today: NaiveDate) -> Result<DailyWord> {
        if !self.success {
            return Err(EartleError::DailyWordUnavailable(
                self.error
                    .unwrap_or_else(|| "Failed to fetch daily word".to_string()),
            ));
        }

        let word = self
            .word
            .map(|w| w.trim().to_ascii_uppercase())
            .filter(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_alphabetic()))
            .ok_or_else(|| EartleError::DailyWordUnavailable("no word in response".to_string()))?;

        let daily_word_id = self
            .daily_word_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                EartleError::DailyWordUnavailable("no daily word id in response".to_string())
            })?;

        let date = self
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or(today);

        Ok(DailyWord {
            word,
            daily_word_id,
            date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub user_id: String,
    pub daily_word_id: String,
    pub guesses_count: u32,
    pub duration_seconds: u64,
    pub won: bool,
}

/// Raw answer of the leaderboard submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: Option<String>,
    pub score: Option<i64>,
    pub previous_score: Option<i64>,
    pub attempted_score: Option<i64>,
    pub is_new_record: Option<bool>,
    pub already_completed: Option<bool>,
    pub error: Option<String>,
}

/// The distinct answers a submission can get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    NewRecord { score: i64, message: String },
    Recorded { score: i64, message: String },
    AlreadyCompleted { score: i64, message: String },
    Failed { error: String },
}

impl SubmissionResponse {
    pub fn outcome(&self) -> SubmissionOutcome {
        if !self.success {
            return SubmissionOutcome::Failed {
                error: self
                    .error
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            };
        }

        let score = self.score.unwrap_or(0);
        let message = self.message.clone().unwrap_or_default();
        if self.already_completed.unwrap_or(false) {
            SubmissionOutcome::AlreadyCompleted { score, message }
        } else if self.is_new_record.unwrap_or(false) {
            SubmissionOutcome::NewRecord { score, message }
        } else {
            SubmissionOutcome::Recorded { score, message }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub score: i64,
    pub guesses: i64,
    pub duration: i64,
}

/// A player's finished daily puzzle, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCompletion {
    pub score: i64,
    pub guesses: i64,
    pub duration: i64,
    pub won: bool,
    pub completed_at: String,
}

pub trait DailyWordSupply {
    fn daily_word(&self, date: NaiveDate) -> Result<DailyWordResponse>;
}

pub trait Leaderboard {
    fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResponse>;
    fn leaderboard(&self, limit: usize, offset: usize) -> Result<Vec<LeaderboardEntry>>;
    fn completion(&self, user_id: &str, daily_word_id: &str) -> Result<Option<DailyCompletion>>;
}

pub trait IdentityProvider {
    fn sign_in(&self, username: &str, display_name: Option<&str>) -> Result<Identity>;
    fn user_by_username(&self, username: &str) -> Result<Option<Identity>>;
}

/// Usernames are 2-20 characters of letters, digits and underscores.
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(2..=20).contains(&len) {
        return Err(EartleError::InvalidUsername(format!(
            "{username:?} must be 2-20 characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(EartleError::InvalidUsername(format!(
            "{username:?} may only contain letters, numbers and underscores"
        )));
    }
    Ok(())
}

/// Highest score first; ties keep their incoming order.
pub fn sort_by_score(entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries
        .into_iter()
        .sorted_by(|a, b| b.score.cmp(&a.score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_daily_word_is_uppercased() {
        let response: DailyWordResponse = serde_json::from_str(
            r#"{"success":true,"word":"crane","daily_word_id":"17","date":"2025-03-13","is_new":false}"#,
        )
        .unwrap();

        let daily = response.into_daily_word(today()).unwrap();

        assert_eq!(daily.word, "CRANE");
        assert_eq!(daily.daily_word_id, "17");
        assert_eq!(daily.date, NaiveDate::from_ymd_opt(2025, 3, 13).unwrap());
    }

    #[test]
    fn test_daily_word_missing_word_is_unavailable() {
        let response = DailyWordResponse {
            success: true,
            daily_word_id: Some("1".into()),
            ..Default::default()
        };

        assert_matches!(
            response.into_daily_word(today()),
            Err(EartleError::DailyWordUnavailable(_))
        );
    }

    #[test]
    fn test_daily_word_failure_keeps_reason() {
        let response = DailyWordResponse {
            success: false,
            error: Some("database offline".into()),
            ..Default::default()
        };

        assert_matches!(
            response.into_daily_word(today()),
            Err(EartleError::DailyWordUnavailable(reason)) if reason == "database offline"
        );
    }

    #[test]
    fn test_daily_word_without_date_falls_back_to_today() {
        let response = DailyWordResponse {
            success: true,
            word: Some("plant".into()),
            daily_word_id: Some("2".into()),
            ..Default::default()
        };

        assert_eq!(response.into_daily_word(today()).unwrap().date, today());
    }

    #[test]
    fn test_submission_outcomes_are_distinct() {
        let new_record = SubmissionResponse {
            success: true,
            score: Some(540),
            is_new_record: Some(true),
            message: Some("New personal best".into()),
            ..Default::default()
        };
        let already = SubmissionResponse {
            success: true,
            score: Some(320),
            already_completed: Some(true),
            is_new_record: Some(true),
            ..Default::default()
        };
        let failed = SubmissionResponse::default();

        assert_matches!(new_record.outcome(), SubmissionOutcome::NewRecord { score: 540, .. });
        assert_matches!(already.outcome(), SubmissionOutcome::AlreadyCompleted { score: 320, .. });
        assert_eq!(
            failed.outcome(),
            SubmissionOutcome::Failed {
                error: "Unknown error".into()
            }
        );
    }

    #[test]
    fn test_identity_uses_camel_case_fields() {
        let json = r#"{"id":"7","username":"ada","displayName":"Ada","avatar":null,"emailVerified":true}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();

        assert_eq!(identity.display_name, "Ada");
        assert!(identity.email_verified);
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ada_99").is_ok());
        assert!(validate_username("a").is_err());
        assert!(validate_username("this_name_is_far_too_long").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_sort_by_score() {
        let entry = |id: &str, score| LeaderboardEntry {
            id: id.into(),
            username: id.into(),
            display_name: id.into(),
            avatar: None,
            score,
            guesses: 3,
            duration: 60,
        };

        let sorted = sort_by_score(vec![entry("a", 10), entry("b", 30), entry("c", 20)]);

        let ids: Vec<&str> = sorted.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }
}
