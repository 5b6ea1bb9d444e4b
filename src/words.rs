use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::from_str;

use crate::error::{EartleError, Result};

static WORDS_DIR: Dir = include_dir!("src/words");

pub const DAILY_WORD_LENGTH: usize = 5;
pub const MIN_PRACTICE_LENGTH: usize = 4;
pub const MAX_PRACTICE_LENGTH: usize = 7;

#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordList {
    /// The list compiled into the binary.
    pub fn embedded() -> Result<Self> {
        read_word_list("english.json")
    }

    /// Words usable in a practice game, uppercased.
    pub fn practice_words(&self, min_len: usize, max_len: usize) -> Vec<String> {
        self.words
            .iter()
            .filter(|w| (min_len..=max_len).contains(&w.chars().count()))
            .map(|w| w.to_ascii_uppercase())
            .collect()
    }

    pub fn random_practice_word<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        min_len: usize,
        max_len: usize,
    ) -> Option<String> {
        self.practice_words(min_len, max_len).choose(rng).cloned()
    }

    /// Candidates for the word of the day.
    pub fn daily_pool(&self) -> Vec<String> {
        self.practice_words(DAILY_WORD_LENGTH, DAILY_WORD_LENGTH)
    }
}

fn read_word_list(file_name: &str) -> Result<WordList> {
    let file = WORDS_DIR
        .get_file(file_name)
        .ok_or_else(|| EartleError::WordList(format!("{file_name} not found")))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| EartleError::WordList(format!("{file_name} is not utf-8")))?;

    let list: WordList = from_str(contents)?;
    if list.words.is_empty() {
        return Err(EartleError::WordList(format!("{file_name} has no words")));
    }
    Ok(list)
}
