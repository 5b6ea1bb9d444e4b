use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::words::{MAX_PRACTICE_LENGTH, MIN_PRACTICE_LENGTH};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Remembered player; daily results are submitted under this name.
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub min_word_length: usize,
    pub max_word_length: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            display_name: None,
            min_word_length: MIN_PRACTICE_LENGTH,
            max_word_length: MAX_PRACTICE_LENGTH,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Practice word lengths clamped to what the word list offers.
    pub fn practice_lengths(&self) -> (usize, usize) {
        let min = self
            .min_word_length
            .clamp(MIN_PRACTICE_LENGTH, MAX_PRACTICE_LENGTH);
        let max = self.max_word_length.clamp(min, MAX_PRACTICE_LENGTH);
        (min, max)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "eartle") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("eartle_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(%err, path = %self.path.display(), "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_remembered_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            username: Some("ada".into()),
            display_name: Some("Ada L".into()),
            min_word_length: 5,
            max_word_length: 6,
            log_level: "debug".into(),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "username": "grace" }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();

        assert_eq!(cfg.username.as_deref(), Some("grace"));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.min_word_length, MIN_PRACTICE_LENGTH);
    }

    #[test]
    fn practice_lengths_are_clamped() {
        let cfg = Config {
            min_word_length: 2,
            max_word_length: 12,
            ..Config::default()
        };
        assert_eq!(cfg.practice_lengths(), (4, 7));

        let inverted = Config {
            min_word_length: 6,
            max_word_length: 5,
            ..Config::default()
        };
        assert_eq!(inverted.practice_lengths(), (6, 6));
    }
}
