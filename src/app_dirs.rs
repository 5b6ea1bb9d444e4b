use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("eartle"))
        } else {
            ProjectDirs::from("", "", "eartle").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("eartle.db"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_share_the_state_dir() {
        let (Some(state), Some(db), Some(logs)) =
            (AppDirs::state_dir(), AppDirs::db_path(), AppDirs::log_dir())
        else {
            return;
        };

        assert!(state.ends_with("eartle"));
        assert_eq!(db.parent(), Some(state.as_path()));
        assert_eq!(db.file_name().and_then(|f| f.to_str()), Some("eartle.db"));
        assert_eq!(logs.parent(), Some(state.as_path()));
    }
}
