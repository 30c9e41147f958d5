use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "roundbell";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/roundbell`, falling back to the platform data dir
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn config_path() -> PathBuf {
        match ProjectDirs::from("", "", APP_NAME) {
            Some(pd) => pd.config_dir().join("config.json"),
            None => PathBuf::from("roundbell_config.json"),
        }
    }

    pub fn custom_workouts_path() -> PathBuf {
        match ProjectDirs::from("", "", APP_NAME) {
            Some(pd) => pd.config_dir().join("custom_workouts.json"),
            None => PathBuf::from("roundbell_custom_workouts.json"),
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("progress.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("roundbell.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_files_share_a_directory() {
        if let (Some(db), Some(log)) = (AppDirs::db_path(), AppDirs::log_path()) {
            assert_eq!(db.parent(), log.parent());
            assert!(db.ends_with("progress.db"));
        }
    }

    #[test]
    fn config_files_are_json() {
        assert_eq!(
            AppDirs::config_path().extension().and_then(|e| e.to_str()),
            Some("json")
        );
        assert_eq!(
            AppDirs::custom_workouts_path()
                .extension()
                .and_then(|e| e.to_str()),
            Some("json")
        );
    }
}
