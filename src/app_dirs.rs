use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "shuangpin-tutor";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$XDG_CONFIG_HOME/shuangpin-tutor/state.json` or the platform equivalent; a file in
    /// the working directory when no home directory can be found.
    pub fn state_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.config_dir().join("state.json"))
            .unwrap_or_else(|| PathBuf::from(format!("{APP_NAME}-state.json")))
    }
}
