use crate::achievement::AchievementProgress;
use crate::app_dirs::AppDirs;
use crate::ledger::ProgressRecord;
use crate::scheme::SchemeLayout;
use crate::sequencer::SequencerConfig;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enable_auto_clear: bool,
    pub enable_key_hint: bool,
    pub enable_pinyin_hint: bool,
    pub theme: Theme,
    pub shuangpin_mode: String,
    pub sequencer: SequencerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_auto_clear: true,
            enable_key_hint: true,
            enable_pinyin_hint: true,
            theme: Theme::Auto,
            shuangpin_mode: "小鹤双拼".to_string(),
            sequencer: SequencerConfig::default(),
        }
    }
}

/// Everything that survives between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub settings: Settings,
    pub progressive_index: i64,
    pub progresses: BTreeMap<String, ProgressRecord>,
    pub local_schemes: BTreeMap<String, SchemeLayout>,
    pub achievements: AchievementProgress,
    pub saved_at: Option<DateTime<Local>>,
}

pub trait StateStore {
    fn load(&self) -> AppState;
    fn save(&self, state: &AppState) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::state_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like [`StateStore::load`], but IO failures other than a missing file are returned
    /// instead of being replaced by defaults. Unparseable content still loads defaults.
    pub fn try_load(&self) -> io::Result<AppState> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(AppState::default()),
            Err(err) => return Err(err),
        };
        match serde_json::from_slice::<AppState>(&bytes) {
            Ok(state) => Ok(state),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "ignoring unparseable state file");
                Ok(AppState::default())
            }
        }
    }
}

impl Default for FileStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for FileStateStore {
    /// Missing or unreadable state loads as defaults. Anything but a missing file is
    /// logged.
    fn load(&self) -> AppState {
        self.try_load().unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), %err, "cannot read state file, using defaults");
            AppState::default()
        })
    }

    fn save(&self, state: &AppState) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut state = state.clone();
        state.saved_at = Some(Local::now());
        let data = serde_json::to_vec_pretty(&state)?;
        fs::write(&self.path, data)
    }
}
