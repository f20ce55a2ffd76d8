// Library surface for the CLI and integration tests.
// Hosts own a `TutorSession`; everything else is reusable on its own.
pub mod achievement;
pub mod app_dirs;
pub mod combination;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod scheme;
pub mod sequencer;
pub mod session;
pub mod tracker;
pub mod unlock;
pub mod util;
pub mod window;

pub use achievement::{AchievementEvaluator, AchievementMetric, AchievementProgress};
pub use combination::{Combination, CombinationIndex};
pub use config::{AppState, FileStateStore, Settings, StateStore};
pub use dictionary::Dictionary;
pub use keys::{Curriculum, KeyAlphabet};
pub use ledger::ProficiencyLedger;
pub use scheme::{SchemeRegistry, ShuangpinScheme};
pub use sequencer::{ExerciseSequencer, PracticeSequence, RandomShuffler, SequencerConfig};
pub use session::{TutorSession, Validation};
pub use tracker::TypingPerformanceTracker;
pub use unlock::{Novelty, UnlockScheduler, UnlockState};
