//! Host-facing practice session.
//!
//! `TutorSession` owns every piece of mutable state for one learner: the lesson sequence,
//! the performance tracker, the proficiency ledger and achievement progress. The
//! combination index and curriculum are shared read-only behind `Arc`s. All events must be
//! fed through a single `&mut` path in arrival order.

use crate::achievement::{AchievementEvaluator, AchievementProgress};
use crate::combination::{Combination, CombinationIndex};
use crate::config::{AppState, Settings};
use crate::keys::Curriculum;
use crate::ledger::ProficiencyLedger;
use crate::scheme::{SchemeRegistry, ShuangpinScheme};
use crate::sequencer::{ExerciseSequencer, PracticeSequence, Shuffler};
use crate::tracker::TypingPerformanceTracker;
use crate::unlock::{UnlockScheduler, UnlockState};
use std::sync::Arc;

/// Keys per validated attempt.
pub const KEYS_PER_ATTEMPT: usize = 2;

/// Outcome of one two-key attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub target: char,
    pub keys: String,
    pub is_correct: bool,
    /// Combination credited in the ledger: the typed one when correct, otherwise the
    /// target's first dictionary spelling. `None` for characters outside the index.
    pub combination: Option<Combination>,
}

pub struct TutorSession {
    index: Arc<CombinationIndex>,
    sequencer: ExerciseSequencer,
    schemes: SchemeRegistry,
    scheme: Arc<ShuangpinScheme>,
    settings: Settings,
    tracker: TypingPerformanceTracker,
    ledger: ProficiencyLedger,
    achievements: AchievementProgress,
    evaluator: AchievementEvaluator,
    lesson: i64,
    target: Option<char>,
    pending_keys: String,
}

impl TutorSession {
    pub fn new(
        index: Arc<CombinationIndex>,
        curriculum: Arc<Curriculum>,
        mut schemes: SchemeRegistry,
        shuffler: Box<dyn Shuffler>,
        tracker: TypingPerformanceTracker,
    ) -> Self {
        let settings = Settings::default();
        let scheduler = UnlockScheduler::new(curriculum, index.alphabet().clone());
        let sequencer =
            ExerciseSequencer::new(Arc::clone(&index), scheduler, settings.sequencer, shuffler);
        let scheme = schemes.mode(&settings.shuangpin_mode);
        Self {
            index,
            sequencer,
            schemes,
            scheme,
            settings,
            tracker,
            ledger: ProficiencyLedger::new(),
            achievements: AchievementProgress::default(),
            evaluator: AchievementEvaluator::default(),
            lesson: -1,
            target: None,
            pending_keys: String::new(),
        }
    }

    /// Applies persisted state and starts its saved lesson. Local schemes come from the
    /// registry the session was built with.
    pub fn restore(&mut self, state: AppState, shuffler: Box<dyn Shuffler>) {
        let AppState {
            settings,
            progressive_index,
            progresses,
            achievements,
            ..
        } = state;

        let scheduler = self.sequencer.scheduler().clone();
        self.sequencer =
            ExerciseSequencer::new(Arc::clone(&self.index), scheduler, settings.sequencer, shuffler);
        self.scheme = self.schemes.mode(&settings.shuangpin_mode);
        self.settings = settings;
        self.settings.shuangpin_mode = self.scheme.name.clone();
        self.ledger = ProficiencyLedger::from_records(progresses);
        self.achievements = achievements;
        self.set_lesson(progressive_index);
    }

    pub fn snapshot(&self) -> AppState {
        AppState {
            settings: self.settings.clone(),
            progressive_index: self.lesson,
            progresses: self.ledger.records().clone(),
            local_schemes: self.schemes.local_configs().clone(),
            achievements: self.achievements.clone(),
            saved_at: None,
        }
    }

    /// Switches lesson. The previous sequence, cursor and half-typed keys are dropped.
    pub fn set_lesson(&mut self, idx: i64) -> &PracticeSequence {
        self.lesson = idx;
        self.pending_keys.clear();
        self.sequencer.build(idx);
        self.target = self.sequencer.get_next();
        self.sequencer.sequence()
    }

    pub fn set_scheme(&mut self, name: &str) -> &ShuangpinScheme {
        self.scheme = self.schemes.mode(name);
        self.settings.shuangpin_mode = self.scheme.name.clone();
        self.pending_keys.clear();
        &self.scheme
    }

    pub fn lesson(&self) -> i64 {
        self.lesson
    }

    pub fn unlock_state(&self) -> UnlockState {
        self.sequencer.scheduler().compute(self.lesson)
    }

    pub fn sequence(&self) -> &PracticeSequence {
        self.sequencer.sequence()
    }

    pub fn current_target(&self) -> Option<char> {
        self.target
    }

    /// Advances to the next character without validating the current one.
    pub fn next_char(&mut self) -> Option<char> {
        self.pending_keys.clear();
        self.target = self.sequencer.get_next();
        self.target
    }

    /// Records one key press. Returns the validation once a full two-key attempt is
    /// buffered.
    pub fn press_key(&mut self, key: char) -> Option<Validation> {
        self.tracker.on_key_pressed();
        self.pending_keys.push(key.to_ascii_lowercase());
        if self.pending_keys.chars().count() < KEYS_PER_ATTEMPT {
            return None;
        }
        self.validate()
    }

    /// Validates the buffered keys against the current target and clears the buffer.
    /// `None` when there is no target or nothing buffered.
    pub fn validate(&mut self) -> Option<Validation> {
        let keys = std::mem::take(&mut self.pending_keys);
        let target = self.target?;
        if keys.is_empty() {
            return None;
        }

        let mut buf = [0u8; 4];
        let expected = self.index.pinyin_of(target.encode_utf8(&mut buf));
        let typed = self
            .scheme
            .decode(&keys)
            .iter()
            .find(|full| expected.contains(*full));
        let is_correct = typed.is_some();

        let combination = typed
            .or_else(|| expected.first())
            .and_then(|full| self.index.combination(full))
            .cloned();

        self.tracker.on_valid(is_correct);
        if let Some(combination) = &combination {
            self.ledger
                .record_outcome(combination.ledger_names(), is_correct);
        }
        self.achievements.observe(&self.tracker, is_correct);

        tracing::debug!(%target, %keys, is_correct, "validated attempt");

        if is_correct {
            self.target = self.sequencer.get_next();
        }

        Some(Validation {
            target,
            keys,
            is_correct,
            combination,
        })
    }

    /// Two-key code for the current target under the active scheme, for key hints.
    pub fn hint(&self) -> Option<String> {
        let target = self.target?;
        let mut buf = [0u8; 4];
        self.index
            .pinyin_of(target.encode_utf8(&mut buf))
            .iter()
            .filter_map(|full| self.index.combination(full))
            .find_map(|c| self.scheme.encode(c))
    }

    pub fn index(&self) -> &CombinationIndex {
        &self.index
    }

    pub fn scheme(&self) -> &ShuangpinScheme {
        &self.scheme
    }

    pub fn schemes(&self) -> &SchemeRegistry {
        &self.schemes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tracker(&self) -> &TypingPerformanceTracker {
        &self.tracker
    }

    pub fn ledger(&self) -> &ProficiencyLedger {
        &self.ledger
    }

    pub fn achievements(&self) -> &AchievementProgress {
        &self.achievements
    }

    pub fn evaluator(&self) -> &AchievementEvaluator {
        &self.evaluator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::keys::KeyAlphabet;
    use crate::sequencer::IdentityShuffler;
    use crate::tracker::ManualClock;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn session() -> (TutorSession, ManualClock) {
        let index = Arc::new(CombinationIndex::new(
            KeyAlphabet::standard(),
            Dictionary::embedded().unwrap(),
        ));
        let schemes = SchemeRegistry::new(Arc::clone(&index), BTreeMap::new()).unwrap();
        let clock = ManualClock::new();
        let tracker = TypingPerformanceTracker::with_clock(Box::new(clock.clone()));
        let session = TutorSession::new(
            index,
            Arc::new(Curriculum::standard()),
            schemes,
            Box::new(IdentityShuffler),
            tracker,
        );
        (session, clock)
    }

    fn type_keys(session: &mut TutorSession, keys: &str) -> Option<Validation> {
        keys.chars().fold(None, |_, k| session.press_key(k))
    }

    #[test]
    fn fresh_session_has_no_target() {
        let (mut session, _) = session();
        assert_eq!(session.lesson(), -1);
        assert_eq!(session.current_target(), None);
        assert_eq!(session.press_key('d'), None);
        assert_eq!(session.press_key('e'), None);
        assert_eq!(session.tracker().total_press_count, 2);
        assert_eq!(session.tracker().total_valid_matches, 0);
    }

    #[test]
    fn lesson_one_previews_new_characters_first() {
        let (mut session, _) = session();
        let sequence = session.set_lesson(1).clone();
        assert_eq!(sequence.preview(), &['的', '得', '德', '的']);
        assert_eq!(sequence.tail(), &['饿', '额', '恶', '饿']);
        assert_eq!(session.current_target(), Some('的'));
        assert_eq!(session.hint().as_deref(), Some("de"));
        assert_eq!(session.unlock_state().latest_key.as_deref(), Some("d"));
    }

    #[test]
    fn correct_attempt_credits_all_three_names_and_advances() {
        let (mut session, clock) = session();
        session.set_lesson(1);

        assert_eq!(session.press_key('d'), None);
        let validation = type_keys(&mut session, "E").unwrap();
        assert!(validation.is_correct);
        assert_eq!(validation.target, '的');
        assert_eq!(validation.keys, "de");
        assert_eq!(validation.combination.unwrap().full, "de");
        assert_eq!(session.current_target(), Some('得'));

        for name in ["d", "e", "de"] {
            assert_eq!(session.ledger().accuracy_of(name), 1.0, "{name}");
        }

        clock.advance(Duration::from_millis(800));
        let miss = type_keys(&mut session, "ee").unwrap();
        assert!(!miss.is_correct);
        assert_eq!(miss.target, '得');
        assert_eq!(miss.combination.unwrap().full, "de");
        assert_eq!(session.current_target(), Some('得'));
        assert_eq!(session.ledger().accuracy_of("de"), 0.5);
        assert_eq!(session.ledger().record("e").unwrap().window_len(), 2);

        let tracker = session.tracker();
        assert_eq!(tracker.total_press_count, 4);
        assert_eq!(tracker.total_valid_matches, 2);
        assert_eq!(tracker.total_correct_matches, 1);
        assert_eq!(session.achievements().current_combos, 0);
        assert_eq!(session.achievements().best_combos, 1);
        assert_eq!(session.achievements().hits, 4);
    }

    #[test]
    fn zero_lead_spelling_is_typed_with_its_full_code() {
        let (mut session, _) = session();
        session.set_lesson(1);
        for _ in 0..4 {
            session.next_char();
        }
        assert_eq!(session.current_target(), Some('饿'));
        assert_eq!(session.hint().as_deref(), Some("ee"));

        let validation = type_keys(&mut session, "ee").unwrap();
        assert!(validation.is_correct);
        assert_eq!(session.ledger().record("").unwrap().window_len(), 1);
        assert_eq!(session.ledger().accuracy_of("e"), 1.0);
    }

    #[test]
    fn changing_lesson_drops_half_typed_keys() {
        let (mut session, _) = session();
        session.set_lesson(1);
        session.press_key('x');
        session.set_lesson(2);
        assert_eq!(session.validate(), None);
        assert_eq!(session.lesson(), 2);
        assert_eq!(session.unlock_state().latest_key.as_deref(), Some("i"));
        assert_eq!(session.sequence().chars().first().copied(), session.current_target());
    }

    #[test]
    fn switching_scheme_changes_hints() {
        let (mut session, _) = session();
        session.set_lesson(5);
        session.set_scheme("自然码");
        assert_eq!(session.settings().shuangpin_mode, "自然码");
        assert_eq!(session.scheme().name, "自然码");

        session.set_scheme("does not exist");
        assert_eq!(session.scheme().name, "小鹤双拼");
        assert_eq!(session.settings().shuangpin_mode, "小鹤双拼");
    }

    #[test]
    fn session_can_be_driven_from_another_thread() {
        let (mut session, clock) = session();
        session.set_lesson(1);

        let handle = std::thread::spawn(move || {
            type_keys(&mut session, "de");
            session
        });
        clock.advance(Duration::from_millis(300));
        let session = handle.join().unwrap();
        assert_eq!(session.tracker().total_correct_matches, 1);
        assert_eq!(session.current_target(), Some('得'));
    }

    #[test]
    fn snapshot_restores_into_a_new_session() {
        let (mut session, _) = session();
        session.set_lesson(1);
        session.set_scheme("自然码");
        let hint = session.hint().unwrap();
        type_keys(&mut session, &hint).unwrap();
        let state = session.snapshot();
        assert_eq!(state.progressive_index, 1);

        let (mut restored, _) = self::session();
        restored.restore(state.clone(), Box::new(IdentityShuffler));
        assert_eq!(restored.lesson(), 1);
        assert_eq!(restored.scheme().name, "自然码");
        assert_eq!(restored.ledger().records(), session.ledger().records());
        assert_eq!(restored.achievements(), session.achievements());
        assert_eq!(restored.current_target(), Some('的'));
        assert_eq!(restored.snapshot(), state);
    }
}
