use crate::combination::Combination;
use crate::keys::{Curriculum, KeyAlphabet};
use std::sync::Arc;

/// Keys unlocked at one lesson index. Derived on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockState {
    /// Unlocked keys in curriculum order, the newest one included.
    pub active_keys: Vec<String>,
    pub latest_key: Option<String>,
    /// Unlocked lead keys plus the empty lead. Empty for an empty lesson.
    pub active_leads: Vec<String>,
}

impl UnlockState {
    pub fn is_empty(&self) -> bool {
        self.active_keys.is_empty()
    }

    pub fn is_active_key(&self, key: &str) -> bool {
        self.active_keys.iter().any(|k| k == key)
    }

    pub fn is_active_lead(&self, lead: &str) -> bool {
        self.active_leads.iter().any(|k| k == lead)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Novelty {
    /// Uses the key unlocked by this lesson.
    New,
    Review,
}

#[derive(Debug, Clone)]
pub struct UnlockScheduler {
    curriculum: Arc<Curriculum>,
    alphabet: KeyAlphabet,
}

impl UnlockScheduler {
    pub fn new(curriculum: Arc<Curriculum>, alphabet: KeyAlphabet) -> Self {
        Self {
            curriculum,
            alphabet,
        }
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn lesson_count(&self) -> usize {
        self.curriculum.len()
    }

    /// Unlock state for lesson `idx`. Negative indexes give the empty lesson; indexes past
    /// the end clamp to the last lesson.
    pub fn compute(&self, idx: i64) -> UnlockState {
        if idx < 0 || self.curriculum.is_empty() {
            return UnlockState::default();
        }
        let idx = (idx as usize).min(self.curriculum.len() - 1);

        let active_keys: Vec<String> = self.curriculum.keys()[..=idx].to_vec();
        let mut active_leads: Vec<String> = active_keys
            .iter()
            .filter(|k| self.alphabet.is_lead(k))
            .cloned()
            .collect();
        active_leads.push(String::new());

        UnlockState {
            latest_key: self.curriculum.get(idx).map(str::to_string),
            active_keys,
            active_leads,
        }
    }

    /// `None` when either half of the combination is still locked.
    pub fn classify(&self, combination: &Combination, state: &UnlockState) -> Option<Novelty> {
        if !state.is_active_key(&combination.follow) || !state.is_active_lead(&combination.lead) {
            return None;
        }
        let latest = state.latest_key.as_deref();
        if latest == Some(combination.lead.as_str()) || latest == Some(combination.follow.as_str())
        {
            Some(Novelty::New)
        } else {
            Some(Novelty::Review)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> UnlockScheduler {
        UnlockScheduler::new(Arc::new(Curriculum::standard()), KeyAlphabet::standard())
    }

    #[test]
    fn negative_index_is_an_empty_lesson() {
        let state = scheduler().compute(-1);
        assert!(state.is_empty());
        assert!(state.active_leads.is_empty());
        assert_eq!(state.latest_key, None);
    }

    #[test]
    fn first_lesson_unlocks_one_key() {
        let state = scheduler().compute(0);
        assert_eq!(state.active_keys, vec!["e".to_string()]);
        assert_eq!(state.latest_key.as_deref(), Some("e"));
        assert_eq!(state.active_leads, vec![String::new()]);
    }

    #[test]
    fn leads_are_collected_with_the_empty_lead() {
        let state = scheduler().compute(6);
        assert_eq!(
            state.active_keys,
            vec!["e", "d", "i", "u", "y", "zh", "sh"]
        );
        assert_eq!(state.latest_key.as_deref(), Some("sh"));
        assert_eq!(state.active_leads, vec!["d", "y", "zh", "sh", ""]);
    }

    #[test]
    fn index_past_the_end_clamps() {
        let s = scheduler();
        let last = s.compute(s.lesson_count() as i64 - 1);
        assert_eq!(s.compute(10_000), last);
        assert_eq!(last.latest_key.as_deref(), Some("ng"));
    }

    #[test]
    fn classify_new_review_and_locked() {
        let s = scheduler();
        let state = s.compute(2); // e d i
        assert_eq!(
            s.classify(&Combination::new("d", "i"), &state),
            Some(Novelty::New)
        );
        assert_eq!(
            s.classify(&Combination::new("d", "e"), &state),
            Some(Novelty::Review)
        );
        assert_eq!(
            s.classify(&Combination::new("", "e"), &state),
            Some(Novelty::Review)
        );
        assert_eq!(s.classify(&Combination::new("b", "i"), &state), None);
        assert_eq!(s.classify(&Combination::new("d", "a"), &state), None);
    }

    #[test]
    fn newly_unlocked_lead_marks_combinations_new() {
        let s = scheduler();
        let state = s.compute(1); // e d
        assert_eq!(
            s.classify(&Combination::new("d", "e"), &state),
            Some(Novelty::New)
        );
    }
}
