use crate::util::ratio;
use crate::window::SlidingWindow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rolling correctness for one key or combination name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub total_attempts: u64,
    correct_sum: usize,
    history: SlidingWindow<bool>,
}

impl ProgressRecord {
    pub fn push(&mut self, is_correct: bool) {
        if is_correct {
            self.correct_sum += 1;
        }
        if let Some(true) = self.history.push(is_correct) {
            self.correct_sum -= 1;
        }
        self.total_attempts += 1;
    }

    pub fn correct_sum(&self) -> usize {
        self.correct_sum
    }

    pub fn window_len(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &SlidingWindow<bool> {
        &self.history
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct_sum as f64, self.history.len() as f64)
    }

    /// Rebuilds the window at the standard capacity and recomputes the running sum.
    fn normalized(self) -> Self {
        let mut history = SlidingWindow::default();
        for &bit in self.history.iter() {
            history.push(bit);
        }
        let correct_sum = history.iter().filter(|&&bit| bit).count();
        Self {
            total_attempts: self.total_attempts.max(history.len() as u64),
            correct_sum,
            history,
        }
    }
}

/// Per-name rolling accuracy used to find weak keys and combinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProficiencyLedger {
    records: BTreeMap<String, ProgressRecord>,
}

impl ProficiencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores persisted records, trimming oversized histories and recomputing sums.
    pub fn from_records(records: BTreeMap<String, ProgressRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|(name, record)| (name, record.normalized()))
                .collect(),
        }
    }

    pub fn get_or_create(&mut self, name: &str) -> &mut ProgressRecord {
        self.records.entry(name.to_string()).or_default()
    }

    /// Appends one outcome to each named record independently.
    pub fn record_outcome(&mut self, names: [&str; 3], is_correct: bool) {
        for name in names {
            self.get_or_create(name).push(is_correct);
        }
    }

    pub fn accuracy_of(&self, name: &str) -> f64 {
        self.records
            .get(name)
            .map(ProgressRecord::accuracy)
            .unwrap_or(0.0)
    }

    pub fn record(&self, name: &str) -> Option<&ProgressRecord> {
        self.records.get(name)
    }

    pub fn records(&self) -> &BTreeMap<String, ProgressRecord> {
        &self.records
    }

    /// Up to `limit` names with at least `min_window` samples, lowest accuracy first.
    /// The empty zero-lead name is never reported.
    pub fn weakest(&self, limit: usize, min_window: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .records
            .iter()
            .filter(|(name, record)| !name.is_empty() && record.window_len() >= min_window.max(1))
            .map(|(name, record)| (name.as_str(), record.accuracy()))
            .collect();
        ranked.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WINDOW_CAPACITY;

    #[test]
    fn one_outcome_updates_three_records() {
        let mut ledger = ProficiencyLedger::new();
        ledger.record_outcome(["b", "a", "ba"], true);

        for name in ["b", "a", "ba"] {
            let record = ledger.record(name).unwrap();
            assert_eq!(record.correct_sum(), 1);
            assert_eq!(record.window_len(), 1);
            assert_eq!(record.total_attempts, 1);
        }
        assert_eq!(ledger.records().len(), 3);
    }

    #[test]
    fn unknown_name_has_zero_accuracy() {
        let mut ledger = ProficiencyLedger::new();
        assert_eq!(ledger.accuracy_of("zh"), 0.0);
        ledger.get_or_create("zh");
        assert_eq!(ledger.accuracy_of("zh"), 0.0);
    }

    #[test]
    fn running_sum_matches_recount_after_eviction() {
        let mut record = ProgressRecord::default();
        for i in 0..=WINDOW_CAPACITY {
            record.push(i % 3 != 0);
        }
        let recount = record.history().iter().filter(|&&b| b).count();
        assert_eq!(record.window_len(), WINDOW_CAPACITY);
        assert_eq!(record.correct_sum(), recount);
        assert_eq!(record.total_attempts, WINDOW_CAPACITY as u64 + 1);
        assert!((0.0..=1.0).contains(&record.accuracy()));
    }

    #[test]
    fn accuracy_tracks_recent_window_only() {
        let mut ledger = ProficiencyLedger::new();
        for _ in 0..WINDOW_CAPACITY {
            ledger.record_outcome(["d", "e", "de"], false);
        }
        for _ in 0..WINDOW_CAPACITY {
            ledger.record_outcome(["d", "e", "de"], true);
        }
        assert_eq!(ledger.accuracy_of("de"), 1.0);
        assert_eq!(ledger.record("de").unwrap().total_attempts, 100);
    }

    #[test]
    fn weakest_orders_by_accuracy_then_name() {
        let mut ledger = ProficiencyLedger::new();
        ledger.record_outcome(["b", "a", "ba"], false);
        ledger.record_outcome(["m", "a", "ma"], true);
        ledger.record_outcome(["", "e", "e"], false);

        let weakest = ledger.weakest(3, 1);
        assert_eq!(weakest, vec![("b", 0.0), ("ba", 0.0), ("e", 0.0)]);
        assert!(ledger.weakest(10, 3).is_empty());
    }

    #[test]
    fn from_records_normalizes_sums() {
        let raw = r#"{"total_attempts": 2, "correct_sum": 9, "history": {"capacity": 50, "entries": [true, false]}}"#;
        let record: ProgressRecord = serde_json::from_str(raw).unwrap();
        let ledger = ProficiencyLedger::from_records(BTreeMap::from([("x".to_string(), record)]));
        assert_eq!(ledger.record("x").unwrap().correct_sum(), 1);
        assert_eq!(ledger.accuracy_of("x"), 0.5);
    }
}
