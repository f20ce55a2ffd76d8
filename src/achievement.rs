use crate::tracker::TypingPerformanceTracker;
use crate::util::percent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AchievementMetric {
    CorrectMatches,
    BestCombos,
    /// Percent, 0-100.
    BestAccuracy,
    /// Correct characters per minute.
    BestWpm,
    /// Key presses per character. Lower is better.
    BestHpw,
}

impl AchievementMetric {
    pub const ALL: [AchievementMetric; 5] = [
        AchievementMetric::CorrectMatches,
        AchievementMetric::BestCombos,
        AchievementMetric::BestAccuracy,
        AchievementMetric::BestWpm,
        AchievementMetric::BestHpw,
    ];

    pub fn direction(&self) -> Direction {
        match self {
            AchievementMetric::BestHpw => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    pub fn satisfies(&self, current: f64, threshold: f64) -> bool {
        match self {
            Direction::HigherIsBetter => current >= threshold,
            Direction::LowerIsBetter => current <= threshold,
        }
    }
}

/// Thresholds and their titles, kept sorted by threshold ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    entries: Vec<(f64, String)>,
}

impl ThresholdTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (f64, S)>,
        S: Into<String>,
    {
        let mut entries: Vec<(f64, String)> = entries
            .into_iter()
            .filter(|(threshold, _)| !threshold.is_nan())
            .map(|(threshold, title)| (threshold, title.into()))
            .collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { entries }
    }

    pub fn entries(&self) -> &[(f64, String)] {
        &self.entries
    }
}

/// Title of the hardest satisfied threshold: the largest one when higher is better, the
/// smallest one when lower is better.
pub fn evaluate(value: f64, table: &ThresholdTable, direction: Direction) -> Option<&str> {
    let mut satisfied = table
        .entries
        .iter()
        .filter(|(threshold, _)| direction.satisfies(value, *threshold));
    let hardest = match direction {
        Direction::HigherIsBetter => satisfied.last(),
        Direction::LowerIsBetter => satisfied.next(),
    };
    hardest.map(|(_, title)| title.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Certification {
    pub name: String,
    pub requirements: Vec<(AchievementMetric, f64)>,
}

/// Current value per metric. A metric with no value yet is absent, never zero.
pub type MetricSnapshot = BTreeMap<AchievementMetric, f64>;

#[derive(Debug, Clone)]
pub struct AchievementEvaluator {
    tables: BTreeMap<AchievementMetric, ThresholdTable>,
    certifications: Vec<Certification>,
}

impl AchievementEvaluator {
    pub fn new(
        tables: BTreeMap<AchievementMetric, ThresholdTable>,
        certifications: Vec<Certification>,
    ) -> Self {
        Self {
            tables,
            certifications,
        }
    }

    pub fn table(&self, metric: AchievementMetric) -> Option<&ThresholdTable> {
        self.tables.get(&metric)
    }

    pub fn evaluate(&self, metric: AchievementMetric, value: f64) -> Option<&str> {
        evaluate(value, self.tables.get(&metric)?, metric.direction())
    }

    pub fn certifications(&self) -> &[Certification] {
        &self.certifications
    }

    /// True only when every requirement of the named certification is met. Unknown names
    /// and missing metrics fail.
    pub fn certify(&self, name: &str, metrics: &MetricSnapshot) -> bool {
        self.certifications
            .iter()
            .find(|c| c.name == name)
            .map(|c| {
                c.requirements.iter().all(|(metric, threshold)| {
                    metrics
                        .get(metric)
                        .is_some_and(|&value| metric.direction().satisfies(value, *threshold))
                })
            })
            .unwrap_or(false)
    }

    pub fn titles(&self, metrics: &MetricSnapshot) -> Vec<(AchievementMetric, &str)> {
        metrics
            .iter()
            .filter_map(|(&metric, &value)| self.evaluate(metric, value).map(|t| (metric, t)))
            .collect()
    }

    pub fn earned_certifications(&self, metrics: &MetricSnapshot) -> Vec<&str> {
        self.certifications
            .iter()
            .filter(|c| self.certify(&c.name, metrics))
            .map(|c| c.name.as_str())
            .collect()
    }
}

impl Default for AchievementEvaluator {
    fn default() -> Self {
        use AchievementMetric::*;

        let tables = BTreeMap::from([
            (
                CorrectMatches,
                ThresholdTable::new([
                    (1.0, "你好双拼"),
                    (10.0, "整挺好"),
                    (100.0, "小试牛刀"),
                    (1000.0, "渐入佳境"),
                    (5000.0, "小有所成"),
                    (10000.0, "轻车熟路"),
                    (20000.0, "真正的粉丝"),
                    (50000.0, "学无止境"),
                ]),
            ),
            (
                BestCombos,
                ThresholdTable::new([
                    (17.0, "格洛克"),
                    (30.0, "突击手"),
                    (42.0, "终极答案"),
                    (100.0, "精准制导"),
                    (238.0, "铀"),
                ]),
            ),
            (
                BestAccuracy,
                ThresholdTable::new([
                    (50.0, "日取其半"),
                    (60.0, "及格了"),
                    (75.0, "中坚力量"),
                    (85.0, "尖子生"),
                    (90.0, "开悟之坡"),
                    (95.0, "平流层"),
                    (99.0, "就差一点"),
                    (100.0, "完美主义"),
                ]),
            ),
            (
                BestWpm,
                ThresholdTable::new([
                    (10.0, "一指禅"),
                    (20.0, "二指禅"),
                    (40.0, "四平八稳"),
                    (60.0, "顺溜"),
                    (80.0, "指尖飞舞"),
                    (100.0, "无情铁手"),
                    (120.0, "芝加哥打字机"),
                    (160.0, "我是传奇"),
                    (200.0, "我是人类"),
                ]),
            ),
            (
                BestHpw,
                ThresholdTable::new([
                    (3.0, "驯服手指"),
                    (2.8, "手眼协调"),
                    (2.5, "肌肉记忆"),
                    (2.3, "精准点射"),
                    (2.1, "狙击手"),
                    (2.0, "复印机"),
                ]),
            ),
        ]);

        let certification = |name: &str, requirements: &[(AchievementMetric, f64)]| {
            Certification {
                name: name.to_string(),
                requirements: requirements.to_vec(),
            }
        };
        let certifications = vec![
            certification("初级双拼认证", &[(CorrectMatches, 1000.0), (BestAccuracy, 75.0)]),
            certification("中级双拼认证", &[(CorrectMatches, 1000.0), (BestAccuracy, 90.0)]),
            certification("高级双拼认证", &[(CorrectMatches, 1000.0), (BestAccuracy, 95.0)]),
            certification(
                "双拼大师",
                &[
                    (CorrectMatches, 1000.0),
                    (BestAccuracy, 99.0),
                    (BestHpw, 2.1),
                    (BestWpm, 120.0),
                ],
            ),
        ];

        Self::new(tables, certifications)
    }
}

/// Lifetime counters and personal bests that feed the evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementProgress {
    pub hits: u64,
    pub total_matches: u64,
    pub correct_matches: u64,
    pub current_combos: u64,
    pub best_combos: u64,
    pub best_accuracy: Option<f64>,
    pub best_wpm: Option<f64>,
    pub best_hpw: Option<f64>,
}

impl AchievementProgress {
    /// Folds in the validation the tracker has just recorded. Rolling bests only move once
    /// the tracker window is full.
    pub fn observe(&mut self, tracker: &TypingPerformanceTracker, is_correct: bool) {
        if let Some(event) = tracker.history().iter().last() {
            self.hits += u64::from(event.presses);
        }
        self.total_matches += 1;
        if is_correct {
            self.correct_matches += 1;
            self.current_combos += 1;
            self.best_combos = self.best_combos.max(self.current_combos);
        } else {
            self.current_combos = 0;
        }

        if !tracker.history().is_full() {
            return;
        }
        let accuracy = percent(tracker.sliding_accuracy());
        self.best_accuracy = Some(self.best_accuracy.map_or(accuracy, |b| b.max(accuracy)));

        let cpm = tracker.chars_per_minute();
        if cpm > 0.0 {
            self.best_wpm = Some(self.best_wpm.map_or(cpm, |b| b.max(cpm)));
        }
        let hpw = tracker.presses_per_char();
        if hpw > 0.0 {
            self.best_hpw = Some(self.best_hpw.map_or(hpw, |b| b.min(hpw)));
        }
    }

    pub fn metrics(&self) -> MetricSnapshot {
        let mut metrics = MetricSnapshot::new();
        metrics.insert(AchievementMetric::CorrectMatches, self.correct_matches as f64);
        metrics.insert(AchievementMetric::BestCombos, self.best_combos as f64);
        if let Some(v) = self.best_accuracy {
            metrics.insert(AchievementMetric::BestAccuracy, v);
        }
        if let Some(v) = self.best_wpm {
            metrics.insert(AchievementMetric::BestWpm, v);
        }
        if let Some(v) = self.best_hpw {
            metrics.insert(AchievementMetric::BestHpw, v);
        }
        metrics
    }
}
