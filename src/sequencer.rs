use crate::combination::CombinationIndex;
use crate::unlock::{Novelty, UnlockScheduler};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Characters drawn from each combination, repeating when it has fewer.
    pub samples_per_combination: usize,
    /// Leading slice of new-key characters shown once per lesson.
    pub preview_size: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            samples_per_combination: 4,
            preview_size: 10,
        }
    }
}

/// Strategy for permuting a practice pool.
pub trait Shuffler: Send {
    fn shuffle(&mut self, items: &mut [char]);
}

/// Uniform shuffle backed by any `rand` generator.
pub struct RandomShuffler<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomShuffler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomShuffler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> Shuffler for RandomShuffler<R> {
    fn shuffle(&mut self, items: &mut [char]) {
        items.shuffle(&mut self.rng);
    }
}

/// Leaves pools in construction order.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityShuffler;

impl Shuffler for IdentityShuffler {
    fn shuffle(&mut self, _items: &mut [char]) {}
}

/// `count` samples taken cyclically: the i-th sample is `chars[i % chars.len()]`.
/// Short pools repeat; an empty pool yields nothing.
pub fn sample_cyclic(chars: &[char], count: usize) -> Vec<char> {
    if chars.is_empty() {
        return Vec::new();
    }
    (0..count).map(|i| chars[i % chars.len()]).collect()
}

/// Practice characters for one lesson: a preview of new-key characters, then a tail that
/// loops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeSequence {
    chars: Vec<char>,
    preview_len: usize,
}

impl PracticeSequence {
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn preview(&self) -> &[char] {
        &self.chars[..self.preview_len]
    }

    pub fn tail(&self) -> &[char] {
        &self.chars[self.preview_len..]
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Per-lesson character pools, split by whether they exercise the newest key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonPools {
    pub new_pool: Vec<char>,
    pub review_pool: Vec<char>,
}

impl LessonPools {
    pub fn sampled_len(&self) -> usize {
        self.new_pool.len() + self.review_pool.len()
    }
}

pub struct ExerciseSequencer {
    index: Arc<CombinationIndex>,
    scheduler: UnlockScheduler,
    config: SequencerConfig,
    shuffler: Box<dyn Shuffler>,
    lesson: Option<i64>,
    sequence: PracticeSequence,
    cursor: usize,
}

impl ExerciseSequencer {
    pub fn new(
        index: Arc<CombinationIndex>,
        scheduler: UnlockScheduler,
        config: SequencerConfig,
        shuffler: Box<dyn Shuffler>,
    ) -> Self {
        Self {
            index,
            scheduler,
            config,
            shuffler,
            lesson: None,
            sequence: PracticeSequence::default(),
            cursor: 0,
        }
    }

    pub fn config(&self) -> SequencerConfig {
        self.config
    }

    pub fn scheduler(&self) -> &UnlockScheduler {
        &self.scheduler
    }

    /// Sampled characters for lesson `idx`, before any shuffling.
    pub fn pools(&self, idx: i64) -> LessonPools {
        let state = self.scheduler.compute(idx);
        let mut pools = LessonPools::default();

        let follows = state
            .active_keys
            .iter()
            .filter(|k| self.index.alphabet().is_follow(k));
        for follow in follows {
            for combination in self.index.lookup_by_follow(follow) {
                if !state.is_active_lead(&combination.lead) {
                    continue;
                }
                let samples = sample_cyclic(
                    self.index.characters_of(combination),
                    self.config.samples_per_combination,
                );
                match self.scheduler.classify(combination, &state) {
                    Some(Novelty::New) => pools.new_pool.extend(samples),
                    Some(Novelty::Review) => pools.review_pool.extend(samples),
                    None => {}
                }
            }
        }
        pools
    }

    /// Rebuilds the sequence for lesson `idx` and rewinds the cursor. Nothing from the
    /// previous lesson survives.
    pub fn build(&mut self, idx: i64) -> &PracticeSequence {
        let LessonPools {
            mut new_pool,
            mut review_pool,
        } = self.pools(idx);
        self.shuffler.shuffle(&mut new_pool);
        self.shuffler.shuffle(&mut review_pool);

        let preview_len = self.config.preview_size.min(new_pool.len());
        let rest = new_pool.split_off(preview_len);
        let mut tail: Vec<char> = rest.into_iter().interleave(review_pool).collect();
        self.shuffler.shuffle(&mut tail);

        tracing::debug!(
            lesson = idx,
            preview = preview_len,
            tail = tail.len(),
            "built practice sequence"
        );

        let mut chars = new_pool;
        chars.extend(tail);
        self.sequence = PracticeSequence { chars, preview_len };
        self.lesson = Some(idx);
        self.cursor = 0;
        &self.sequence
    }

    /// Next character to practise, or `None` for an empty lesson. After the last
    /// character the cursor jumps back past the preview, or to the start when the whole
    /// sequence fits inside the preview size.
    pub fn get_next(&mut self) -> Option<char> {
        let c = *self.sequence.chars.get(self.cursor)?;
        let mut next = self.cursor + 1;
        if next >= self.sequence.len() {
            next = if self.sequence.len() > self.config.preview_size {
                self.config.preview_size
            } else {
                0
            };
        }
        self.cursor = next;
        Some(c)
    }

    pub fn sequence(&self) -> &PracticeSequence {
        &self.sequence
    }

    pub fn preview_len(&self) -> usize {
        self.sequence.preview_len
    }

    pub fn lesson(&self) -> Option<i64> {
        self.lesson
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
