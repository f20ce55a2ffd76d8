use std::sync::Arc;

use shuangpin_tutor::sequencer::ExerciseSequencer;
use shuangpin_tutor::{
    CombinationIndex, Curriculum, Dictionary, KeyAlphabet, Novelty, RandomShuffler,
    SequencerConfig, UnlockScheduler, UnlockState,
};

fn index() -> Arc<CombinationIndex> {
    Arc::new(CombinationIndex::new(
        KeyAlphabet::standard(),
        Dictionary::embedded().unwrap(),
    ))
}

fn scheduler() -> UnlockScheduler {
    UnlockScheduler::new(Arc::new(Curriculum::standard()), KeyAlphabet::standard())
}

fn novelties(
    index: &CombinationIndex,
    scheduler: &UnlockScheduler,
    state: &UnlockState,
    c: char,
) -> Vec<Novelty> {
    let mut buf = [0u8; 4];
    index
        .pinyin_of(c.encode_utf8(&mut buf))
        .iter()
        .filter_map(|full| index.combination(full))
        .filter_map(|combination| scheduler.classify(combination, state))
        .collect()
}

// Walks every lesson of the standard curriculum with a seeded shuffle and checks that
// each practice sequence only draws on unlocked combinations.
#[test]
fn every_lesson_only_uses_unlocked_combinations() {
    let index = index();
    let scheduler = scheduler();
    let mut sequencer = ExerciseSequencer::new(
        Arc::clone(&index),
        scheduler.clone(),
        SequencerConfig::default(),
        Box::new(RandomShuffler::seeded(7)),
    );

    for idx in 0..scheduler.lesson_count() as i64 {
        let state = scheduler.compute(idx);
        let pools = sequencer.pools(idx);
        let sequence = sequencer.build(idx).clone();

        // Sequence is a permutation of both pools
        assert_eq!(sequence.len(), pools.sampled_len(), "lesson {idx}");
        let mut expected: Vec<char> = pools
            .new_pool
            .iter()
            .chain(pools.review_pool.iter())
            .copied()
            .collect();
        let mut actual = sequence.chars().to_vec();
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected, "lesson {idx}");

        // Preview holds only characters of newly unlocked combinations
        for &c in sequence.preview() {
            assert!(
                novelties(&index, &scheduler, &state, c).contains(&Novelty::New),
                "lesson {idx}: preview char {c} is not new"
            );
        }
        for &c in sequence.chars() {
            assert!(
                !novelties(&index, &scheduler, &state, c).is_empty(),
                "lesson {idx}: {c} uses a locked key"
            );
        }
    }
}

#[test]
fn first_lesson_drills_the_zero_lead_e() {
    let index = index();
    let mut sequencer = ExerciseSequencer::new(
        Arc::clone(&index),
        scheduler(),
        SequencerConfig::default(),
        Box::new(RandomShuffler::seeded(1)),
    );
    let sequence = sequencer.build(0).clone();
    assert_eq!(sequence.len(), 4);
    assert_eq!(sequence.preview().len(), 4);
    assert!(sequence.tail().is_empty());
    let e = index.dictionary().characters("e");
    assert!(sequence.chars().iter().all(|c| e.contains(c)));

    // Whole sequence fits in the preview, so the cursor returns to the start
    let first_pass: Vec<char> = (0..4).filter_map(|_| sequencer.get_next()).collect();
    assert_eq!(first_pass, sequence.chars());
    assert_eq!(sequencer.get_next(), sequence.chars().first().copied());
}

#[test]
fn long_lessons_wrap_past_the_preview() {
    let mut sequencer = ExerciseSequencer::new(
        index(),
        scheduler(),
        SequencerConfig::default(),
        Box::new(RandomShuffler::seeded(42)),
    );
    let preview_size = sequencer.config().preview_size;
    let sequence = sequencer.build(20).clone();
    assert!(sequence.len() > preview_size);
    assert_eq!(sequence.preview().len(), preview_size);
    assert_eq!(sequencer.preview_len(), preview_size);

    for expected in sequence.chars() {
        assert_eq!(sequencer.get_next(), Some(*expected));
    }
    assert_eq!(sequencer.cursor(), preview_size);
    assert_eq!(sequencer.get_next(), Some(sequence.chars()[preview_size]));
}

#[test]
fn same_seed_builds_the_same_sequence() {
    let build = |seed| {
        let mut sequencer = ExerciseSequencer::new(
            index(),
            scheduler(),
            SequencerConfig::default(),
            Box::new(RandomShuffler::seeded(seed)),
        );
        sequencer.build(12).clone()
    };
    assert_eq!(build(9), build(9));
}

#[test]
fn locked_lesson_is_empty() {
    let mut sequencer = ExerciseSequencer::new(
        index(),
        scheduler(),
        SequencerConfig::default(),
        Box::new(RandomShuffler::seeded(3)),
    );
    assert!(sequencer.build(-1).is_empty());
    assert_eq!(sequencer.get_next(), None);
}
