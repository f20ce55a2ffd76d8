//! Static table of valid two-key spellings.
//!
//! The index pairs every lead (plus the empty lead) with every follow and keeps the pairs
//! whose concatenation is a dictionary spelling. Discovery order is lead-major, follow-minor,
//! and every per-key list preserves it: the sequencer walks these lists to build its pools, so
//! the order is part of the contract.

use crate::dictionary::Dictionary;
use crate::keys::KeyAlphabet;
use std::collections::HashMap;

/// A valid `(lead, follow)` pair. `full` is the dictionary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    pub lead: String,
    pub follow: String,
    pub full: String,
}

impl Combination {
    pub fn new(lead: impl Into<String>, follow: impl Into<String>) -> Self {
        let lead = lead.into();
        let follow = follow.into();
        let full = format!("{lead}{follow}");
        Self { lead, follow, full }
    }

    /// Ledger names touched by one validation of this combination.
    pub fn ledger_names(&self) -> [&str; 3] {
        [self.lead.as_str(), self.follow.as_str(), self.full.as_str()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    pub combination_count: usize,
    pub character_count: usize,
}

#[derive(Debug, Clone)]
pub struct CombinationIndex {
    alphabet: KeyAlphabet,
    dictionary: Dictionary,
    combinations: Vec<Combination>,
    by_full: HashMap<String, usize>,
    by_lead: Vec<(String, Vec<usize>)>,
    by_follow: Vec<(String, Vec<usize>)>,
    spellings_by_char: HashMap<char, Vec<String>>,
}

impl CombinationIndex {
    /// Builds the index. Never fails: dictionary entries that do not split into a known
    /// lead and follow simply do not become combinations.
    pub fn new(alphabet: KeyAlphabet, dictionary: Dictionary) -> Self {
        let mut combinations = Vec::new();
        let mut by_full = HashMap::new();

        let leads = alphabet
            .leads()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(""));
        for lead in leads {
            for follow in alphabet.follows() {
                let combination = Combination::new(lead, follow.as_str());
                if !dictionary.contains(&combination.full) || by_full.contains_key(&combination.full)
                {
                    continue;
                }
                by_full.insert(combination.full.clone(), combinations.len());
                combinations.push(combination);
            }
        }

        let mut by_lead: Vec<(String, Vec<usize>)> = Vec::new();
        let mut by_follow: Vec<(String, Vec<usize>)> = Vec::new();
        for (pos, combination) in combinations.iter().enumerate() {
            push_grouped(&mut by_lead, &combination.lead, pos);
            push_grouped(&mut by_follow, &combination.follow, pos);
        }

        let mut spellings_by_char: HashMap<char, Vec<String>> = HashMap::new();
        for (spelling, chars) in dictionary.iter() {
            for &c in chars {
                let spellings = spellings_by_char.entry(c).or_default();
                if !spellings.iter().any(|s| s == spelling) {
                    spellings.push(spelling.to_string());
                }
            }
        }

        tracing::debug!(
            combinations = combinations.len(),
            characters = spellings_by_char.len(),
            "built combination index"
        );

        Self {
            alphabet,
            dictionary,
            combinations,
            by_full,
            by_lead,
            by_follow,
            spellings_by_char,
        }
    }

    pub fn alphabet(&self) -> &KeyAlphabet {
        &self.alphabet
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// All combinations in discovery order.
    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    pub fn combination(&self, full: &str) -> Option<&Combination> {
        self.by_full.get(full).map(|&pos| &self.combinations[pos])
    }

    pub fn lookup_by_lead(&self, lead: &str) -> Vec<&Combination> {
        self.grouped(&self.by_lead, lead)
    }

    pub fn lookup_by_follow(&self, follow: &str) -> Vec<&Combination> {
        self.grouped(&self.by_follow, follow)
    }

    fn grouped(&self, groups: &[(String, Vec<usize>)], key: &str) -> Vec<&Combination> {
        groups
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, positions)| positions.iter().map(|&p| &self.combinations[p]).collect())
            .unwrap_or_default()
    }

    pub fn characters_of(&self, combination: &Combination) -> &[char] {
        self.dictionary.characters(&combination.full)
    }

    /// Dictionary spellings of the first character of `text`, in dictionary order.
    pub fn pinyin_of(&self, text: &str) -> &[String] {
        text.chars()
            .next()
            .and_then(|c| self.spellings_by_char.get(&c))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_valid_hanzi(&self, c: char) -> bool {
        self.spellings_by_char.contains_key(&c)
    }

    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            combination_count: self.combinations.len(),
            character_count: self.spellings_by_char.len(),
        }
    }
}

fn push_grouped(groups: &mut Vec<(String, Vec<usize>)>, key: &str, pos: usize) {
    match groups.iter_mut().find(|(k, _)| k == key) {
        Some((_, positions)) => positions.push(pos),
        None => groups.push((key.to_string(), vec![pos])),
    }
}

/// Out-of-dictionary transliteration, consulted only when the index has no answer.
pub trait TransliterationFallback {
    fn transliterate(&self, c: char) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Dictionary,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinyinLookupResult {
    pub spellings: Vec<String>,
    pub source: LookupSource,
}

/// Dictionary lookup with an optional transliteration fallback for misses.
pub struct PinyinLookup<'a> {
    index: &'a CombinationIndex,
    fallback: Option<&'a dyn TransliterationFallback>,
}

impl<'a> PinyinLookup<'a> {
    pub fn new(index: &'a CombinationIndex) -> Self {
        Self {
            index,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: &'a dyn TransliterationFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// `None` when neither the dictionary nor the fallback knows the character.
    pub fn lookup(&self, c: char) -> Option<PinyinLookupResult> {
        let mut buf = [0u8; 4];
        let spellings = self.index.pinyin_of(c.encode_utf8(&mut buf));
        if !spellings.is_empty() {
            return Some(PinyinLookupResult {
                spellings: spellings.to_vec(),
                source: LookupSource::Dictionary,
            });
        }

        let spellings = self.fallback?.transliterate(c);
        if spellings.is_empty() {
            return None;
        }
        Some(PinyinLookupResult {
            spellings,
            source: LookupSource::Fallback,
        })
    }
}
