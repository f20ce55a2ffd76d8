/// Initial-consonant codes, in the order they are paired when building the index.
pub const LEAD_KEYS: &[&str] = &[
    "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "zh", "ch", "sh", "r",
    "z", "c", "s", "y", "w",
];

pub const SINGLE_FOLLOW_KEYS: &[&str] = &["a", "o", "e", "i", "u", "v"];

pub const MULTI_FOLLOW_KEYS: &[&str] = &[
    "ai", "ei", "ao", "ou", "an", "en", "ang", "eng", "er", "ia", "ie", "iao", "iu", "ian", "in",
    "iang", "ing", "ua", "uo", "uai", "ui", "uan", "un", "uang", "ong", "ve", "ue", "iong",
];

/// Finals that form a syllable on their own (empty lead).
pub const ZERO_LEAD_KEYS: &[&str] = &[
    "a", "ai", "an", "ang", "ao", "e", "ei", "en", "eng", "er", "o", "ou",
];

/// Cumulative unlock order of the progressive lessons.
pub const CURRICULUM: &[&str] = &[
    "e", "d", "i", "u", "y", "zh", "sh", "l", "j", "h", "b", "a", "x", "ong", "ao", "g", "ei",
    "uo", "ai", "an", "w", "en", "t", "z", "ing", "m", "ang", "ian", "iao", "ou", "q", "ch", "eng",
    "n", "f", "uan", "k", "r", "ui", "in", "iang", "ie", "s", "o", "c", "p", "un", "iu", "ue", "ia",
    "er", "uai", "ua", "uang", "v", "iong", "ng",
];

/// Role(s) a token plays in a two-key spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyRoles {
    pub lead: bool,
    pub follow: bool,
}

impl KeyRoles {
    pub fn is_none(&self) -> bool {
        !self.lead && !self.follow
    }
}

/// Ordered lead and follow alphabets. Follows are single vowels first, then compound finals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAlphabet {
    leads: Vec<String>,
    follows: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphabetSummary {
    pub lead_count: usize,
    pub follow_count: usize,
    pub single_follow_count: usize,
    pub multi_follow_count: usize,
}

impl KeyAlphabet {
    pub fn new<L, F>(leads: L, follows: F) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            leads: leads.into_iter().map(Into::into).collect(),
            follows: follows.into_iter().map(Into::into).collect(),
        }
    }

    pub fn standard() -> Self {
        Self::new(
            LEAD_KEYS.iter().copied(),
            SINGLE_FOLLOW_KEYS
                .iter()
                .chain(MULTI_FOLLOW_KEYS.iter())
                .copied(),
        )
    }

    /// Lead keys without the implicit empty lead.
    pub fn leads(&self) -> &[String] {
        &self.leads
    }

    pub fn follows(&self) -> &[String] {
        &self.follows
    }

    pub fn is_lead(&self, key: &str) -> bool {
        self.leads.iter().any(|k| k == key)
    }

    pub fn is_follow(&self, key: &str) -> bool {
        self.follows.iter().any(|k| k == key)
    }

    pub fn roles(&self, key: &str) -> KeyRoles {
        KeyRoles {
            lead: self.is_lead(key),
            follow: self.is_follow(key),
        }
    }

    /// Counts of this alphabet's tokens. Single follows are one-letter finals.
    pub fn summary(&self) -> AlphabetSummary {
        let single_follow_count = self.follows.iter().filter(|f| f.chars().count() == 1).count();
        AlphabetSummary {
            lead_count: self.leads.len(),
            follow_count: self.follows.len(),
            single_follow_count,
            multi_follow_count: self.follows.len() - single_follow_count,
        }
    }
}

impl Default for KeyAlphabet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Fixed unlock order of phonetic keys. Each token appears once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curriculum {
    keys: Vec<String>,
}

impl Curriculum {
    /// Builds a curriculum, dropping repeated tokens after their first occurrence.
    pub fn new<I>(keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for key in keys.into_iter().map(Into::into) {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self { keys: unique }
    }

    pub fn standard() -> Self {
        Self::new(CURRICULUM.iter().copied())
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.keys.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }
}

impl Default for Curriculum {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_curriculum_has_unique_keys() {
        let curriculum = Curriculum::standard();
        assert_eq!(curriculum.len(), CURRICULUM.len());
        assert_eq!(curriculum.get(0), Some("e"));
        assert_eq!(curriculum.get(curriculum.len() - 1), Some("ng"));
    }

    #[test]
    fn curriculum_drops_duplicates() {
        let curriculum = Curriculum::new(["a", "b", "a", "c"]);
        assert_eq!(curriculum.keys(), &["a", "b", "c"]);
        assert_eq!(curriculum.position("c"), Some(2));
    }

    #[test]
    fn roles_distinguish_lead_and_follow() {
        let alphabet = KeyAlphabet::standard();
        assert_eq!(
            alphabet.roles("zh"),
            KeyRoles {
                lead: true,
                follow: false
            }
        );
        assert_eq!(
            alphabet.roles("ong"),
            KeyRoles {
                lead: false,
                follow: true
            }
        );
        assert!(alphabet.roles("ng").is_none());
    }

    #[test]
    fn follows_list_singles_before_compounds() {
        let alphabet = KeyAlphabet::standard();
        assert_eq!(&alphabet.follows()[..6], SINGLE_FOLLOW_KEYS);
        let summary = alphabet.summary();
        assert_eq!(summary.lead_count, 23);
        assert_eq!(summary.follow_count, 34);
        assert_eq!(summary.single_follow_count, 6);
        assert_eq!(summary.multi_follow_count, 28);
    }

    #[test]
    fn summary_counts_a_custom_alphabet() {
        let alphabet = KeyAlphabet::new(["d", "b"], ["e", "i", "ang"]);
        assert_eq!(
            alphabet.summary(),
            AlphabetSummary {
                lead_count: 2,
                follow_count: 3,
                single_follow_count: 2,
                multi_follow_count: 1,
            }
        );
    }

    #[test]
    fn every_curriculum_key_except_ng_has_a_role() {
        let alphabet = KeyAlphabet::standard();
        for key in CURRICULUM.iter().filter(|k| **k != "ng") {
            assert!(!alphabet.roles(key).is_none(), "{key} has no role");
        }
    }
}
