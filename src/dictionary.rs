use crate::error::DictionaryError;
use include_dir::{include_dir, Dir};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/data");

const EMBEDDED_DICTIONARY: &str = "pinyin-hanzi.json";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    spelling: String,
    chars: Vec<char>,
}

/// Full spelling → characters, most frequent first.
///
/// Iteration order is the order in which entries were first seen. The reverse
/// character index and the sampled practice pools depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: Vec<Entry>,
    positions: HashMap<String, usize>,
}

impl Dictionary {
    /// Builds a dictionary from raw `(spelling, characters)` pairs.
    ///
    /// Blank or non-alphabetic spellings, empty character groups and repeated spellings are
    /// skipped. Spellings are normalized to lowercase.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut dict = Self::default();
        for (spelling, chars) in entries {
            dict.insert(spelling.as_ref(), chars.as_ref());
        }
        dict
    }

    /// Parses a JSON object of spelling → characters. Repeated keys are seen in document
    /// order, so the first one wins like any other duplicate.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let RawEntries(entries) = serde_json::from_str::<RawEntries>(json).map_err(|err| {
            if err.is_data() {
                DictionaryError::NotAnObject
            } else {
                DictionaryError::Json(err)
            }
        })?;

        let mut dict = Self::default();
        for (spelling, chars) in entries {
            match chars.as_str() {
                Some(chars) => dict.insert(&spelling, chars),
                None => tracing::warn!(%spelling, "skipping dictionary entry with non-string value"),
            }
        }
        Ok(dict)
    }

    /// The dictionary compiled into the binary.
    pub fn embedded() -> Result<Self, DictionaryError> {
        let file = DATA_DIR
            .get_file(EMBEDDED_DICTIONARY)
            .ok_or_else(|| DictionaryError::MissingAsset(EMBEDDED_DICTIONARY.to_string()))?;
        let json = file
            .contents_utf8()
            .ok_or_else(|| DictionaryError::MissingAsset(EMBEDDED_DICTIONARY.to_string()))?;
        Self::from_json_str(json)
    }

    fn insert(&mut self, spelling: &str, chars: &str) {
        let spelling = spelling.trim().to_lowercase();
        if spelling.is_empty() || !spelling.chars().all(|c| c.is_ascii_lowercase()) {
            tracing::debug!(%spelling, "skipping malformed dictionary spelling");
            return;
        }
        if self.positions.contains_key(&spelling) {
            tracing::debug!(%spelling, "skipping duplicate dictionary spelling");
            return;
        }
        let chars: Vec<char> = chars.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.is_empty() {
            tracing::debug!(%spelling, "skipping empty character group");
            return;
        }
        self.positions.insert(spelling.clone(), self.entries.len());
        self.entries.push(Entry { spelling, chars });
    }

    /// Characters for `spelling`, or an empty slice when the spelling is unknown.
    pub fn characters(&self, spelling: &str) -> &[char] {
        self.positions
            .get(spelling)
            .map(|&pos| self.entries[pos].chars.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, spelling: &str) -> bool {
        self.positions.contains_key(spelling)
    }

    /// Case-insensitive spelling check.
    pub fn is_valid_pinyin(&self, spelling: &str) -> bool {
        self.contains(&spelling.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[char])> {
        self.entries
            .iter()
            .map(|e| (e.spelling.as_str(), e.chars.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Top-level object entries exactly as written, repeated keys included.
struct RawEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object of spelling to characters")
            }

            fn visit_map<A>(self, mut map: A) -> Result<RawEntries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
