//! Two-key keyboard schemes and the registry that resolves the active one.

use crate::combination::{Combination, CombinationIndex};
use crate::error::SchemeError;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

static SCHEME_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/schemes");

/// Preset names and their embedded layouts. The first entry is the default.
const PRESETS: &[(&str, &str)] = &[("小鹤双拼", "xiaohe.json"), ("自然码", "ziranma.json")];

/// Suffix appended when a saved scheme would shadow an existing name.
pub const COPY_SUFFIX: &str = " 副本";

/// Key assignment of a scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemeLayout {
    pub leads: BTreeMap<String, char>,
    pub follows: BTreeMap<String, char>,
    /// Full two-key codes for syllables without a lead.
    pub zero_leads: BTreeMap<String, String>,
}

impl SchemeLayout {
    pub fn from_json_str(json: &str) -> Result<Self, SchemeError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuangpinScheme {
    pub name: String,
    pub layout: SchemeLayout,
    pub is_local: bool,
    decode_table: HashMap<String, Vec<String>>,
}

impl ShuangpinScheme {
    /// Builds the scheme and its reverse table against the combinations of `index`.
    pub fn new(
        name: impl Into<String>,
        layout: SchemeLayout,
        is_local: bool,
        index: &CombinationIndex,
    ) -> Self {
        let mut scheme = Self {
            name: name.into(),
            layout,
            is_local,
            decode_table: HashMap::new(),
        };
        let mut decode_table: HashMap<String, Vec<String>> = HashMap::new();
        for combination in index.combinations() {
            if let Some(code) = scheme.encode(combination) {
                decode_table
                    .entry(code)
                    .or_default()
                    .push(combination.full.clone());
            }
        }
        scheme.decode_table = decode_table;
        scheme
    }

    /// The two keys that type `combination`, if the layout covers it.
    pub fn encode(&self, combination: &Combination) -> Option<String> {
        if combination.lead.is_empty() {
            return self.layout.zero_leads.get(&combination.full).cloned();
        }
        let lead = self.layout.leads.get(&combination.lead)?;
        let follow = self.layout.follows.get(&combination.follow)?;
        Some(format!("{lead}{follow}"))
    }

    /// Full spellings typed by `keys`, in index order. Case-insensitive.
    pub fn decode(&self, keys: &str) -> &[String] {
        self.decode_table
            .get(&keys.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Preset and user-saved layouts, with a one-slot cache for the active scheme.
///
/// The cache holds the scheme for a single configuration name. Asking for a different
/// name, or saving/deleting the cached name, invalidates it.
#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    index: Arc<CombinationIndex>,
    presets: Vec<(String, SchemeLayout)>,
    local: BTreeMap<String, SchemeLayout>,
    active: Option<Arc<ShuangpinScheme>>,
}

impl SchemeRegistry {
    pub fn new(
        index: Arc<CombinationIndex>,
        local: BTreeMap<String, SchemeLayout>,
    ) -> Result<Self, SchemeError> {
        let presets = PRESETS
            .iter()
            .map(|(name, file)| Ok((name.to_string(), embedded_layout(file)?)))
            .collect::<Result<Vec<_>, SchemeError>>()?;
        Ok(Self {
            index,
            presets,
            local,
            active: None,
        })
    }

    pub fn preset(&self, name: &str) -> Result<&SchemeLayout, SchemeError> {
        self.presets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, layout)| layout)
            .ok_or_else(|| SchemeError::UnknownPreset(name.to_string()))
    }

    /// Preset names followed by local names.
    pub fn modes(&self) -> Vec<String> {
        self.presets
            .iter()
            .map(|(name, _)| name.clone())
            .chain(self.local.keys().cloned())
            .collect()
    }

    pub fn local_configs(&self) -> &BTreeMap<String, SchemeLayout> {
        &self.local
    }

    /// Saves a local layout and returns the name it was stored under.
    pub fn save_config(&mut self, name: &str, layout: SchemeLayout) -> String {
        let mut name = name.to_string();
        if self.modes().contains(&name) {
            name.push_str(COPY_SUFFIX);
        }
        self.invalidate_if_cached(&name);
        self.local.insert(name.clone(), layout);
        name
    }

    pub fn delete_config(&mut self, name: &str) -> bool {
        self.invalidate_if_cached(name);
        self.local.remove(name).is_some()
    }

    /// Resolves `name`: a local layout first, then a preset, else the first preset.
    pub fn load_config(&self, name: &str) -> ShuangpinScheme {
        if let Some(layout) = self.local.get(name) {
            return ShuangpinScheme::new(name, layout.clone(), true, &self.index);
        }
        let (name, layout) = self
            .presets
            .iter()
            .find(|(n, _)| n == name)
            .unwrap_or(&self.presets[0]);
        ShuangpinScheme::new(name.as_str(), layout.clone(), false, &self.index)
    }

    /// Active scheme for `name`, built on first use and cached until the name changes.
    /// The returned scheme's name differs from `name` when it fell back to the default.
    pub fn mode(&mut self, name: &str) -> Arc<ShuangpinScheme> {
        if let Some(active) = self.active.as_ref().filter(|s| s.name == name) {
            return Arc::clone(active);
        }
        let scheme = Arc::new(self.load_config(name));
        if scheme.name != name {
            tracing::warn!(requested = %name, resolved = %scheme.name, "unknown scheme, using default");
        }
        self.active = Some(Arc::clone(&scheme));
        scheme
    }

    fn invalidate_if_cached(&mut self, name: &str) {
        if self.active.as_ref().is_some_and(|s| s.name == name) {
            self.active = None;
        }
    }
}

fn embedded_layout(file: &str) -> Result<SchemeLayout, SchemeError> {
    let json = SCHEME_DIR
        .get_file(file)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| SchemeError::MissingAsset(file.to_string()))?;
    SchemeLayout::from_json_str(json)
}
