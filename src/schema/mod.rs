//! Canonical in-memory schema model.
//!
//! Everything downstream of the resolver (classification, statistics,
//! filtering, exports) reads variable metadata from these structures.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub mod builtin;
pub mod entry;

pub use entry::{CodeMap, SchemaEntry, VariableType};

/// Where the active schema came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    /// The built-in derived-data reference schema
    Builtin,
    /// A schema document supplied by the user
    File,
    /// Inferred from the data itself
    Inferred,
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::File => write!(f, "file"),
            Self::Inferred => write!(f, "inferred"),
        }
    }
}

/// Mapping from variable key to schema entry, in declaration order.
///
/// Iteration order is the order entries were resolved in (document order or
/// data column order), which drives variable lists and summary-table rows.
/// Lookup is O(1) via a side index.
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    entries: Vec<(String, SchemaEntry)>,
    index: FxHashMap<String, usize>,
}

impl SchemaModel {
    /// Create an empty model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the model has no variables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry, replacing any existing entry for the same key
    pub fn insert(&mut self, key: impl Into<String>, entry: SchemaEntry) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = entry,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, entry));
            }
        }
    }

    /// Look up an entry by variable key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Mutable lookup by variable key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut SchemaEntry> {
        match self.index.get(key) {
            Some(&pos) => Some(&mut self.entries[pos].1),
            None => None,
        }
    }

    /// Whether a variable key is present
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate over `(key, entry)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Variable keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Keys of variables that take part in analysis (identifier variables
    /// in the `id` group are excluded)
    pub fn analysis_keys(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, e)| e.group != "id")
            .map(|(k, _)| k)
    }

    /// Keys of numerically summarized variables
    pub fn numeric_keys(&self) -> impl Iterator<Item = &str> {
        self.analysis_keys_of(|e| e.variable_type.is_numeric())
    }

    /// Keys of coded variables that carry a code map
    pub fn coded_keys(&self) -> impl Iterator<Item = &str> {
        self.analysis_keys_of(|e| e.variable_type.is_coded() && e.codes.is_some())
    }

    fn analysis_keys_of(
        &self,
        predicate: impl Fn(&SchemaEntry) -> bool,
    ) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(move |(_, e)| e.group != "id" && predicate(e))
            .map(|(k, _)| k)
    }

    /// Non-empty group keys referenced by any entry, first-seen order
    #[must_use]
    pub fn groups_in_use(&self) -> Vec<String> {
        let mut seen = FxHashMap::default();
        let mut groups = Vec::new();
        for (_, entry) in self.iter() {
            if entry.group.is_empty() {
                continue;
            }
            if seen.insert(entry.group.clone(), ()).is_none() {
                groups.push(entry.group.clone());
            }
        }
        groups
    }

    /// Render the model as an internal-format schema document.
    ///
    /// Re-resolving the returned document reproduces the same model.
    #[must_use]
    pub fn to_internal_document(&self) -> Value {
        let mut doc = serde_json::Map::new();
        for (key, entry) in self.iter() {
            // Entries serialize losslessly, so this cannot fail.
            if let Ok(value) = serde_json::to_value(entry) {
                doc.insert(key.to_string(), value);
            }
        }
        Value::Object(doc)
    }
}

impl FromIterator<(String, SchemaEntry)> for SchemaModel {
    fn from_iter<I: IntoIterator<Item = (String, SchemaEntry)>>(iter: I) -> Self {
        let mut model = Self::new();
        for (key, entry) in iter {
            model.insert(key, entry);
        }
        model
    }
}

impl Serialize for SchemaModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

/// Display labels for group keys
#[derive(Debug, Clone, Default)]
pub struct GroupLabels {
    labels: FxHashMap<String, String>,
}

impl GroupLabels {
    /// Create an empty label map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label for a group key
    pub fn insert(&mut self, group: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(group.into(), label.into());
    }

    /// The registered label, if any
    #[must_use]
    pub fn get(&self, group: &str) -> Option<&str> {
        self.labels.get(group).map(String::as_str)
    }

    /// Whether a group key has a registered label
    #[must_use]
    pub fn contains(&self, group: &str) -> bool {
        self.labels.contains_key(group)
    }

    /// The display label for a group, falling back to a capitalized form
    /// of the key with separators replaced by spaces
    #[must_use]
    pub fn label_for(&self, group: &str) -> String {
        match self.get(group) {
            Some(label) => label.to_string(),
            None => Self::capitalize(group),
        }
    }

    /// Capitalize a group key: `family_history` becomes `Family history`
    #[must_use]
    pub fn capitalize(group: &str) -> String {
        let mut chars = group.chars();
        match chars.next() {
            Some(first) => {
                let rest: String = chars
                    .map(|c| if c == '_' || c == '-' { ' ' } else { c })
                    .collect();
                format!("{}{rest}", first.to_uppercase())
            }
            None => String::new(),
        }
    }
}

impl FromIterator<(String, String)> for GroupLabels {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut labels = Self::new();
        for (group, label) in iter {
            labels.insert(group, label);
        }
        labels
    }
}
