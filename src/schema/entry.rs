//! Variable metadata definitions for the canonical schema model
//!
//! This module defines the core entry structures that describe a single
//! derived study variable: its analysis type, grouping, display unit,
//! sentinel value, and categorical code labels.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::value_key;

/// Represents the analysis type of a variable
///
/// This enum standardizes the types used across the engine so that every
/// consumption site (statistics, filtering, binning) can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariableType {
    /// Free-text value, excluded from aggregation
    String,
    /// Continuous numeric value
    #[default]
    Numeric,
    /// Whole-number numeric value
    Integer,
    /// Coded value with at most two non-sentinel codes
    Binary,
    /// Coded value with more than two codes
    Categorical,
}

impl VariableType {
    /// Parse a type tag, falling back to `Numeric` for anything unknown.
    ///
    /// Under-constraining is safer than rejecting a whole schema document,
    /// so an unrecognized tag never fails.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "string" => Self::String,
            "integer" => Self::Integer,
            "binary" => Self::Binary,
            "categorical" => Self::Categorical,
            _ => Self::Numeric,
        }
    }

    /// Whether values of this type are summarized numerically
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric | Self::Integer)
    }

    /// Whether values of this type carry a code map
    #[must_use]
    pub const fn is_coded(self) -> bool {
        matches!(self, Self::Binary | Self::Categorical)
    }

    /// The lowercase tag used in schema documents
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Numeric => "numeric",
            Self::Integer => "integer",
            Self::Binary => "binary",
            Self::Categorical => "categorical",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VariableType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VariableType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::parse(&tag))
    }
}

/// An ordered mapping from raw code (stringified) to human-readable label
///
/// Insertion order is preserved: it drives legend order and the
/// "first available code" default when a filter switches to a coded field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMap {
    entries: Vec<(String, String)>,
}

impl CodeMap {
    /// Create an empty code map
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a code map from `(code, label)` pairs, keeping first-seen order
    pub fn from_pairs<C, L>(pairs: impl IntoIterator<Item = (C, L)>) -> Self
    where
        C: Into<String>,
        L: Into<String>,
    {
        let mut map = Self::new();
        for (code, label) in pairs {
            map.insert(code.into(), label.into());
        }
        map
    }

    /// Insert a code, replacing the label if the code is already present
    pub fn insert(&mut self, code: String, label: String) {
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some((_, existing)) => *existing = label,
            None => self.entries.push((code, label)),
        }
    }

    /// Look up the label for a code
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, label)| label.as_str())
    }

    /// Label for a code, falling back to the code itself
    #[must_use]
    pub fn label_or_code<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).unwrap_or(code)
    }

    /// First code in insertion order, if any
    #[must_use]
    pub fn first_code(&self) -> Option<&str> {
        self.entries.first().map(|(c, _)| c.as_str())
    }

    /// Number of codes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no codes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(code, label)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(c, l)| (c.as_str(), l.as_str()))
    }
}

impl FromIterator<(String, String)> for CodeMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl Serialize for CodeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, label) in &self.entries {
            map.serialize_entry(code, label)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CodeMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CodeMapVisitor;

        impl<'de> Visitor<'de> for CodeMapVisitor {
            type Value = CodeMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of code to label")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CodeMap, A::Error> {
                let mut map = CodeMap::new();
                // Labels are occasionally numeric in hand-written documents;
                // stringify them the way the code key itself is stringified.
                while let Some((code, label)) =
                    access.next_entry::<String, serde_json::Value>()?
                {
                    let label = match label {
                        serde_json::Value::String(s) => s,
                        other => value_key(&other),
                    };
                    map.insert(code, label);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(CodeMapVisitor)
    }
}

fn default_group() -> String {
    "data".to_string()
}

/// Metadata for one derived study variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    /// Human-readable description
    #[serde(rename = "desc", default)]
    pub description: String,
    /// Thematic group key (resolved to a display label separately)
    #[serde(default = "default_group")]
    pub group: String,
    /// Analysis type
    #[serde(rename = "type", default)]
    pub variable_type: VariableType,
    /// Optional display unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Optional numeric value meaning "not applicable"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinel: Option<f64>,
    /// Optional code → label map for coded types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<CodeMap>,
}

impl SchemaEntry {
    /// Create a new entry with the required fields
    pub fn new(
        description: impl Into<String>,
        group: impl Into<String>,
        variable_type: VariableType,
    ) -> Self {
        Self {
            description: description.into(),
            group: group.into(),
            variable_type,
            unit: None,
            sentinel: None,
            codes: None,
        }
    }

    /// Set the display unit
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the sentinel value
    #[must_use]
    pub const fn with_sentinel(mut self, sentinel: f64) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    /// Set the code map
    #[must_use]
    pub fn with_codes(mut self, codes: CodeMap) -> Self {
        self.codes = Some(codes);
        self
    }

    /// Label for a raw code, falling back to the code itself
    #[must_use]
    pub fn code_label<'a>(&'a self, code: &'a str) -> &'a str {
        match &self.codes {
            Some(codes) => codes.label_or_code(code),
            None => code,
        }
    }
}
