//! Schema resolution.
//!
//! A schema can come from three places, in order of preference: a schema
//! document supplied by the user (JSON Schema or the internal format), the
//! built-in derived-variable reference schema, or inference from the data
//! itself. Whatever the source, resolution produces the same
//! [`ResolvedSchema`] for the rest of the engine.

use std::fmt;

use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::error::{Result, StudyvarError};
use crate::schema::builtin::{builtin_group_labels, builtin_schema};
use crate::schema::{GroupLabels, SchemaModel, SchemaSource};

pub mod infer;
pub mod internal;
pub mod json_schema;
pub mod reconcile;

pub use infer::{infer_column, infer_schema};
pub use reconcile::{reconcile, ReconcileReport};

/// A fully resolved schema: the model, its group display labels, and
/// where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    /// Variable metadata in declaration order
    pub model: SchemaModel,
    /// Display labels for the groups the model uses
    pub group_labels: GroupLabels,
    /// Provenance of the schema
    pub source: SchemaSource,
}

impl ResolvedSchema {
    /// The built-in derived-variable reference schema
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            model: builtin_schema(),
            group_labels: builtin_group_labels(),
            source: SchemaSource::Builtin,
        }
    }
}

/// The two supported schema document shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// JSON Schema: the root object carries `properties` or `$schema`
    JsonSchema,
    /// Flat object of variable key to entry
    Internal,
}

impl fmt::Display for DocumentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonSchema => write!(f, "JSON Schema"),
            Self::Internal => write!(f, "internal-format"),
        }
    }
}

/// Classify a schema document by shape.
///
/// # Errors
///
/// Returns an error when the document is not a JSON object.
pub fn classify_document(document: &Value) -> Result<(DocumentShape, &Map<String, Value>)> {
    let map = document.as_object().ok_or_else(|| {
        StudyvarError::invalid_document("Schema document must be a JSON object")
    })?;
    let shape = if map.contains_key("properties") || map.contains_key("$schema") {
        DocumentShape::JsonSchema
    } else {
        DocumentShape::Internal
    };
    Ok((shape, map))
}

/// Resolve a user-supplied schema document.
///
/// When the resolved entries carry no group information at all, groups are
/// backfilled from the built-in schema so grouping still works for known
/// derived variables.
pub fn resolve_document(document: &Value, config: &EngineConfig) -> Result<ResolvedSchema> {
    let (shape, map) = classify_document(document)?;
    let (mut model, mut group_labels) = match shape {
        DocumentShape::JsonSchema => json_schema::parse(map, config),
        DocumentShape::Internal => internal::parse(map),
    };
    backfill_groups(&mut model, &mut group_labels);
    log::info!(
        "Resolved {} variables from {shape} schema document",
        model.len()
    );
    Ok(ResolvedSchema {
        model,
        group_labels,
        source: SchemaSource::File,
    })
}

/// Backfill groups from the built-in schema when the document declared
/// none (every entry ungrouped or in the default `data` group).
fn backfill_groups(model: &mut SchemaModel, labels: &mut GroupLabels) {
    let all_default = model
        .iter()
        .all(|(_, entry)| entry.group.is_empty() || entry.group == "data");
    if !all_default {
        return;
    }

    let reference = builtin_schema();
    let keys: Vec<String> = model.keys().map(str::to_string).collect();
    for key in keys {
        if let Some(reference_entry) = reference.get(&key)
            && !reference_entry.group.is_empty()
            && let Some(entry) = model.get_mut(&key)
        {
            entry.group = reference_entry.group.clone();
        }
    }

    let builtin_labels = builtin_group_labels();
    for group in model.groups_in_use() {
        if !labels.contains(&group) {
            let label = builtin_labels
                .get(&group)
                .map_or_else(|| GroupLabels::capitalize(&group), str::to_string);
            labels.insert(group, label);
        }
    }
}
