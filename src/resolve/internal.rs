//! Resolution of internal-format schema documents.
//!
//! The internal format is a flat object of variable key to entry, exactly
//! what [`crate::schema::SchemaModel::to_internal_document`] renders.

use serde_json::{Map, Value};

use crate::schema::{GroupLabels, SchemaEntry, SchemaModel, VariableType};

/// Resolve an internal-format document into a model and its group labels.
///
/// An entry that cannot be deserialized is replaced by a default numeric
/// entry instead of failing the document.
pub(super) fn parse(map: &Map<String, Value>) -> (SchemaModel, GroupLabels) {
    let mut model = SchemaModel::new();
    for (key, value) in map {
        let mut entry = match serde_json::from_value::<SchemaEntry>(value.clone()) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Variable '{key}' has an unusable definition ({err}); using defaults");
                SchemaEntry::new("", "data", VariableType::Numeric)
            }
        };
        if entry.description.is_empty() {
            entry.description = key.clone();
        }
        model.insert(key.clone(), entry);
    }

    let labels = model
        .groups_in_use()
        .into_iter()
        .map(|group| {
            let label = GroupLabels::capitalize(&group);
            (group, label)
        })
        .collect();

    (model, labels)
}
