//! Reconciliation of a resolved schema with the loaded records.

use crate::config::EngineConfig;
use crate::record::Record;
use crate::schema::SchemaModel;

use super::infer::{column_values, infer_column};

/// What reconciliation changed or flagged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Data columns absent from the schema, now carrying inferred entries
    pub added: Vec<String>,
    /// Schema variables absent from the data, kept but unusable
    pub unmatched: Vec<String>,
}

impl ReconcileReport {
    /// Whether the schema and data matched exactly
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.unmatched.is_empty()
    }
}

/// Align a schema with the records it will describe.
///
/// Data columns (keys of the first record) missing from the schema get
/// inferred entries appended; schema variables absent from the data are
/// reported but never removed. An empty dataset reconciles trivially.
pub fn reconcile(
    model: &mut SchemaModel,
    records: &[Record],
    config: &EngineConfig,
) -> ReconcileReport {
    let Some(first) = records.first() else {
        return ReconcileReport::default();
    };

    let mut report = ReconcileReport::default();
    for key in first.keys() {
        if model.contains_key(key) {
            continue;
        }
        let entry = infer_column(key, &column_values(key, records), config);
        model.insert(key.clone(), entry);
        report.added.push(key.clone());
    }
    for key in model.keys() {
        if !first.contains_key(key) {
            report.unmatched.push(key.to_string());
        }
    }

    if !report.added.is_empty() {
        log::info!(
            "{} data column(s) not in schema; entries inferred: {:?}",
            report.added.len(),
            report.added
        );
    }
    if !report.unmatched.is_empty() {
        log::warn!(
            "{} schema variable(s) not found in data: {:?}",
            report.unmatched.len(),
            report.unmatched
        );
    }
    report
}
