//! Schema inference from raw data.
//!
//! When no schema document is supplied, a minimal one is derived from the
//! records themselves: all-numeric columns with few distinct values become
//! coded, whole-number columns become integer, everything else numeric or
//! string.

use std::cmp::Ordering;

use itertools::Itertools;
use serde_json::Value;

use super::ResolvedSchema;
use crate::config::EngineConfig;
use crate::record::Record;
use crate::schema::{CodeMap, GroupLabels, SchemaEntry, SchemaModel, SchemaSource, VariableType};
use crate::value::{coerce_number, value_key};

/// Infer a schema from the loaded records.
///
/// Columns are the keys of the first record; all entries land in the
/// `data` group.
#[must_use]
pub fn infer_schema(records: &[Record], config: &EngineConfig) -> ResolvedSchema {
    let mut model = SchemaModel::new();
    if let Some(first) = records.first() {
        for key in first.keys() {
            model.insert(key.clone(), infer_column(key, &column_values(key, records), config));
        }
    }

    let mut group_labels = GroupLabels::new();
    group_labels.insert("data", "Data");
    log::info!("Inferred schema for {} data columns", model.len());

    ResolvedSchema {
        model,
        group_labels,
        source: SchemaSource::Inferred,
    }
}

/// The non-null values of one column, in record order.
pub(super) fn column_values<'a>(key: &str, records: &'a [Record]) -> Vec<&'a Value> {
    records
        .iter()
        .filter_map(|record| record.get(key))
        .filter(|value| !value.is_null())
        .collect()
}

/// Infer the schema entry for one column from its non-null values.
#[must_use]
pub fn infer_column(key: &str, values: &[&Value], config: &EngineConfig) -> SchemaEntry {
    if values.is_empty() {
        return SchemaEntry::new(key, "data", VariableType::String);
    }

    let numbers: Vec<f64> = values.iter().copied().filter_map(coerce_number).collect();
    if numbers.len() < values.len() {
        return SchemaEntry::new(key, "data", VariableType::String);
    }

    let mut distinct: Vec<String> = values.iter().copied().map(value_key).unique().collect();
    distinct.sort_by(|a, b| {
        let a = a.parse::<f64>().unwrap_or(f64::NAN);
        let b = b.parse::<f64>().unwrap_or(f64::NAN);
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    });

    let entry = SchemaEntry::new(key, "data", VariableType::Numeric);
    if distinct.len() <= config.infer_binary_max {
        SchemaEntry {
            variable_type: VariableType::Binary,
            ..entry
        }
        .with_codes(self_labelled(&distinct))
    } else if distinct.len() <= config.infer_categorical_max {
        SchemaEntry {
            variable_type: VariableType::Categorical,
            ..entry
        }
        .with_codes(self_labelled(&distinct))
    } else if numbers.iter().all(|n| n.fract() == 0.0) {
        SchemaEntry {
            variable_type: VariableType::Integer,
            ..entry
        }
    } else {
        entry
    }
}

fn self_labelled(codes: &[String]) -> CodeMap {
    CodeMap::from_pairs(codes.iter().map(|c| (c.clone(), c.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(rows: &[Value]) -> Vec<Record> {
        rows.iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn infer(rows: &[Value]) -> ResolvedSchema {
        infer_schema(&records(rows), &EngineConfig::default())
    }

    #[test]
    fn two_distinct_numeric_values_infer_binary_with_codes() {
        let resolved = infer(&[json!({"flag": 0}), json!({"flag": 1}), json!({"flag": 0})]);
        let entry = resolved.model.get("flag").unwrap();
        assert_eq!(entry.variable_type, VariableType::Binary);
        let codes = entry.codes.as_ref().unwrap();
        assert_eq!(codes.get("0"), Some("0"));
        assert_eq!(codes.get("1"), Some("1"));
        assert_eq!(resolved.source, SchemaSource::Inferred);
    }

    #[test]
    fn up_to_twelve_distinct_values_infer_categorical() {
        let rows: Vec<Value> = (0..24).map(|i| json!({"grade": i % 12})).collect();
        let resolved = infer(&rows);
        let entry = resolved.model.get("grade").unwrap();
        assert_eq!(entry.variable_type, VariableType::Categorical);
        // codes sorted ascending by numeric value
        assert_eq!(entry.codes.as_ref().unwrap().first_code(), Some("0"));
    }

    #[test]
    fn many_whole_numbers_infer_integer_and_fractions_numeric() {
        let whole: Vec<Value> = (0..40).map(|i| json!({"v": i})).collect();
        let resolved = infer(&whole);
        assert_eq!(
            resolved.model.get("v").unwrap().variable_type,
            VariableType::Integer
        );

        let mixed: Vec<Value> = (0..40).map(|i| json!({"v": f64::from(i) + 0.5})).collect();
        let resolved = infer(&mixed);
        assert_eq!(
            resolved.model.get("v").unwrap().variable_type,
            VariableType::Numeric
        );
    }

    #[test]
    fn non_numeric_or_empty_columns_infer_string() {
        let resolved = infer(&[
            json!({"name": "ann", "gap": null}),
            json!({"name": "bo", "gap": null}),
        ]);
        assert_eq!(
            resolved.model.get("name").unwrap().variable_type,
            VariableType::String
        );
        let gap = resolved.model.get("gap").unwrap();
        assert_eq!(gap.variable_type, VariableType::String);
        assert_eq!(gap.group, "data");
    }

    #[test]
    fn numeric_strings_count_as_numeric_values() {
        let resolved = infer(&[json!({"v": "1"}), json!({"v": 2}), json!({"v": "2"})]);
        let entry = resolved.model.get("v").unwrap();
        // "2" and 2 share a key, leaving two distinct values
        assert_eq!(entry.variable_type, VariableType::Binary);
        assert_eq!(entry.codes.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn empty_dataset_infers_an_empty_schema() {
        let resolved = infer(&[]);
        assert!(resolved.model.is_empty());
        assert_eq!(resolved.group_labels.get("data"), Some("Data"));
    }

    #[test]
    fn inference_is_deterministic() {
        let rows = [json!({"a": 1.5, "b": "x"}), json!({"a": 2.5, "b": "y"})];
        let first = infer(&rows);
        let second = infer(&rows);
        assert_eq!(
            first.model.to_internal_document(),
            second.model.to_internal_document()
        );
    }
}
