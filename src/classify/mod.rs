//! Three-way classification of raw values.
//!
//! Every statistic in the engine agrees on what counts as an observation
//! because all of them go through this module: a raw value is exactly one
//! of valid, missing, or sentinel-coded not-applicable.

use serde_json::Value;

use crate::record::Record;
use crate::schema::SchemaEntry;
use crate::value::coerce_number;

/// Auxiliary sentinel applied to every variable with a declared sentinel.
///
/// Domain convention in the derived-data release: some variables encode a
/// secondary "not applicable" as 9999 even when their primary sentinel is
/// 999. The value is fixed, not configurable.
pub const AUX_SENTINEL: f64 = 9999.0;

/// Classification of one raw value against a schema entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueClass {
    /// Usable for aggregation
    Valid,
    /// Null or absent from the record
    Missing,
    /// Equals the declared sentinel (or the auxiliary sentinel)
    Sentinel,
}

/// Classify a raw value against a variable's schema entry.
///
/// `Missing` iff the value is null or absent. `Sentinel` iff a sentinel is
/// declared and the value, coerced to a number, equals either the declared
/// sentinel or [`AUX_SENTINEL`]. Everything else is `Valid`. Sentinel
/// matching is numeric: the string `"999"` does not match sentinel 999.
#[must_use]
pub fn classify(entry: Option<&SchemaEntry>, value: Option<&Value>) -> ValueClass {
    let Some(value) = value else {
        return ValueClass::Missing;
    };
    if value.is_null() {
        return ValueClass::Missing;
    }
    if let Some(sentinel) = entry.and_then(|e| e.sentinel)
        && let Value::Number(n) = value
        && let Some(v) = n.as_f64()
        && (v == sentinel || v == AUX_SENTINEL)
    {
        return ValueClass::Sentinel;
    }
    ValueClass::Valid
}

/// Per-variable counts of each classification over a record set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnAudit {
    /// Values usable for aggregation
    pub valid: usize,
    /// Null or absent values
    pub missing: usize,
    /// Sentinel-coded not-applicable values
    pub sentinel: usize,
}

impl ColumnAudit {
    /// Total number of records audited
    #[must_use]
    pub const fn total(&self) -> usize {
        self.valid + self.missing + self.sentinel
    }

    /// Missing values as a percentage of all records
    #[must_use]
    pub fn missing_pct(&self) -> f64 {
        percentage(self.missing, self.total())
    }

    /// Sentinel values as a percentage of all records
    #[must_use]
    pub fn sentinel_pct(&self) -> f64 {
        percentage(self.sentinel, self.total())
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Count each classification for one variable across a record set
#[must_use]
pub fn audit_column(key: &str, entry: Option<&SchemaEntry>, records: &[Record]) -> ColumnAudit {
    let mut audit = ColumnAudit::default();
    for record in records {
        match classify(entry, record.get(key)) {
            ValueClass::Valid => audit.valid += 1,
            ValueClass::Missing => audit.missing += 1,
            ValueClass::Sentinel => audit.sentinel += 1,
        }
    }
    audit
}

/// Raw values classified as valid for one variable, in record order
#[must_use]
pub fn valid_values<'a>(
    key: &str,
    entry: Option<&SchemaEntry>,
    records: &'a [Record],
) -> Vec<&'a Value> {
    records
        .iter()
        .filter_map(|record| {
            let value = record.get(key);
            match classify(entry, value) {
                ValueClass::Valid => value,
                _ => None,
            }
        })
        .collect()
}

/// Valid values coerced to numbers, dropping anything non-numeric
#[must_use]
pub fn numeric_values(key: &str, entry: Option<&SchemaEntry>, records: &[Record]) -> Vec<f64> {
    valid_values(key, entry, records)
        .into_iter()
        .filter_map(coerce_number)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::VariableType;
    use serde_json::json;

    fn entry_with_sentinel(sentinel: f64) -> SchemaEntry {
        SchemaEntry::new("test", "data", VariableType::Numeric).with_sentinel(sentinel)
    }

    #[test]
    fn null_and_absent_are_missing() {
        let entry = entry_with_sentinel(999.0);
        assert_eq!(classify(Some(&entry), None), ValueClass::Missing);
        assert_eq!(
            classify(Some(&entry), Some(&Value::Null)),
            ValueClass::Missing
        );
    }

    #[test]
    fn sentinel_is_not_missing() {
        let entry = entry_with_sentinel(999.0);
        assert_eq!(
            classify(Some(&entry), Some(&json!(999))),
            ValueClass::Sentinel
        );
        assert_eq!(
            classify(Some(&entry), Some(&json!(999.0))),
            ValueClass::Sentinel
        );
    }

    #[test]
    fn auxiliary_sentinel_applies_to_any_declared_sentinel() {
        // 9999 is sentinel even when the declared sentinel is 999
        let entry = entry_with_sentinel(999.0);
        assert_eq!(
            classify(Some(&entry), Some(&json!(9999))),
            ValueClass::Sentinel
        );
        // and also when the declared sentinel is something else entirely
        let entry = entry_with_sentinel(-1.0);
        assert_eq!(
            classify(Some(&entry), Some(&json!(9999))),
            ValueClass::Sentinel
        );
    }

    #[test]
    fn no_declared_sentinel_means_everything_nonnull_is_valid() {
        let entry = SchemaEntry::new("test", "data", VariableType::Numeric);
        assert_eq!(
            classify(Some(&entry), Some(&json!(9999))),
            ValueClass::Valid
        );
        assert_eq!(classify(None, Some(&json!(999))), ValueClass::Valid);
    }

    #[test]
    fn string_values_never_match_numeric_sentinels() {
        let entry = entry_with_sentinel(999.0);
        assert_eq!(
            classify(Some(&entry), Some(&json!("999"))),
            ValueClass::Valid
        );
    }

    #[test]
    fn audit_partitions_without_overlap() {
        let entry = entry_with_sentinel(999.0);
        let records: Vec<Record> = [json!({"v": 1}), json!({"v": null}), json!({"v": 999}),
            json!({"v": 9999}), json!({}), json!({"v": 2.5})]
            .into_iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        let audit = audit_column("v", Some(&entry), &records);
        assert_eq!(audit.valid, 2);
        assert_eq!(audit.missing, 2);
        assert_eq!(audit.sentinel, 2);
        assert_eq!(audit.total(), records.len());
    }
}
