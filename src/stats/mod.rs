//! Descriptive statistics over classified values.
//!
//! Numeric summaries, frequency tables, histogram binning, and
//! stratification all operate on the valid-classified subset produced by
//! [`crate::classify`], so every view of the data agrees.

pub mod binning;
pub mod frequency;
pub mod numeric;

pub use binning::{fixed_bins, histogram, Histogram, HistogramBin};
pub use frequency::{frequency_table, sort_by_code_labels, sort_numeric_ascending, FrequencyRow};
pub use numeric::{summarize, NumericSummary};

use crate::record::Record;
use crate::value::value_key;

/// Format a number to a fixed number of decimals, or an em dash for NaN
#[must_use]
pub fn fmt_number(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "—".to_string()
    } else {
        format!("{value:.decimals$}")
    }
}

/// Format `part` of `total` as a one-decimal percentage, or an em dash
/// when the total is zero
#[must_use]
pub fn fmt_percent(part: usize, total: usize) -> String {
    if total == 0 {
        "—".to_string()
    } else {
        format!("{:.1}%", part as f64 / total as f64 * 100.0)
    }
}

/// Partition records into strata by a variable's stringified value.
///
/// Records where the variable is null or absent belong to no stratum.
/// Strata are sorted ascending by stratum key.
#[must_use]
pub fn stratify(key: &str, records: &[Record]) -> Vec<(String, Vec<Record>)> {
    let mut strata: Vec<(String, Vec<Record>)> = Vec::new();
    for record in records {
        let Some(value) = record.get(key) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let stratum = value_key(value);
        match strata.iter_mut().find(|(k, _)| *k == stratum) {
            Some((_, members)) => members.push(record.clone()),
            None => strata.push((stratum, vec![record.clone()])),
        }
    }
    strata.sort_by(|a, b| a.0.cmp(&b.0));
    strata
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(rows: &[serde_json::Value]) -> Vec<Record> {
        rows.iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn stratify_skips_nulls_and_sorts_by_key() {
        let data = records(&[
            json!({"g": 2, "v": 10}),
            json!({"g": 1, "v": 20}),
            json!({"g": null, "v": 30}),
            json!({"g": 2, "v": 40}),
            json!({"v": 50}),
        ]);
        let strata = stratify("g", &data);
        assert_eq!(strata.len(), 2);
        assert_eq!(strata[0].0, "1");
        assert_eq!(strata[0].1.len(), 1);
        assert_eq!(strata[1].0, "2");
        assert_eq!(strata[1].1.len(), 2);
    }

    #[test]
    fn formatting_helpers_use_em_dash_placeholders() {
        assert_eq!(fmt_number(1.25, 1), "1.2");
        assert_eq!(fmt_number(f64::NAN, 1), "—");
        assert_eq!(fmt_percent(1, 4), "25.0%");
        assert_eq!(fmt_percent(3, 0), "—");
    }
}
