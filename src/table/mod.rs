//! Cohort summary table ("Table 1") and its delimited-text export.
//!
//! One row per analysis variable: a compact summary cell (mean/SD for
//! numeric variables, top codes for coded ones), optional per-stratum
//! cells, and missingness columns. Identifier variables are excluded.

use crate::classify::{audit_column, valid_values};
use crate::config::EngineConfig;
use crate::record::Record;
use crate::schema::{SchemaEntry, SchemaModel, VariableType};
use crate::stats::{fmt_number, fmt_percent, frequency_table, stratify, summarize};
use crate::value::{coerce_number, value_key};

/// One summary-table row
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Variable key
    pub key: String,
    /// Human-readable description
    pub description: String,
    /// Analysis type
    pub variable_type: VariableType,
    /// Summary cells, aligned with [`SummaryTable::columns`]
    pub cells: Vec<String>,
    /// Null/absent values as a percentage of the cohort
    pub missing_pct: String,
    /// Sentinel values as a percentage of the cohort, or an em dash when
    /// the variable declares no sentinel
    pub sentinel_pct: String,
    /// The declared sentinel value, if any
    pub sentinel: Option<f64>,
}

/// The cohort summary table
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    /// Headers of the summary cells: the full cohort first, then one per
    /// stratum when stratified
    pub columns: Vec<String>,
    /// One row per analysis variable, in schema order
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Build the summary table over a cohort, optionally stratified by a
    /// variable. Every stratum present in the cohort gets a column, in
    /// ascending stratum-key order.
    #[must_use]
    pub fn build(
        schema: &SchemaModel,
        cohort: &[Record],
        stratify_by: Option<&str>,
        config: &EngineConfig,
    ) -> Self {
        let strata = stratify_by.map_or_else(Vec::new, |key| stratify(key, cohort));

        let mut columns = vec![format!("All (n={})", cohort.len())];
        if let Some(strat_key) = stratify_by {
            let strat_entry = schema.get(strat_key);
            for (code, members) in &strata {
                let label = strat_entry.map_or(code.as_str(), |e| e.code_label(code));
                columns.push(format!("{label} (n={})", members.len()));
            }
        }

        let rows = schema
            .analysis_keys()
            .map(|key| {
                let entry = schema.get(key);
                let audit = audit_column(key, entry, cohort);

                let mut cells = vec![cell_summary(key, entry, cohort, config)];
                for (_, members) in &strata {
                    cells.push(cell_summary(key, entry, members, config));
                }

                let sentinel = entry.and_then(|e| e.sentinel);
                SummaryRow {
                    key: key.to_string(),
                    description: entry.map(|e| e.description.clone()).unwrap_or_default(),
                    variable_type: entry.map(|e| e.variable_type).unwrap_or_default(),
                    cells,
                    missing_pct: fmt_percent(audit.missing, cohort.len()),
                    sentinel_pct: if sentinel.is_some() {
                        fmt_percent(audit.sentinel, cohort.len())
                    } else {
                        "—".to_string()
                    },
                    sentinel,
                }
            })
            .collect();

        Self { columns, rows }
    }

    /// Render the table as CSV, every field quoted with doubled inner
    /// quotes.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut header = vec!["Variable".to_string(), "Type".to_string()];
        header.push("Summary (n/mean±SD)".to_string());
        header.extend(self.columns.iter().skip(1).cloned());
        header.extend([
            "Null (%)".to_string(),
            "NA Sentinel (%)".to_string(),
            "Sentinel value".to_string(),
        ]);

        let mut lines = vec![csv_line(&header)];
        for row in &self.rows {
            let mut fields = vec![row.key.clone(), row.variable_type.to_string()];
            fields.extend(row.cells.iter().cloned());
            fields.push(row.missing_pct.clone());
            fields.push(row.sentinel_pct.clone());
            fields.push(row.sentinel.map(fmt_sentinel).unwrap_or_default());
            lines.push(csv_line(&fields));
        }
        lines.join("\n")
    }
}

/// The compact summary cell for one variable over one record subset.
///
/// Numeric variables summarize as "mean (SD sd)" to one decimal; coded and
/// string variables list their top codes as "label: count (pct)".
fn cell_summary(
    key: &str,
    entry: Option<&SchemaEntry>,
    records: &[Record],
    config: &EngineConfig,
) -> String {
    let valid = valid_values(key, entry, records);
    if valid.is_empty() {
        return "—".to_string();
    }

    let numeric = entry.is_none_or(|e| e.variable_type.is_numeric());
    if numeric {
        let numbers: Vec<f64> = valid.iter().copied().filter_map(coerce_number).collect();
        return match summarize(&numbers) {
            Some(summary) => format!(
                "{} (SD {})",
                fmt_number(summary.mean, 1),
                fmt_number(summary.sd, 1)
            ),
            None => "—".to_string(),
        };
    }

    frequency_table(valid.iter().copied().map(value_key))
        .iter()
        .take(config.top_codes)
        .map(|(code, count)| {
            let label = entry.map_or(code.as_str(), |e| e.code_label(code));
            format!("{label}: {count} ({})", fmt_percent(*count, records.len()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Format a sentinel value the way it appears in documents: integral
/// sentinels print without a fractional part.
fn fmt_sentinel(sentinel: f64) -> String {
    if sentinel.fract() == 0.0 && sentinel.abs() < 9e15 {
        format!("{}", sentinel as i64)
    } else {
        sentinel.to_string()
    }
}

fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CodeMap;
    use serde_json::json;

    fn records(rows: &[serde_json::Value]) -> Vec<Record> {
        rows.iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn test_schema() -> SchemaModel {
        let mut model = SchemaModel::new();
        model.insert(
            "pid",
            SchemaEntry::new("Identifier", "id", VariableType::String),
        );
        model.insert(
            "bmi",
            SchemaEntry::new("Body mass index", "anthropometry", VariableType::Numeric)
                .with_sentinel(999.0),
        );
        model.insert(
            "smoker",
            SchemaEntry::new("Smoking status", "lifestyle", VariableType::Binary)
                .with_codes(CodeMap::from_pairs([("0", "No"), ("1", "Yes")])),
        );
        model
    }

    fn test_cohort() -> Vec<Record> {
        records(&[
            json!({"pid": "a", "bmi": 1, "smoker": 1}),
            json!({"pid": "b", "bmi": 2, "smoker": 1}),
            json!({"pid": "c", "bmi": 2, "smoker": 0}),
            json!({"pid": "d", "bmi": 999, "smoker": null}),
        ])
    }

    #[test]
    fn rows_cover_analysis_variables_only() {
        let table = SummaryTable::build(
            &test_schema(),
            &test_cohort(),
            None,
            &EngineConfig::default(),
        );
        let keys: Vec<_> = table.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["bmi", "smoker"]);
        assert_eq!(table.columns, vec!["All (n=4)".to_string()]);
    }

    #[test]
    fn numeric_cells_report_mean_and_sd_over_valid_values() {
        let table = SummaryTable::build(
            &test_schema(),
            &test_cohort(),
            None,
            &EngineConfig::default(),
        );
        let bmi = &table.rows[0];
        // valid values 1, 2, 2: mean 1.667, population sd 0.471
        assert_eq!(bmi.cells[0], "1.7 (SD 0.5)");
        assert_eq!(bmi.missing_pct, "0.0%");
        assert_eq!(bmi.sentinel_pct, "25.0%");
        assert_eq!(bmi.sentinel, Some(999.0));
    }

    #[test]
    fn coded_cells_list_top_codes_with_labels() {
        let table = SummaryTable::build(
            &test_schema(),
            &test_cohort(),
            None,
            &EngineConfig::default(),
        );
        let smoker = &table.rows[1];
        assert_eq!(smoker.cells[0], "Yes: 2 (50.0%); No: 1 (25.0%)");
        assert_eq!(smoker.missing_pct, "25.0%");
        assert_eq!(smoker.sentinel_pct, "—");
    }

    #[test]
    fn stratification_adds_a_column_per_stratum() {
        let table = SummaryTable::build(
            &test_schema(),
            &test_cohort(),
            Some("smoker"),
            &EngineConfig::default(),
        );
        assert_eq!(
            table.columns,
            vec![
                "All (n=4)".to_string(),
                "No (n=1)".to_string(),
                "Yes (n=2)".to_string(),
            ]
        );
        let bmi = &table.rows[0];
        assert_eq!(bmi.cells.len(), 3);
        // the single non-smoker has bmi 2
        assert_eq!(bmi.cells[1], "2.0 (SD 0.0)");
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        let mut model = SchemaModel::new();
        model.insert(
            "q",
            SchemaEntry::new("Has \"quotes\"", "data", VariableType::String),
        );
        let cohort = records(&[json!({"q": "say \"hi\""})]);
        let table = SummaryTable::build(&model, &cohort, None, &EngineConfig::default());
        let csv = table.to_csv();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"Variable\",\"Type\",\"Summary (n/mean±SD)\",\"Null (%)\",\"NA Sentinel (%)\",\"Sentinel value\""
        );
        assert!(lines.next().unwrap().contains("\"say \"\"hi\"\": 1 (100.0%)\""));
    }

    #[test]
    fn empty_cohort_renders_placeholders() {
        let table =
            SummaryTable::build(&test_schema(), &[], None, &EngineConfig::default());
        let bmi = &table.rows[0];
        assert_eq!(bmi.cells[0], "—");
        assert_eq!(bmi.missing_pct, "—");
    }
}
