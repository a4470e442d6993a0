//! Engine state: the loaded dataset, the active schema, the filter list,
//! and the cohort derived from them.
//!
//! The cohort is never edited in place; it is recomputed from the raw
//! records and the filter list after every change, so it is always a pure
//! function of the two.

use serde_json::Value;

use crate::classify::{audit_column, numeric_values, valid_values, ColumnAudit};
use crate::cohort::engine::{apply, attrition_trace, AttritionStep};
use crate::cohort::export::CohortDefinition;
use crate::cohort::{FilterLogic, FilterOperator, FilterSet};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::record::{records_from_document, Record};
use crate::resolve::{infer_schema, reconcile, resolve_document, ReconcileReport, ResolvedSchema};
use crate::schema::{GroupLabels, SchemaModel, SchemaSource, VariableType};
use crate::stats::{
    fixed_bins, frequency_table, histogram, sort_by_code_labels, sort_numeric_ascending,
    stratify, summarize, FrequencyRow, Histogram, NumericSummary,
};
use crate::table::SummaryTable;
use crate::value::value_key;

/// Result of loading a data document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of records loaded
    pub records: usize,
    /// Schema/data reconciliation outcome; `None` when the schema was
    /// (re-)inferred from the data instead
    pub reconcile: Option<ReconcileReport>,
}

/// Dataset-level overview numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overview {
    /// Number of records in the dataset
    pub participants: usize,
    /// Number of analysis variables
    pub variables: usize,
    /// Null or absent cells across all analysis variables
    pub missing_cells: usize,
    /// `participants * variables`
    pub total_cells: usize,
}

impl Overview {
    /// Non-missing cells as a percentage of all cells
    #[must_use]
    pub fn completeness_pct(&self) -> f64 {
        100.0 - self.missing_pct()
    }

    /// Missing cells as a percentage of all cells
    #[must_use]
    pub fn missing_pct(&self) -> f64 {
        if self.total_cells == 0 {
            0.0
        } else {
            self.missing_cells as f64 / self.total_cells as f64 * 100.0
        }
    }
}

/// The variables of one thematic group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    /// Group key
    pub group: String,
    /// Display label
    pub label: String,
    /// Variable keys in the group, in schema order
    pub keys: Vec<String>,
}

/// Per-stratum numeric summary for the stratified comparison view
#[derive(Debug, Clone, PartialEq)]
pub struct StratumSummary {
    /// Stringified stratum value
    pub code: String,
    /// Code label of the stratum value, or the code itself
    pub label: String,
    /// Records in the stratum
    pub n: usize,
    /// Summary of the target variable within the stratum
    pub summary: NumericSummary,
    /// Fixed-bin distribution of the target variable within the stratum
    pub histogram: Histogram,
}

/// The full engine state
#[derive(Debug, Clone)]
pub struct AppState {
    schema: ResolvedSchema,
    raw: Vec<Record>,
    cohort: Vec<Record>,
    filters: FilterSet,
    config: EngineConfig,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl AppState {
    /// Create an empty state with the built-in schema active
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            schema: ResolvedSchema::builtin(),
            raw: Vec::new(),
            cohort: Vec::new(),
            filters: FilterSet::new(),
            config,
        }
    }

    /// The active schema model
    #[must_use]
    pub fn schema(&self) -> &SchemaModel {
        &self.schema.model
    }

    /// Display labels for the active schema's groups
    #[must_use]
    pub fn group_labels(&self) -> &GroupLabels {
        &self.schema.group_labels
    }

    /// Where the active schema came from
    #[must_use]
    pub fn schema_source(&self) -> SchemaSource {
        self.schema.source
    }

    /// The full record set
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.raw
    }

    /// The current cohort
    #[must_use]
    pub fn cohort(&self) -> &[Record] {
        &self.cohort
    }

    /// The active filter set
    #[must_use]
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// The engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The first identifier variable (group `id`), if the schema has one
    #[must_use]
    pub fn id_key(&self) -> Option<&str> {
        self.schema
            .model
            .iter()
            .find(|(_, entry)| entry.group == "id")
            .map(|(key, _)| key)
    }

    /// Load a data document, replacing any previous dataset.
    ///
    /// With an inferred schema active, the schema is re-inferred from the
    /// new data; otherwise the active schema is reconciled against it. The
    /// cohort is recomputed either way. A structurally invalid document
    /// leaves the state untouched.
    pub fn load_records(&mut self, document: Value) -> Result<LoadReport> {
        let records = records_from_document(document)?;
        self.raw = records;

        let report = match self.schema.source {
            SchemaSource::Inferred => {
                self.schema = infer_schema(&self.raw, &self.config);
                None
            }
            SchemaSource::Builtin | SchemaSource::File => {
                Some(reconcile(&mut self.schema.model, &self.raw, &self.config))
            }
        };
        self.refresh_cohort();
        log::info!(
            "Loaded {} records against {} schema ({} variables)",
            self.raw.len(),
            self.schema.source,
            self.schema.model.len()
        );
        Ok(LoadReport {
            records: self.raw.len(),
            reconcile: report,
        })
    }

    /// Load a schema document, replacing the active schema.
    ///
    /// With data already loaded, the new schema is reconciled against it
    /// and the cohort recomputed. An unresolvable document leaves the
    /// state untouched.
    pub fn load_schema(&mut self, document: &Value) -> Result<Option<ReconcileReport>> {
        let mut resolved = resolve_document(document, &self.config)?;
        let report = if self.raw.is_empty() {
            None
        } else {
            Some(reconcile(&mut resolved.model, &self.raw, &self.config))
        };
        self.schema = resolved;
        self.refresh_cohort();
        Ok(report)
    }

    /// Discard the active schema and infer one from the loaded data
    pub fn infer_schema_from_data(&mut self) {
        self.schema = infer_schema(&self.raw, &self.config);
        self.refresh_cohort();
    }

    fn refresh_cohort(&mut self) {
        self.cohort = apply(&self.raw, self.filters.filters());
    }

    /// Append a filter on `field` with type-appropriate defaults
    pub fn add_filter(&mut self, field: &str) -> Result<u64> {
        let id = self.filters.add(field, &self.schema.model)?;
        self.refresh_cohort();
        Ok(id)
    }

    /// Remove a filter by id; returns whether it existed
    pub fn remove_filter(&mut self, id: u64) -> bool {
        let removed = self.filters.remove(id);
        if removed {
            self.refresh_cohort();
        }
        removed
    }

    /// Remove every filter, restoring the full cohort
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.refresh_cohort();
    }

    /// Point a filter at a different field, resetting operator and value
    pub fn set_filter_field(&mut self, id: u64, field: &str) -> Result<()> {
        self.filters.set_field(id, field, &self.schema.model)?;
        self.refresh_cohort();
        Ok(())
    }

    /// Change a filter's operator
    pub fn set_filter_operator(&mut self, id: u64, operator: FilterOperator) -> Result<()> {
        self.filters.set_operator(id, operator)?;
        self.refresh_cohort();
        Ok(())
    }

    /// Change a filter's comparison literal
    pub fn set_filter_value(&mut self, id: u64, value: Value) -> Result<()> {
        self.filters.set_value(id, value)?;
        self.refresh_cohort();
        Ok(())
    }

    /// Change how a filter chains with the preceding ones
    pub fn set_filter_logic(&mut self, id: u64, logic: FilterLogic) -> Result<()> {
        self.filters.set_logic(id, logic)?;
        self.refresh_cohort();
        Ok(())
    }

    /// Dataset-level overview over the full record set
    #[must_use]
    pub fn overview(&self) -> Overview {
        let participants = self.raw.len();
        let keys: Vec<&str> = self.schema.model.analysis_keys().collect();
        let missing_cells = keys
            .iter()
            .map(|key| {
                self.raw
                    .iter()
                    .filter(|record| record.get(*key).is_none_or(Value::is_null))
                    .count()
            })
            .sum();
        Overview {
            participants,
            variables: keys.len(),
            missing_cells,
            total_cells: participants * keys.len(),
        }
    }

    /// Analysis variables grouped by theme, in first-seen group order
    #[must_use]
    pub fn group_breakdown(&self) -> Vec<GroupSummary> {
        let mut groups: Vec<GroupSummary> = Vec::new();
        for key in self.schema.model.analysis_keys() {
            // analysis keys always have entries
            let Some(entry) = self.schema.model.get(key) else {
                continue;
            };
            match groups.iter_mut().find(|g| g.group == entry.group) {
                Some(group) => group.keys.push(key.to_string()),
                None => groups.push(GroupSummary {
                    group: entry.group.clone(),
                    label: self.schema.group_labels.label_for(&entry.group),
                    keys: vec![key.to_string()],
                }),
            }
        }
        groups
    }

    /// Per-variable missing/sentinel audits over the cohort, worst
    /// missingness first
    #[must_use]
    pub fn missingness(&self) -> Vec<(String, ColumnAudit)> {
        let mut rows: Vec<(String, ColumnAudit)> = self
            .schema
            .model
            .analysis_keys()
            .map(|key| {
                let audit = audit_column(key, self.schema.model.get(key), &self.cohort);
                (key.to_string(), audit)
            })
            .collect();
        rows.sort_by(|a, b| {
            b.1.missing_pct()
                .partial_cmp(&a.1.missing_pct())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }

    /// Classification counts for one variable over the cohort
    #[must_use]
    pub fn variable_audit(&self, key: &str) -> ColumnAudit {
        audit_column(key, self.schema.model.get(key), &self.cohort)
    }

    /// Numeric summary of a variable's valid values over the cohort
    #[must_use]
    pub fn variable_summary(&self, key: &str) -> Option<NumericSummary> {
        let values = numeric_values(key, self.schema.model.get(key), &self.cohort);
        summarize(&values)
    }

    /// Frequency table of a variable's valid values over the cohort,
    /// descending by count
    #[must_use]
    pub fn variable_frequencies(&self, key: &str) -> Vec<FrequencyRow> {
        let entry = self.schema.model.get(key);
        let valid = valid_values(key, entry, &self.cohort);
        frequency_table(valid.into_iter().map(value_key))
    }

    /// Frequency rows in chart display order: integer and numeric
    /// variables ascending with sentinel codes last, coded variables by
    /// label priority
    #[must_use]
    pub fn display_frequencies(&self, key: &str) -> Vec<FrequencyRow> {
        let mut rows = self.variable_frequencies(key);
        match self.schema.model.get(key) {
            Some(entry)
                if matches!(
                    entry.variable_type,
                    VariableType::Integer | VariableType::Numeric
                ) =>
            {
                sort_numeric_ascending(&mut rows);
            }
            Some(entry) => {
                if let Some(codes) = &entry.codes {
                    sort_by_code_labels(&mut rows, codes);
                }
            }
            None => {}
        }
        rows
    }

    /// Histogram of a variable's valid values over the cohort
    #[must_use]
    pub fn variable_histogram(&self, key: &str) -> Option<Histogram> {
        let entry = self.schema.model.get(key)?;
        let values = numeric_values(key, Some(entry), &self.cohort);
        histogram(&values, entry.variable_type, &self.config)
    }

    /// Numeric summaries of `target` within each stratum of `by`, one
    /// entry per stratum with at least one numeric value
    #[must_use]
    pub fn stratified_summaries(&self, by: &str, target: &str) -> Vec<StratumSummary> {
        let by_entry = self.schema.model.get(by);
        let target_entry = self.schema.model.get(target);
        stratify(by, &self.cohort)
            .into_iter()
            .filter_map(|(code, members)| {
                let values = numeric_values(target, target_entry, &members);
                let summary = summarize(&values)?;
                let histogram = fixed_bins(&values, self.config.stratum_bins)?;
                let label = by_entry.map_or_else(|| code.clone(), |e| e.code_label(&code).to_string());
                Some(StratumSummary {
                    n: members.len(),
                    label,
                    code,
                    summary,
                    histogram,
                })
            })
            .collect()
    }

    /// Per-prefix attrition trace of the filter list over the full record
    /// set
    #[must_use]
    pub fn attrition(&self) -> Vec<AttritionStep> {
        attrition_trace(&self.raw, self.filters.filters())
    }

    /// The cohort summary table, optionally stratified by a variable
    #[must_use]
    pub fn summary_table(&self, stratify_by: Option<&str>) -> SummaryTable {
        SummaryTable::build(&self.schema.model, &self.cohort, stratify_by, &self.config)
    }

    /// Export the current cohort as a replayable definition.
    ///
    /// Identifiers are read from `id_field`; records without it export a
    /// null identifier.
    #[must_use]
    pub fn export_cohort(&self, id_field: &str, dataset: Option<String>) -> CohortDefinition {
        CohortDefinition::new(
            id_field,
            self.raw.len(),
            &self.cohort,
            self.filters.filters(),
            dataset,
        )
    }
}
