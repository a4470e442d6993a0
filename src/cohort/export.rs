//! Cohort-definition export.
//!
//! A deterministic, replayable description of how a cohort was derived:
//! filter definitions plus participant identifiers, never raw data values,
//! so the file can be shared without exposing participant data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Filter, FilterSpec};
use crate::record::Record;

/// Provenance header of a cohort definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortMeta {
    /// When the definition was created
    pub created: DateTime<Utc>,
    /// Producing tool
    pub tool: String,
    /// Name of the source data document, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    /// Records in the full dataset
    pub total_n: usize,
    /// Records in the cohort
    pub cohort_n: usize,
}

/// A replayable cohort definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortDefinition {
    /// Provenance
    pub meta: CohortMeta,
    /// The filter list that derived the cohort, in evaluation order
    pub filters: Vec<FilterSpec>,
    /// Identifier of every cohort member, in record order; null where the
    /// identifier variable is absent
    pub cohort_ids: Vec<Value>,
}

impl CohortDefinition {
    /// Build a definition for the current cohort.
    ///
    /// `id_field` names the identifier variable whose values populate
    /// `cohort_ids`.
    #[must_use]
    pub fn new(
        id_field: &str,
        total_n: usize,
        cohort: &[Record],
        filters: &[Filter],
        dataset: Option<String>,
    ) -> Self {
        Self {
            meta: CohortMeta {
                created: Utc::now(),
                tool: format!("studyvar {}", env!("CARGO_PKG_VERSION")),
                dataset,
                total_n,
                cohort_n: cohort.len(),
            },
            filters: filters.iter().map(FilterSpec::from).collect(),
            cohort_ids: cohort
                .iter()
                .map(|record| record.get(id_field).cloned().unwrap_or(Value::Null))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::{FilterLogic, FilterOperator};
    use serde_json::json;

    #[test]
    fn definition_round_trips_through_json() {
        let cohort: Vec<Record> = [json!({"pid": "AB12", "x": 1}), json!({"x": 2})]
            .into_iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        let filters = [Filter {
            id: 7,
            field: "x".to_string(),
            operator: FilterOperator::Ge,
            value: json!(1),
            logic: FilterLogic::And,
        }];

        let def = CohortDefinition::new("pid", 10, &cohort, &filters, None);
        assert_eq!(def.meta.cohort_n, 2);
        assert_eq!(def.cohort_ids, vec![json!("AB12"), Value::Null]);

        let text = serde_json::to_string(&def).unwrap();
        assert!(text.contains("\"operator\":\">=\""));
        let back: CohortDefinition = serde_json::from_str(&text).unwrap();
        assert_eq!(back, def);
    }
}
