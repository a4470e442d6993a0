//! Filter evaluation and attrition accounting.

use serde_json::Value;

use super::{Filter, FilterLogic, FilterOperator, FilterSpec};
use crate::record::Record;
use crate::value::{coerce_number, value_key};

/// Evaluate one predicate against one record.
///
/// A null or absent field value is always `false`, whatever the operator.
/// Numeric operators are `false` when either side fails numeric coercion.
fn predicate(record: &Record, filter: &Filter) -> bool {
    let Some(raw) = record.get(&filter.field) else {
        return false;
    };
    if raw.is_null() {
        return false;
    }

    match filter.operator {
        FilterOperator::In => value_key(raw) == value_key(&filter.value),
        FilterOperator::NotIn => value_key(raw) != value_key(&filter.value),
        numeric => {
            let (Some(lhs), Some(rhs)) = (coerce_number(raw), coerce_number(&filter.value))
            else {
                return false;
            };
            match numeric {
                FilterOperator::Gt => lhs > rhs,
                FilterOperator::Ge => lhs >= rhs,
                FilterOperator::Lt => lhs < rhs,
                FilterOperator::Le => lhs <= rhs,
                FilterOperator::Eq => lhs == rhs,
                FilterOperator::Ne => lhs != rhs,
                FilterOperator::In | FilterOperator::NotIn => unreachable!(),
            }
        }
    }
}

/// Whether a record satisfies the filter list.
///
/// The first filter seeds the running result; each subsequent filter folds
/// in via its own logic, strictly left to right with no precedence and no
/// short-circuiting. An empty filter list matches everything.
#[must_use]
pub fn matches(record: &Record, filters: &[Filter]) -> bool {
    let mut filters_iter = filters.iter();
    let Some(first) = filters_iter.next() else {
        return true;
    };
    let mut result = predicate(record, first);
    for filter in filters_iter {
        let hit = predicate(record, filter);
        result = match filter.logic {
            FilterLogic::Or => result || hit,
            FilterLogic::And => result && hit,
        };
    }
    result
}

/// Apply the filter list, producing the cohort in record order
#[must_use]
pub fn apply(records: &[Record], filters: &[Filter]) -> Vec<Record> {
    records
        .iter()
        .filter(|record| matches(record, filters))
        .cloned()
        .collect()
}

/// One row of the attrition trace
#[derive(Debug, Clone, PartialEq)]
pub struct AttritionStep {
    /// The filter this step adds
    pub filter: FilterSpec,
    /// Records satisfying the filter prefix up to and including this one
    pub count: usize,
    /// Records lost relative to the previous step; negative when an
    /// OR-joined filter widens the prefix cohort
    pub dropped: i64,
}

/// Per-prefix cohort sizes for the filter list.
///
/// Each prefix is recomputed from scratch against the full record set; OR
/// logic makes prefix results non-monotonic, so incremental narrowing of a
/// running subset would be wrong.
#[must_use]
pub fn attrition_trace(records: &[Record], filters: &[Filter]) -> Vec<AttritionStep> {
    let mut steps = Vec::with_capacity(filters.len());
    let mut previous = records.len();
    for end in 1..=filters.len() {
        let prefix = &filters[..end];
        let count = records
            .iter()
            .filter(|record| matches(record, prefix))
            .count();
        steps.push(AttritionStep {
            filter: FilterSpec::from(&filters[end - 1]),
            count,
            dropped: previous as i64 - count as i64,
        });
        previous = count;
    }
    steps
}
