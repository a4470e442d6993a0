//! Cohort building: typed filter definitions and their evaluation.
//!
//! A cohort is always a pure function of the raw dataset and the ordered
//! filter list; this module defines the filter types and the set that
//! manages them. Evaluation lives in [`engine`], export in [`export`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StudyvarError};
use crate::schema::SchemaModel;

pub mod engine;
pub mod export;

pub use engine::{apply, attrition_trace, matches, AttritionStep};
pub use export::{CohortDefinition, CohortMeta};

/// Comparison operator of a filter predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Numeric greater-than
    #[serde(rename = ">")]
    Gt,
    /// Numeric greater-or-equal
    #[serde(rename = ">=")]
    Ge,
    /// Numeric less-than
    #[serde(rename = "<")]
    Lt,
    /// Numeric less-or-equal
    #[serde(rename = "<=")]
    Le,
    /// Numeric equality
    #[serde(rename = "=")]
    Eq,
    /// Numeric inequality
    #[serde(rename = "!=")]
    Ne,
    /// Categorical equality on stringified values
    #[serde(rename = "in")]
    In,
    /// Categorical inequality on stringified values
    #[serde(rename = "not_in")]
    NotIn,
}

impl FilterOperator {
    /// Whether the operator compares numerically
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::In | Self::NotIn)
    }

    /// The document spelling of the operator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::In => "in",
            Self::NotIn => "not_in",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a filter combines with the running result of the filters before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterLogic {
    /// Logical AND (the default; ignored for the first filter)
    #[serde(rename = "AND")]
    And,
    /// Logical OR
    #[serde(rename = "OR")]
    Or,
}

impl fmt::Display for FilterLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// One cohort filter
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Unique, monotonically assigned id
    pub id: u64,
    /// Variable key the predicate reads
    pub field: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// Literal the record value is compared against
    pub value: Value,
    /// Chaining logic with the preceding filters
    pub logic: FilterLogic,
}

/// The exportable part of a filter (no internal id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Variable key the predicate reads
    pub field: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// Literal the record value is compared against
    pub value: Value,
    /// Chaining logic with the preceding filters
    pub logic: FilterLogic,
}

impl From<&Filter> for FilterSpec {
    fn from(filter: &Filter) -> Self {
        Self {
            field: filter.field.clone(),
            operator: filter.operator,
            value: filter.value.clone(),
            logic: filter.logic,
        }
    }
}

/// Type-appropriate operator/value defaults for a field
fn defaults_for(field: &str, schema: &SchemaModel) -> Result<(FilterOperator, Value)> {
    let entry = schema.get(field).ok_or_else(|| {
        StudyvarError::filter_error(format!("Unknown filter field '{field}'"))
    })?;
    if entry.variable_type.is_numeric() {
        Ok((FilterOperator::Gt, Value::String(String::new())))
    } else {
        let first_code = entry
            .codes
            .as_ref()
            .and_then(|codes| codes.first_code())
            .unwrap_or("");
        Ok((FilterOperator::In, Value::String(first_code.to_string())))
    }
}

/// The ordered, user-edited filter list
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
    next_id: u64,
}

impl FilterSet {
    /// Create an empty filter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The filters in evaluation order
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Number of filters
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Append a filter on `field` with type-appropriate defaults and
    /// return its id
    pub fn add(&mut self, field: &str, schema: &SchemaModel) -> Result<u64> {
        let (operator, value) = defaults_for(field, schema)?;
        let id = self.next_id;
        self.next_id += 1;
        self.filters.push(Filter {
            id,
            field: field.to_string(),
            operator,
            value,
            logic: FilterLogic::And,
        });
        Ok(id)
    }

    /// Remove a filter by id; returns whether it existed
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.id != id);
        self.filters.len() != before
    }

    /// Remove every filter
    pub fn clear(&mut self) {
        self.filters.clear();
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut Filter> {
        self.filters
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StudyvarError::filter_error(format!("No filter with id {id}")))
    }

    /// Point a filter at a different field, resetting operator and value
    /// to the new field's defaults
    pub fn set_field(&mut self, id: u64, field: &str, schema: &SchemaModel) -> Result<()> {
        let (operator, value) = defaults_for(field, schema)?;
        let filter = self.get_mut(id)?;
        filter.field = field.to_string();
        filter.operator = operator;
        filter.value = value;
        Ok(())
    }

    /// Change a filter's operator
    pub fn set_operator(&mut self, id: u64, operator: FilterOperator) -> Result<()> {
        self.get_mut(id)?.operator = operator;
        Ok(())
    }

    /// Change a filter's comparison literal
    pub fn set_value(&mut self, id: u64, value: Value) -> Result<()> {
        self.get_mut(id)?.value = value;
        Ok(())
    }

    /// Change how a filter chains with the preceding ones
    pub fn set_logic(&mut self, id: u64, logic: FilterLogic) -> Result<()> {
        self.get_mut(id)?.logic = logic;
        Ok(())
    }
}
