//! A Rust library for resolving derived study-variable schemas, building
//! filtered cohorts, and computing descriptive statistics over them.
//!
//! The engine is organized around a small pipeline: a schema is resolved
//! (from a document, the built-in reference, or the data itself), raw
//! record values are classified as valid, missing, or sentinel-coded, and
//! everything downstream (summaries, frequency tables, histograms, the
//! cohort filter engine, the summary table) operates on the classified
//! values so all views of the data agree.

pub mod classify;
pub mod cohort;
pub mod config;
pub mod error;
pub mod record;
pub mod resolve;
pub mod schema;
pub mod state;
pub mod stats;
pub mod table;
pub mod value;

// Re-export the most common types for easier use
// Core types
pub use config::EngineConfig;
pub use error::{Result, StudyvarError};
pub use record::{records_from_document, Record};
pub use state::{AppState, LoadReport, Overview};

// Schema resolution
pub use resolve::{infer_schema, resolve_document, ReconcileReport, ResolvedSchema};
pub use schema::{CodeMap, GroupLabels, SchemaEntry, SchemaModel, SchemaSource, VariableType};

// Value classification
pub use classify::{classify, ColumnAudit, ValueClass, AUX_SENTINEL};

// Statistics
pub use stats::{histogram, summarize, FrequencyRow, Histogram, NumericSummary};

// Cohort building and export
pub use cohort::{
    CohortDefinition, Filter, FilterLogic, FilterOperator, FilterSet, FilterSpec,
};
pub use table::{SummaryRow, SummaryTable};
