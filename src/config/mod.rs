//! Configuration for the study-variable engine.

/// Tuning knobs shared by the schema resolver and the statistics engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Largest bare `enum` (no labels) still turned into a code map
    pub max_enum_codes: usize,
    /// Distinct-value cap for inferring a `binary` column
    pub infer_binary_max: usize,
    /// Distinct-value cap for inferring a `categorical` column
    pub infer_categorical_max: usize,
    /// Target bin count for continuous and wide-range integer histograms
    pub target_bins: usize,
    /// Largest integer value range that still gets one bin per value
    pub integer_span_max: u64,
    /// Bin count used for per-stratum histograms
    pub stratum_bins: usize,
    /// Number of top codes shown in compact categorical summaries
    pub top_codes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_enum_codes: 20,
            infer_binary_max: 2,
            infer_categorical_max: 12,
            target_bins: 30,
            integer_span_max: 50,
            stratum_bins: 20,
            top_codes: 3,
        }
    }
}
