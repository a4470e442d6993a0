//! Histogram binning policy.
//!
//! Integer variables with a small value range get one bin per integer so
//! the axis has no gaps; everything else gets a fixed target bin count.

use itertools::Itertools;
use itertools::MinMaxResult::{MinMax, NoElements, OneElement};

use crate::config::EngineConfig;
use crate::schema::VariableType;
use crate::stats::fmt_number;

/// One histogram bin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramBin {
    /// Axis label (`"12"`, `"10–14"`, or a one-decimal lower edge)
    pub label: String,
    /// Number of values in the bin
    pub count: usize,
}

/// A binned value distribution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Histogram {
    /// Bins in ascending value order
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Total count across all bins
    #[must_use]
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    match values.iter().copied().filter(|v| !v.is_nan()).minmax() {
        NoElements => None,
        OneElement(v) => Some((v, v)),
        MinMax(lo, hi) => Some((lo, hi)),
    }
}

/// Bin values for a histogram, or `None` if there is nothing to bin.
#[must_use]
pub fn histogram(
    values: &[f64],
    variable_type: VariableType,
    config: &EngineConfig,
) -> Option<Histogram> {
    let (min, max) = min_max(values)?;
    let range = max - min;
    let is_integer = variable_type == VariableType::Integer;

    if is_integer && range <= config.integer_span_max as f64 {
        return Some(integer_unit_bins(values, min, range));
    }

    let target = config.target_bins;
    let step = if is_integer {
        (range / target as f64).ceil().max(1.0)
    } else if range > 0.0 {
        range / target as f64
    } else {
        1.0
    };
    let num_bins = if is_integer {
        ((range + 1.0) / step).ceil() as usize
    } else {
        target
    };

    let mut counts = vec![0usize; num_bins];
    for &v in values {
        if v.is_nan() {
            continue;
        }
        let idx = (((v - min) / step).floor() as usize).min(num_bins - 1);
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lo = min + i as f64 * step;
            let label = if is_integer {
                let lo = lo.round() as i64;
                let hi = ((lo as f64 + step - 1.0).min(max)).round() as i64;
                if step == 1.0 {
                    lo.to_string()
                } else {
                    format!("{lo}–{hi}")
                }
            } else {
                fmt_number(lo, 1)
            };
            HistogramBin { label, count }
        })
        .collect();

    Some(Histogram { bins })
}

/// One bin per integer value across the whole range, empty bins included
fn integer_unit_bins(values: &[f64], min: f64, range: f64) -> Histogram {
    let base = min.round() as i64;
    let num_bins = range as usize + 1;
    let mut counts = vec![0usize; num_bins];
    for &v in values {
        if v.is_nan() {
            continue;
        }
        let idx = v.round() as i64 - base;
        if (0..num_bins as i64).contains(&idx) {
            counts[idx as usize] += 1;
        }
    }
    Histogram {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                label: (base + i as i64).to_string(),
                count,
            })
            .collect(),
    }
}

/// Bin values into a fixed number of equal-width bins.
///
/// Used for the per-stratum comparison charts, which always use the same
/// bin count regardless of variable type.
#[must_use]
pub fn fixed_bins(values: &[f64], num_bins: usize) -> Option<Histogram> {
    if num_bins == 0 {
        return None;
    }
    let (min, max) = min_max(values)?;
    let range = max - min;
    let step = if range > 0.0 { range / num_bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; num_bins];
    for &v in values {
        if v.is_nan() {
            continue;
        }
        let idx = (((v - min) / step).floor() as usize).min(num_bins - 1);
        counts[idx] += 1;
    }

    Some(Histogram {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                label: fmt_number(min + i as f64 * step, 1),
                count,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_integer_range_gets_one_bin_per_value() {
        let values = [1.0, 2.0, 2.0, 5.0];
        let h = histogram(&values, VariableType::Integer, &EngineConfig::default()).unwrap();
        let labels: Vec<&str> = h.bins.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "3", "4", "5"]);
        let counts: Vec<usize> = h.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 2, 0, 0, 1]);
    }

    #[test]
    fn wide_integer_range_uses_rounded_up_step() {
        let config = EngineConfig::default();
        // range 99 > 50, step = ceil(99 / 30) = 4
        let values: Vec<f64> = (0..=99).map(f64::from).collect();
        let h = histogram(&values, VariableType::Integer, &config).unwrap();
        assert_eq!(h.bins.len(), 25);
        assert_eq!(h.bins[0].label, "0–3");
        assert_eq!(h.total(), 100);
    }

    #[test]
    fn continuous_values_get_target_bins() {
        let config = EngineConfig::default();
        let values: Vec<f64> = (0..300).map(|i| f64::from(i) / 10.0).collect();
        let h = histogram(&values, VariableType::Numeric, &config).unwrap();
        assert_eq!(h.bins.len(), config.target_bins);
        assert_eq!(h.total(), values.len());
    }

    #[test]
    fn max_value_lands_in_last_bin() {
        let config = EngineConfig::default();
        let values = [0.0, 100.0];
        let h = histogram(&values, VariableType::Numeric, &config).unwrap();
        assert_eq!(h.bins.first().unwrap().count, 1);
        assert_eq!(h.bins.last().unwrap().count, 1);
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(histogram(&[], VariableType::Numeric, &EngineConfig::default()).is_none());
        assert!(fixed_bins(&[], 20).is_none());
    }

    #[test]
    fn fixed_bins_cover_all_values() {
        let values = [1.0, 1.5, 2.0, 3.5, 9.0];
        let h = fixed_bins(&values, 4).unwrap();
        assert_eq!(h.bins.len(), 4);
        assert_eq!(h.total(), values.len());
    }
}
