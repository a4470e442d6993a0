//! Numeric descriptive summaries.

/// Descriptive summary of a numeric value sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    /// Number of values summarized
    pub n: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation (divide by n)
    pub sd: f64,
    /// Smallest value
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Largest value
    pub max: f64,
}

/// Summarize a numeric value sequence, or `None` if it is empty.
///
/// NaN values are dropped before aggregation. Quartiles use linear
/// interpolation at the fractional rank `p * (n - 1)` over the sorted
/// sequence.
#[must_use]
pub fn summarize(values: &[f64]) -> Option<NumericSummary> {
    let mut nums: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if nums.is_empty() {
        return None;
    }
    nums.sort_by(f64::total_cmp);

    let n = nums.len();
    let mean = nums.iter().sum::<f64>() / n as f64;
    let variance = nums.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

    let quantile = |p: f64| -> f64 {
        let rank = p * (n - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        nums[lo] + (nums[hi] - nums[lo]) * (rank - lo as f64)
    };

    Some(NumericSummary {
        n,
        mean,
        sd: variance.sqrt(),
        min: nums[0],
        q1: quantile(0.25),
        median: quantile(0.5),
        q3: quantile(0.75),
        max: nums[n - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_none() {
        assert!(summarize(&[]).is_none());
        assert!(summarize(&[f64::NAN]).is_none());
    }

    #[test]
    fn summary_of_known_sequence() {
        let s = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.n, 8);
        assert!((s.mean - 5.0).abs() < 1e-12);
        // population SD of this classic sequence is exactly 2
        assert!((s.sd - 2.0).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
    }

    #[test]
    fn quartiles_interpolate_between_ranks() {
        // ranks for n=4: q1 at 0.75, median at 1.5, q3 at 2.25
        let s = summarize(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((s.q1 - 1.75).abs() < 1e-12);
        assert!((s.median - 2.5).abs() < 1e-12);
        assert!((s.q3 - 3.25).abs() < 1e-12);
    }

    #[test]
    fn quartiles_are_monotonic() {
        let cases: &[&[f64]] = &[
            &[1.0],
            &[5.0, 1.0],
            &[3.0, 3.0, 3.0],
            &[10.0, -4.0, 7.5, 0.1, 2.2, 9.9, 3.3],
        ];
        for values in cases {
            let s = summarize(values).unwrap();
            assert!(s.min <= s.q1);
            assert!(s.q1 <= s.median);
            assert!(s.median <= s.q3);
            assert!(s.q3 <= s.max);
        }
    }
}
