//! Frequency tables for coded and discrete variables.

use rustc_hash::FxHashMap;

use crate::classify::AUX_SENTINEL;
use crate::schema::CodeMap;

/// One frequency-table row: stringified code and its count
pub type FrequencyRow = (String, usize);

/// Count occurrences, sorted by descending count.
///
/// Ties keep first-seen insertion order (the sort is stable), so repeated
/// calls over the same sequence are deterministic.
#[must_use]
pub fn frequency_table(values: impl IntoIterator<Item = String>) -> Vec<FrequencyRow> {
    let mut rows: Vec<FrequencyRow> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for value in values {
        match index.get(&value) {
            Some(&pos) => rows[pos].1 += 1,
            None => {
                index.insert(value.clone(), rows.len());
                rows.push((value, 1));
            }
        }
    }

    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

fn is_sentinel_code(n: f64) -> bool {
    n == 999.0 || n == AUX_SENTINEL
}

/// Re-sort rows numerically ascending with sentinel codes last.
///
/// Display order for integer and numeric variables.
pub fn sort_numeric_ascending(rows: &mut [FrequencyRow]) {
    rows.sort_by(|a, b| {
        let na = a.0.parse::<f64>().unwrap_or(f64::NAN);
        let nb = b.0.parse::<f64>().unwrap_or(f64::NAN);
        let sent_a = is_sentinel_code(na);
        let sent_b = is_sentinel_code(nb);
        match (sent_a, sent_b) {
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            _ => na.partial_cmp(&nb).unwrap_or(std::cmp::Ordering::Equal),
        }
    });
}

/// Re-sort rows by their code labels: "Yes" first, "No" second, remaining
/// codes by value, sentinel codes last.
///
/// Display order for binary and categorical variables with a code map.
pub fn sort_by_code_labels(rows: &mut [FrequencyRow], codes: &CodeMap) {
    let priority = |code: &str| -> f64 {
        let label = codes.get(code).unwrap_or("").to_lowercase();
        let n = code.parse::<f64>().unwrap_or(f64::NAN);
        if label.starts_with("yes") {
            0.0
        } else if label.starts_with("no") {
            1.0
        } else if is_sentinel_code(n) {
            9999.0
        } else {
            2.0 + n
        }
    };
    rows.sort_by(|a, b| {
        priority(&a.0)
            .partial_cmp(&priority(&b.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
