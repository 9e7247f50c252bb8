//! Percentile helpers using nearest-rank selection.
//!
//! - Empty input => `None`.
//! - `percentile <= 0` => first element.
//! - `percentile >= 100` => last element.
//! - Otherwise we compute a position within `[0, len-1]` and round to the
//!   nearest index.

use std::collections::BTreeMap;

fn rank(len: usize, percentile: f64) -> usize {
    if percentile <= 0.0 {
        0
    } else if percentile >= 100.0 {
        len - 1
    } else {
        let position = (percentile / 100.0) * (len as f64 - 1.0);
        position.round() as usize
    }
}

/// Percentile of the multiset described by a value -> occurrences map,
/// without expanding it into a sorted slice.
pub fn value_from_counts<T: Copy + Ord>(counts: &BTreeMap<T, usize>, percentile: f64) -> Option<T> {
    let total: usize = counts.values().sum();
    if total == 0 {
        return None;
    }

    let target = rank(total, percentile);
    let mut seen = 0;
    for (value, count) in counts {
        seen += count;
        if seen > target {
            return Some(*value);
        }
    }
    None
}
