use std::cmp::Ordering;

/// Sorts ascending in IEEE total order, so positive NaN ends up last.
pub fn sort_f64(values: &mut [f64]) {
    values.sort_by(f64::total_cmp);
}

/// Median of an ascending slice, averaging the two central values for even lengths.
pub fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Q1, median and Q3 picked by index `n/4`, `n/2`, `3n/4` from an ascending slice.
pub fn quartiles_of_sorted(sorted: &[f64]) -> Option<(f64, f64, f64)> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    Some((sorted[n / 4], sorted[n / 2], sorted[(3 * n) / 4]))
}

/// The `n` smallest values, ascending.
///
/// Maintained as a running list capped at `n`: every value is inserted in
/// order and the maximum evicted whenever the list grows past `n`.
pub fn n_smallest(values: impl IntoIterator<Item = f64>, n: usize) -> Vec<f64> {
    let mut smallest: Vec<f64> = Vec::with_capacity(n + 1);
    if n == 0 {
        return smallest;
    }
    for v in values {
        let pos = smallest.partition_point(|s| s.partial_cmp(&v) != Some(Ordering::Greater));
        smallest.insert(pos, v);
        if smallest.len() > n {
            smallest.pop();
        }
    }
    smallest
}
