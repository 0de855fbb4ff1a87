use std::cmp::Ordering;

use crate::Scalar;

fn cmp_scalar<F: Scalar>(a: &F, b: &F) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Return the lower median of `values`, or `None` for an empty slice.
///
/// Reorders `values` in place.
///
/// ```
/// use kdtree_bucket::lower_median;
/// assert_eq!(lower_median(&mut [3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(lower_median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.0));
/// assert_eq!(lower_median::<f64>(&mut []), None);
/// ```
pub fn lower_median<F: Scalar>(values: &mut [F]) -> Option<F> {
    if values.is_empty() {
        return None;
    }
    let k = (values.len() - 1) / 2;
    Some(*order_stat::kth_by(values, k, cmp_scalar))
}

/// Choose the value to split `values` at, so that both `v <= split` and
/// `v > split` are non-empty.
///
/// Uses the lower median, stepping down to the largest value below the
/// maximum when the median is the maximum itself. Returns `None` when all
/// values are equal, since no such split exists.
pub fn split_value<F: Scalar>(values: &mut [F]) -> Option<F> {
    let max = values.iter().cloned().fold(None, |acc: Option<F>, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })?;
    let median = lower_median(values)?;
    if median < max {
        return Some(median);
    }
    values.iter().cloned().filter(|&v| v < max).fold(None, |acc: Option<F>, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })
}
