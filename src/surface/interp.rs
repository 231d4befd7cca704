/// Interpolate `y(x)` on a strike-sorted row of `(x, y)` knots.
///
/// - Exact matches (within 1e-10) return stored values directly.
/// - Outside the knot range: nearest knot, never extrapolated.
/// - Between knots: linear.
///
/// Returns `None` for an empty row.
pub(crate) fn interpolate_row(row: &[(f64, f64)], x: f64) -> Option<f64> {
    let (first, last) = (row.first()?, row.last()?);

    if let Some(&(_, y)) = row.iter().find(|(k, _)| (x - k).abs() < 1e-10) {
        return Some(y);
    }
    if x <= first.0 {
        return Some(first.1);
    }
    if x >= last.0 {
        return Some(last.1);
    }

    let right = row.partition_point(|&(k, _)| k < x);
    let (x0, y0) = row[right - 1];
    let (x1, y1) = row[right];
    let alpha = (x - x0) / (x1 - x0);
    Some((1.0 - alpha) * y0 + alpha * y1)
}

/// Index of the value closest to `target`; the earlier index wins ties.
pub(crate) fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(i, _)| i)
}
