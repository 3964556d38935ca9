//! Descriptive and bivariate statistics
//!
//! All functions operate on observed values only. Missing days are represented
//! as `None` upstream and must be dropped (see [`observed`]) before anything
//! here is called; degenerate inputs return `None` instead of NaN.

/// Keep only the logged values of a series
pub fn observed(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (average of the two middle values for even lengths)
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Smallest and largest value
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// True when every value is identical
///
/// Checked on the values themselves because a computed variance of a constant
/// fractional series can come out a few ulps above zero.
pub fn is_constant(values: &[f64]) -> bool {
    matches!(min_max(values), Some((lo, hi)) if lo == hi)
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Pearson correlation coefficient
///
/// Returns `None` for mismatched or empty input and when either series is
/// constant (the denominator would be zero).
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() || is_constant(x) || is_constant(y) {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((numerator / denominator).clamp(-1.0, 1.0))
}

/// Least-squares line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

/// Simple linear regression of `y` on `x`; `None` when `x` is constant
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<Regression> {
    if x.len() != y.len() || x.is_empty() || is_constant(x) {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let covariance: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    let variance_x: f64 = x.iter().map(|a| (a - mean_x).powi(2)).sum();
    if variance_x == 0.0 {
        return None;
    }

    let slope = covariance / variance_x;
    Some(Regression {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Count values further than `sigma` standard deviations from the mean
pub fn count_outliers(values: &[f64], sigma: f64) -> usize {
    let (Some(m), Some(sd)) = (mean(values), std_dev(values)) else {
        return 0;
    };
    values
        .iter()
        .filter(|v| (*v - m).abs() > sigma * sd)
        .count()
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / total * 100` rounded to one decimal; 0 for an empty total
pub fn percent_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 / total as f64 * 100.0)
}
