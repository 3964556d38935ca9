//! Single-variable summary
//!
//! Descriptive statistics for the trend view and slicing of a normalized series
//! to the time frame the user selected.

use crate::stats::{mean, median, min_max, observed};
use crate::types::{DailyValue, SeriesSummary};

/// Count, mean, median, min and max over logged days; `None` if nothing was logged
pub fn summarize(values: &[Option<f64>]) -> Option<SeriesSummary> {
    let logged = observed(values);
    let (min, max) = min_max(&logged)?;
    Some(SeriesSummary {
        count: logged.len(),
        mean: mean(&logged)?,
        median: median(&logged)?,
        min,
        max,
    })
}

/// Days `start..=end` of a normalized series, clamped to its bounds
///
/// Returns an empty slice when `start` lies past the end or after `end`.
pub fn slice_range(series: &[DailyValue], start: usize, end: usize) -> &[DailyValue] {
    if series.is_empty() || start > end || start >= series.len() {
        return &[];
    }
    let end = end.min(series.len() - 1);
    &series[start..=end]
}
