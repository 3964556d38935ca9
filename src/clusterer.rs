//! Temporal clustering
//!
//! This module aggregates a normalized daily series to a resolution that fits
//! a chart:
//! - Tier chosen from series length alone (Days / Weeks / Months / Years)
//! - Bucket means over logged days only, floored for aggregated tiers
//! - Axis labels thinned to a display maximum without touching buckets
//! - A week-major grid for heatmap rendering

use crate::config::{EngineConfig, Locale};
use crate::types::{ClusteredSeries, HeatCell, TimeSpanTier, WeekColumn};
use chrono::{Datelike, Duration, NaiveDate};
use std::ops::Range;

/// Series shorter than this are shown per day
pub const DAYS_TIER_LIMIT: usize = 14;
/// Series shorter than this are shown per week
pub const WEEKS_TIER_LIMIT: usize = 60;
/// Series shorter than this are shown per month
pub const MONTHS_TIER_LIMIT: usize = 365;

/// Clusterer for turning daily series into chart buckets
pub struct TemporalClusterer;

impl TemporalClusterer {
    /// Tier for a series of `len` days
    pub fn tier_for_len(len: usize) -> TimeSpanTier {
        if len < DAYS_TIER_LIMIT {
            TimeSpanTier::Days
        } else if len < WEEKS_TIER_LIMIT {
            TimeSpanTier::Weeks
        } else if len < MONTHS_TIER_LIMIT {
            TimeSpanTier::Months
        } else {
            TimeSpanTier::Years
        }
    }

    /// Cluster a daily series whose last entry falls on `end_date`
    pub fn cluster(
        values: &[Option<f64>],
        end_date: NaiveDate,
        config: &EngineConfig,
    ) -> ClusteredSeries {
        let tier = Self::tier_for_len(values.len());
        let dates = dates_ending_at(end_date, values.len());

        let (groups, labels) = match tier {
            TimeSpanTier::Days => day_groups(&dates, config.locale),
            TimeSpanTier::Weeks => week_groups(&dates, end_date),
            TimeSpanTier::Months => run_groups(&dates, |d| (d.year(), d.month()), |d| {
                let months = config.locale.month_abbreviations();
                format!("{} {}", months[d.month0() as usize], d.year())
            }),
            TimeSpanTier::Years => run_groups(&dates, |d| (d.year(), 0), |d| d.year().to_string()),
        };

        let mut buckets = Vec::with_capacity(groups.len());
        let mut member_counts = Vec::with_capacity(groups.len());
        for range in groups {
            let (value, count) = bucket_mean(&values[range]);
            // Aggregated buckets are floored for display; single days stay raw
            let value = if tier == TimeSpanTier::Days {
                value
            } else {
                value.floor()
            };
            buckets.push(value);
            member_counts.push(count);
        }

        tracing::debug!(
            days = values.len(),
            tier = ?tier,
            buckets = buckets.len(),
            "clustered series"
        );

        ClusteredSeries {
            tier,
            buckets,
            member_counts,
            labels: thin_labels(labels, config.max_labels),
        }
    }

    /// Build the weekly heatmap grid, newest week last
    ///
    /// Rows are weekdays with Sunday at index 0. The newest value lands on the
    /// row of `end_date`'s weekday and the walk proceeds backwards until
    /// `max_weeks` complete columns exist or the data runs out.
    pub fn week_grid(
        values: &[Option<f64>],
        end_date: NaiveDate,
        max_weeks: usize,
    ) -> Vec<WeekColumn> {
        let max_weeks = max_weeks.max(1);
        let mut weeks: Vec<WeekColumn> = Vec::new();
        let mut week: WeekColumn = [HeatCell::Empty; 7];
        let mut cursor = end_date.weekday().num_days_from_sunday() as usize;

        for value in values.iter().rev() {
            week[cursor] = match value {
                Some(v) => HeatCell::Value(*v),
                None => HeatCell::Missing,
            };

            if cursor == 0 {
                weeks.push(week);
                if weeks.len() >= max_weeks {
                    break;
                }
                week = [HeatCell::Empty; 7];
                cursor = 6;
            } else {
                cursor -= 1;
            }
        }

        if weeks.len() < max_weeks && week.iter().any(|cell| *cell != HeatCell::Empty) {
            weeks.push(week);
        }

        weeks.reverse();
        weeks
    }

    /// Number of heatmap columns that fit in `width_px`
    pub fn max_weeks_for_width(width_px: f64, config: &EngineConfig) -> usize {
        let columns = (width_px * config.heatmap_fill_ratio / config.heatmap_cell_px).floor();
        if columns.is_finite() && columns >= 1.0 {
            columns as usize
        } else {
            1
        }
    }
}

/// Blank all but the first, last and evenly spaced interior labels
///
/// The output always has the same length as the input.
pub fn thin_labels(labels: Vec<String>, max_labels: usize) -> Vec<String> {
    let len = labels.len();
    if len <= max_labels || max_labels == 0 {
        return labels;
    }

    let step = len.div_ceil(max_labels);
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            if i == 0 || i == len - 1 || i % step == 0 {
                label
            } else {
                String::new()
            }
        })
        .collect()
}

fn dates_ending_at(end_date: NaiveDate, len: usize) -> Vec<NaiveDate> {
    (0..len)
        .map(|i| end_date - Duration::days((len - 1 - i) as i64))
        .collect()
}

/// Mean over logged members and the member count; 0 when nothing was logged
fn bucket_mean(members: &[Option<f64>]) -> (f64, usize) {
    let (sum, count) = members
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        (0.0, 0)
    } else {
        (sum / count as f64, count)
    }
}

fn day_groups(dates: &[NaiveDate], locale: Locale) -> (Vec<Range<usize>>, Vec<String>) {
    let weekdays = locale.weekday_names();
    let groups = (0..dates.len()).map(|i| i..i + 1).collect();
    let labels = dates
        .iter()
        .map(|d| weekdays[d.weekday().num_days_from_sunday() as usize].to_string())
        .collect();
    (groups, labels)
}

/// The current partial week is its own bucket; older days go in runs of 7
/// counted from the oldest day, so only the run just before the current week
/// can be short.
fn week_groups(dates: &[NaiveDate], end_date: NaiveDate) -> (Vec<Range<usize>>, Vec<String>) {
    let len = dates.len();
    let weekday = end_date.weekday().num_days_from_sunday() as usize;
    let current_week = if weekday == 0 { 7 } else { weekday }.min(len);
    let split = len - current_week;

    let mut groups: Vec<Range<usize>> = (0..split)
        .step_by(7)
        .map(|start| start..(start + 7).min(split))
        .collect();
    if current_week > 0 {
        groups.push(split..len);
    }

    let labels = groups
        .iter()
        .map(|range| {
            let start = dates[range.start];
            let end = dates[range.end - 1];
            format!("{:02}-{:02}.{:02}", start.day(), end.day(), end.month())
        })
        .collect();
    (groups, labels)
}

/// Group consecutive dates sharing a calendar key
fn run_groups<K, L>(dates: &[NaiveDate], key: K, label: L) -> (Vec<Range<usize>>, Vec<String>)
where
    K: Fn(&NaiveDate) -> (i32, u32),
    L: Fn(&NaiveDate) -> String,
{
    let mut groups: Vec<Range<usize>> = Vec::new();
    let mut labels = Vec::new();
    for (i, date) in dates.iter().enumerate() {
        match groups.last_mut() {
            Some(range) if key(&dates[range.start]) == key(date) => range.end = i + 1,
            _ => {
                groups.push(i..i + 1);
                labels.push(label(date));
            }
        }
    }
    (groups, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn all_logged(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(TemporalClusterer::tier_for_len(1), TimeSpanTier::Days);
        assert_eq!(TemporalClusterer::tier_for_len(13), TimeSpanTier::Days);
        assert_eq!(TemporalClusterer::tier_for_len(14), TimeSpanTier::Weeks);
        assert_eq!(TemporalClusterer::tier_for_len(59), TimeSpanTier::Weeks);
        assert_eq!(TemporalClusterer::tier_for_len(60), TimeSpanTier::Months);
        assert_eq!(TemporalClusterer::tier_for_len(364), TimeSpanTier::Months);
        assert_eq!(TemporalClusterer::tier_for_len(365), TimeSpanTier::Years);
    }

    #[test]
    fn test_days_keep_raw_values() {
        let values = all_logged(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        // 2024-03-10 is a Sunday
        let clustered =
            TemporalClusterer::cluster(&values, day(2024, 3, 10), &EngineConfig::default());

        assert_eq!(clustered.tier, TimeSpanTier::Days);
        assert_eq!(
            clustered.buckets,
            vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(clustered.labels.len(), 10);
        assert_eq!(clustered.labels[0], "Fri");
        assert_eq!(clustered.labels[9], "Sun");
    }

    #[test]
    fn test_days_missing_value_has_zero_members() {
        let values = vec![Some(3.0), None, Some(2.0)];
        let clustered =
            TemporalClusterer::cluster(&values, day(2024, 3, 10), &EngineConfig::default());
        assert_eq!(clustered.buckets, vec![3.0, 0.0, 2.0]);
        assert_eq!(clustered.member_counts, vec![1, 0, 1]);
    }

    #[test]
    fn test_weeks_partial_current_week() {
        // 2024-03-13 is a Wednesday, so the current week holds 3 days
        let mut values = vec![Some(1.0); 17];
        values[14] = Some(4.0);
        values[15] = Some(5.0);
        values[16] = None;
        let clustered =
            TemporalClusterer::cluster(&values, day(2024, 3, 13), &EngineConfig::default());

        assert_eq!(clustered.tier, TimeSpanTier::Weeks);
        // 14 older days in two runs of 7, then the 3-day current week
        assert_eq!(clustered.buckets, vec![1.0, 1.0, 4.0]);
        assert_eq!(clustered.member_counts, vec![7, 7, 2]);
        assert_eq!(clustered.labels, vec!["26-03.03", "04-10.03", "11-13.03"]);
    }

    #[test]
    fn test_weeks_floor_mean_and_sunday_is_full_week() {
        // 2024-03-17 is a Sunday, so the newest bucket spans 7 days
        let mut values = vec![Some(2.0); 16];
        values[15] = Some(3.0);
        let clustered =
            TemporalClusterer::cluster(&values, day(2024, 3, 17), &EngineConfig::default());

        // runs: [0..7) [7..9) then the current week [9..16)
        assert_eq!(clustered.member_counts, vec![7, 2, 7]);
        // (6*2 + 3) / 7 = 2.14 -> 2
        assert_eq!(clustered.buckets, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_months_distinct_calendar_months() {
        // 90 days ending 2024-03-31: Jan 2 .. Mar 31
        let values: Vec<Option<f64>> = (0..90)
            .map(|i| if i % 10 == 0 { None } else { Some((i % 4) as f64) })
            .collect();
        let end = day(2024, 3, 31);
        let clustered = TemporalClusterer::cluster(&values, end, &EngineConfig::default());

        assert_eq!(clustered.tier, TimeSpanTier::Months);
        assert_eq!(clustered.buckets.len(), 3);
        assert_eq!(clustered.labels, vec!["JAN 2024", "FEB 2024", "MAR 2024"]);
        assert_eq!(clustered.member_counts.iter().sum::<usize>(), 81);
    }

    #[test]
    fn test_months_mean_excludes_missing() {
        let mut values = vec![None; 60];
        // March 2024 days 1..=2 at the end of a series ending 2024-03-02
        values[58] = Some(5.0);
        values[59] = Some(7.0);
        let clustered =
            TemporalClusterer::cluster(&values, day(2024, 3, 2), &EngineConfig::default());
        assert_eq!(*clustered.buckets.last().unwrap(), 6.0);
        assert_eq!(clustered.buckets[0], 0.0);
        assert_eq!(clustered.member_counts[0], 0);
    }

    #[test]
    fn test_years_tier() {
        let values = vec![Some(1.0); 400];
        let clustered =
            TemporalClusterer::cluster(&values, day(2024, 6, 30), &EngineConfig::default());
        assert_eq!(clustered.tier, TimeSpanTier::Years);
        assert_eq!(clustered.labels, vec!["2023", "2024"]);
        assert_eq!(clustered.member_counts.iter().sum::<usize>(), 400);
    }

    #[test]
    fn test_german_month_labels() {
        let values = vec![Some(1.0); 70];
        let config = EngineConfig {
            locale: Locale::De,
            ..Default::default()
        };
        let clustered = TemporalClusterer::cluster(&values, day(2024, 3, 31), &config);
        assert_eq!(clustered.labels[0], "JAN 2024");
        assert_eq!(clustered.labels[2], "MÄR 2024");
    }

    #[test]
    fn test_thinning_preserves_length() {
        let labels: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        let thinned = thin_labels(labels, 5);
        assert_eq!(thinned.len(), 12);
        // step = ceil(12 / 5) = 3
        assert_eq!(
            thinned,
            vec!["0", "", "", "3", "", "", "6", "", "", "9", "", "11"]
        );
    }

    #[test]
    fn test_labels_match_buckets_for_every_tier() {
        let config = EngineConfig::default();
        for len in [1, 10, 13, 14, 30, 59, 60, 200, 364, 365, 800] {
            let values = vec![Some(1.0); len];
            let clustered = TemporalClusterer::cluster(&values, day(2024, 5, 15), &config);
            assert_eq!(clustered.labels.len(), clustered.buckets.len(), "len {len}");
            assert_eq!(clustered.member_counts.len(), clustered.buckets.len());
            let visible = clustered.labels.iter().filter(|l| !l.is_empty()).count();
            assert!(visible <= config.max_labels + 1, "len {len}: {visible} labels");
        }
    }

    #[test]
    fn test_week_grid_alignment() {
        // 2024-03-13 is a Wednesday (row 3)
        let values = vec![Some(1.0), None, Some(0.0), Some(1.0), Some(1.0)];
        let grid = TemporalClusterer::week_grid(&values, day(2024, 3, 13), 10);

        assert_eq!(grid.len(), 2);
        // newest week: Sun..Wed hold the last four values
        assert_eq!(grid[1][3], HeatCell::Value(1.0));
        assert_eq!(grid[1][2], HeatCell::Value(1.0));
        assert_eq!(grid[1][1], HeatCell::Value(0.0));
        assert_eq!(grid[1][0], HeatCell::Missing);
        assert_eq!(grid[1][4], HeatCell::Empty);
        // previous week: only Saturday, earlier days are before the data
        assert_eq!(grid[0][6], HeatCell::Value(1.0));
        assert_eq!(grid[0][5], HeatCell::Empty);
    }

    #[test]
    fn test_week_grid_respects_max_weeks() {
        let values = vec![Some(1.0); 100];
        let grid = TemporalClusterer::week_grid(&values, day(2024, 3, 13), 4);
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_max_weeks_for_width() {
        let config = EngineConfig::default();
        assert_eq!(TemporalClusterer::max_weeks_for_width(400.0, &config), 12);
        assert_eq!(TemporalClusterer::max_weeks_for_width(10.0, &config), 1);
    }
}
