//! Series normalization
//!
//! This module turns the sparse, unordered samples handed over by storage into
//! a contiguous daily series:
//! - Dates parsed from `d.m.yyyy` (or ISO) text
//! - One entry per calendar day from the earliest sample to today
//! - Days without an entry carried as `None`, never as a numeric sentinel

use crate::error::{AnalysisError, Result};
use crate::types::{DailyValue, Sample, MISSING_SENTINEL};
use chrono::{Local, NaiveDate};
use std::collections::HashMap;

/// Normalizer for converting raw samples to a gap-filled daily series
pub struct SeriesNormalizer;

impl SeriesNormalizer {
    /// Normalize samples up to and including `today`
    ///
    /// Duplicate dates keep the last sample in input order. If a sample is
    /// dated after `today` the series is extended to that date so no logged
    /// value is dropped.
    pub fn normalize(samples: &[Sample], today: NaiveDate) -> Result<Vec<DailyValue>> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let mut by_date: HashMap<NaiveDate, Option<f64>> = HashMap::with_capacity(samples.len());
        for sample in samples {
            let date = parse_date(&sample.date)?;
            by_date.insert(date, from_raw(sample.value));
        }

        // by_date is non-empty because samples is non-empty
        let earliest = by_date.keys().min().copied().unwrap_or(today);
        let latest = by_date.keys().max().copied().unwrap_or(today);
        let end = today.max(latest);

        let series: Vec<DailyValue> = earliest
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| DailyValue {
                date,
                value: by_date.get(&date).copied().flatten(),
            })
            .collect();

        tracing::debug!(
            samples = samples.len(),
            days = series.len(),
            start = %earliest,
            end = %end,
            "normalized series"
        );

        Ok(series)
    }

    /// Normalize samples up to the local current date
    pub fn normalize_to_today(samples: &[Sample]) -> Result<Vec<DailyValue>> {
        Self::normalize(samples, Local::now().date_naive())
    }
}

/// Convert a stored value to an optional observation
pub fn from_raw(value: f64) -> Option<f64> {
    if value == MISSING_SENTINEL || value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// Parse a storage date (`d.m.yyyy`, zero padding optional, or `yyyy-mm-dd`)
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map_err(|e| AnalysisError::DateParseError(format!("'{trimmed}': {e}")))
}
