//! Core types for the Daily Insight engine
//!
//! This module defines the value objects that flow through each stage: raw
//! storage samples, gap-filled daily values, typed series for pair analysis,
//! clustered chart series and analysis results. Everything here is built fresh
//! per call and never mutated after it is returned.

use crate::contingency::ContingencyTable;
use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value the storage layer writes for a day without an entry
pub const MISSING_SENTINEL: f64 = -1.0;

/// Number of levels on the ordinal (smiley) scale
pub const ORDINAL_LEVELS: u8 = 5;

/// A raw sample as delivered by the storage collaborator
///
/// `date` is textual (`d.m.yyyy`, ISO `yyyy-mm-dd` also accepted) and `value`
/// uses [`MISSING_SENTINEL`] for "no entry that day".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub date: String,
    pub value: f64,
}

impl Sample {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// One calendar day of a normalized series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub date: NaiveDate,
    /// `None` when nothing was logged that day
    pub value: Option<f64>,
}

/// Semantic kind of a logged variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    Boolean,
    /// 5-point scale, canonical coding 1..=5
    Ordinal,
    Numeric,
    /// Tag lists; never analysed by this engine
    Array,
}

impl VariableType {
    /// Position in the canonical pair order (Boolean < Ordinal < Numeric)
    pub(crate) fn rank(self) -> u8 {
        match self {
            VariableType::Boolean => 0,
            VariableType::Ordinal => 1,
            VariableType::Numeric => 2,
            VariableType::Array => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Boolean => "boolean",
            VariableType::Ordinal => "ordinal",
            VariableType::Numeric => "numeric",
            VariableType::Array => "array",
        }
    }
}

/// How a producer encodes ordinal values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinalCoding {
    /// 0..=4, shifted by one at the boundary
    ZeroBased,
    /// 1..=5, already canonical
    #[default]
    OneBased,
}

/// A series tagged with its variable type, ready for pair analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedSeries {
    pub kind: VariableType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub coding: OrdinalCoding,
    pub values: Vec<Option<f64>>,
}

impl TypedSeries {
    pub fn new(kind: VariableType, values: Vec<Option<f64>>) -> Self {
        Self {
            kind,
            label: None,
            coding: OrdinalCoding::default(),
            values,
        }
    }

    /// Build from a series where every day has an entry
    pub fn from_observed(kind: VariableType, values: &[f64]) -> Self {
        Self::new(kind, values.iter().copied().map(Some).collect())
    }

    /// Build from a normalized daily series
    pub fn from_daily(kind: VariableType, daily: &[DailyValue]) -> Self {
        Self::new(kind, daily.iter().map(|d| d.value).collect())
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_coding(mut self, coding: OrdinalCoding) -> Self {
        self.coding = coding;
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Display label, falling back to the variable type
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.kind.as_str())
    }

    /// Validate and convert values to the canonical coding
    ///
    /// Booleans must be 0 or 1, ordinals must fall on the 5-point scale after
    /// coding is applied, numerics must be finite.
    pub fn canonical_values(&self) -> Result<Vec<Option<f64>>> {
        self.values
            .iter()
            .map(|value| match value {
                None => Ok(None),
                Some(v) => self.canonical_value(*v).map(Some),
            })
            .collect()
    }

    fn canonical_value(&self, v: f64) -> Result<f64> {
        let invalid = || AnalysisError::InvalidValue {
            variable: self.display_label().to_string(),
            value: v,
        };
        if !v.is_finite() {
            return Err(invalid());
        }
        match self.kind {
            VariableType::Boolean => {
                if v == 0.0 || v == 1.0 {
                    Ok(v)
                } else {
                    Err(invalid())
                }
            }
            VariableType::Ordinal => {
                let shifted = match self.coding {
                    OrdinalCoding::ZeroBased => v + 1.0,
                    OrdinalCoding::OneBased => v,
                };
                if shifted.fract() == 0.0 && (1.0..=ORDINAL_LEVELS as f64).contains(&shifted) {
                    Ok(shifted)
                } else {
                    Err(invalid())
                }
            }
            VariableType::Numeric | VariableType::Array => Ok(v),
        }
    }
}

/// Resolution tier of a charted series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSpanTier {
    Days,
    Weeks,
    Months,
    Years,
}

/// Strength band of a correlation-like statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTier {
    None,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl EffectTier {
    /// Classify `|statistic|` using the fixed breakpoints 0.2 / 0.4 / 0.6 / 0.8
    pub fn from_statistic(statistic: f64) -> Self {
        let magnitude = statistic.abs();
        if magnitude < 0.2 {
            EffectTier::None
        } else if magnitude < 0.4 {
            EffectTier::Weak
        } else if magnitude < 0.6 {
            EffectTier::Moderate
        } else if magnitude < 0.8 {
            EffectTier::Strong
        } else {
            EffectTier::VeryStrong
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectTier::None => "none",
            EffectTier::Weak => "weak",
            EffectTier::Moderate => "moderate",
            EffectTier::Strong => "strong",
            EffectTier::VeryStrong => "very strong",
        }
    }
}

/// Direction of the relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Positive iff the directional proxy is >= 0
    pub fn from_sign(proxy: f64) -> Self {
        if proxy >= 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }
}

/// Statistical procedure selected for a type pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Phi,
    Pearson,
    PointBiserial,
}

/// A category on one axis of a contingency table or bar chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryValue {
    Flag(bool),
    Level(u8),
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Flag(true) => write!(f, "yes"),
            CategoryValue::Flag(false) => write!(f, "no"),
            CategoryValue::Level(level) => write!(f, "{level}"),
        }
    }
}

/// A contingency cell as returned by the top-N ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCell {
    pub row: usize,
    pub col: usize,
    pub category_a: CategoryValue,
    pub category_b: CategoryValue,
    pub count: usize,
    pub percent_of_total: f64,
}

/// Result of a drill-down into one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedCell {
    pub category_a: CategoryValue,
    pub category_b: CategoryValue,
    pub count: usize,
    /// `count / total * 100`, one decimal
    pub percent_of_total: f64,
    pub total: usize,
}

/// Conditional probabilities for two boolean variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalDifference {
    /// P(B | A)
    pub p_b_given_a: f64,
    /// P(B | not A)
    pub p_b_given_not_a: f64,
    /// Rounded `(P(B|A) - P(B|not A)) * 100`
    pub diff_percent_points: i64,
}

/// Mean of the numeric variable within one category of the other variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMean {
    pub category: CategoryValue,
    pub mean: Option<f64>,
    pub count: usize,
    /// Share of paired samples in this category, one decimal
    pub share_percent: f64,
}

/// Full result of a two-variable analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub kind_a: VariableType,
    pub kind_b: VariableType,
    pub method: Method,
    pub statistic: f64,
    pub effect_tier: EffectTier,
    pub direction: Direction,
    /// Regression slope of B on A, where a regression applies
    pub slope: Option<f64>,
    /// Number of days where both variables were logged
    pub sample_count: usize,
    pub outlier_count_a: usize,
    pub outlier_count_b: usize,
    pub contingency: Option<ContingencyTable>,
    pub top_cells: Vec<RankedCell>,
    pub conditional: Option<ConditionalDifference>,
    pub category_means: Option<Vec<CategoryMean>>,
}

impl AnalysisResult {
    pub fn has_outliers(&self) -> bool {
        self.outlier_count_a > 0 || self.outlier_count_b > 0
    }
}

/// A series aggregated to its display resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteredSeries {
    pub tier: TimeSpanTier,
    pub buckets: Vec<f64>,
    /// Non-missing members per bucket; 0 means the bucket value is a placeholder
    pub member_counts: Vec<usize>,
    pub labels: Vec<String>,
}

/// One cell of the weekly heatmap grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HeatCell {
    /// Before the first day of data; nothing is drawn
    Empty,
    /// Inside the series but nothing logged
    Missing,
    Value(f64),
}

/// Seven rows (Sunday first), one column per week
pub type WeekColumn = [HeatCell; 7];

/// Hypothesis and recommendation text for a relationship panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub hypothesis: String,
    pub recommendation: String,
}

/// Descriptive statistics over the logged days of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}
