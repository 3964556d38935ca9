//! Engine entry points
//!
//! This module provides the public API for Daily Insight. It wires the stages
//! together for the two views a caller renders:
//! - Trend view: normalize, optionally slice, summarize and cluster one variable
//! - Relationship view: normalize two variables, align them by date, analyze
//!   the pair and compose the recommendation text
//!
//! Every call is independent. The engine holds only its configuration.

use crate::analyzer::PairAnalyzer;
use crate::clusterer::TemporalClusterer;
use crate::config::EngineConfig;
use crate::error::{AnalysisError, Result};
use crate::normalizer::SeriesNormalizer;
use crate::recommendation::RecommendationComposer;
use crate::summary::{slice_range, summarize};
use crate::types::{
    AnalysisResult, ClusteredSeries, DailyValue, OrdinalCoding, Recommendation, Sample,
    SelectedCell, SeriesSummary, TypedSeries, VariableType, WeekColumn,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One variable as handed over by storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInput {
    pub label: String,
    pub kind: VariableType,
    #[serde(default)]
    pub coding: OrdinalCoding,
    pub samples: Vec<Sample>,
}

impl VariableInput {
    pub fn new(label: impl Into<String>, kind: VariableType, samples: Vec<Sample>) -> Self {
        Self {
            label: label.into(),
            kind,
            coding: OrdinalCoding::default(),
            samples,
        }
    }
}

/// Request for the single-variable trend view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRequest {
    pub variable: VariableInput,
    /// Defaults to the local current date
    #[serde(default)]
    pub today: Option<NaiveDate>,
    /// Inclusive day index range into the normalized series
    #[serde(default)]
    pub range: Option<(usize, usize)>,
}

/// Chart-ready trend of one variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: usize,
    pub summary: Option<SeriesSummary>,
    pub series: ClusteredSeries,
}

/// Request for the two-variable relationship view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRequest {
    pub a: VariableInput,
    pub b: VariableInput,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Statistics and text for a relationship panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipReport {
    pub label_a: String,
    pub label_b: String,
    pub analysis: AnalysisResult,
    pub recommendation: Recommendation,
}

/// Drill-down into one contingency cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectCellRequest {
    pub a: VariableInput,
    pub b: VariableInput,
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellReport {
    pub cell: SelectedCell,
    pub description: String,
}

/// Request for the weekly heatmap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapRequest {
    pub variable: VariableInput,
    pub width_px: f64,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Stateless analysis engine configured once per caller
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: EngineConfig,
}

impl InsightEngine {
    /// Create an engine after validating `config`
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Trend view for one variable
    pub fn trend(&self, request: &TrendRequest) -> Result<TrendReport> {
        let today = resolve_today(request.today);
        let daily = SeriesNormalizer::normalize(&request.variable.samples, today)?;
        let daily = match request.range {
            Some((start, end)) => slice_range(&daily, start, end),
            None => &daily[..],
        };

        let (first, last) = match (daily.first(), daily.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return Err(AnalysisError::EmptyInput),
        };
        let values = TypedSeries::from_daily(request.variable.kind, daily).values;

        Ok(TrendReport {
            label: request.variable.label.clone(),
            start_date: first,
            end_date: last,
            days: daily.len(),
            summary: summarize(&values),
            series: TemporalClusterer::cluster(&values, last, &self.config),
        })
    }

    /// Relationship view for two variables
    pub fn relationship(&self, request: &RelationshipRequest) -> Result<RelationshipReport> {
        let analysis = self.analyze(&request.a, &request.b, request.today)?;
        let recommendation =
            RecommendationComposer::compose(&analysis, &request.a.label, &request.b.label);

        Ok(RelationshipReport {
            label_a: request.a.label.clone(),
            label_b: request.b.label.clone(),
            analysis,
            recommendation,
        })
    }

    /// Look up a contingency cell the user tapped
    pub fn select_cell(&self, request: &SelectCellRequest) -> Result<CellReport> {
        let analysis = self.analyze(&request.a, &request.b, request.today)?;
        let table = analysis
            .contingency
            .as_ref()
            .ok_or(AnalysisError::UnsupportedTypePair(request.a.kind, request.b.kind))?;
        let cell = table.select(request.row, request.col)?;
        let description =
            RecommendationComposer::describe_selection(&cell, &request.a.label, &request.b.label);
        Ok(CellReport { cell, description })
    }

    /// Weekly heatmap columns that fit in the requested width
    pub fn heatmap(&self, request: &HeatmapRequest) -> Result<Vec<WeekColumn>> {
        let today = resolve_today(request.today);
        let daily = SeriesNormalizer::normalize(&request.variable.samples, today)?;
        let end_date = daily.last().map(|d| d.date).ok_or(AnalysisError::EmptyInput)?;
        let values: Vec<Option<f64>> = daily.iter().map(|d| d.value).collect();
        let max_weeks = TemporalClusterer::max_weeks_for_width(request.width_px, &self.config);
        Ok(TemporalClusterer::week_grid(&values, end_date, max_weeks))
    }

    pub fn trend_json(&self, request_json: &str) -> Result<String> {
        let request: TrendRequest = serde_json::from_str(request_json)?;
        Ok(serde_json::to_string(&self.trend(&request)?)?)
    }

    pub fn relationship_json(&self, request_json: &str) -> Result<String> {
        let request: RelationshipRequest = serde_json::from_str(request_json)?;
        Ok(serde_json::to_string(&self.relationship(&request)?)?)
    }

    pub fn select_cell_json(&self, request_json: &str) -> Result<String> {
        let request: SelectCellRequest = serde_json::from_str(request_json)?;
        Ok(serde_json::to_string(&self.select_cell(&request)?)?)
    }

    pub fn heatmap_json(&self, request_json: &str) -> Result<String> {
        let request: HeatmapRequest = serde_json::from_str(request_json)?;
        Ok(serde_json::to_string(&self.heatmap(&request)?)?)
    }

    fn analyze(
        &self,
        a: &VariableInput,
        b: &VariableInput,
        today: Option<NaiveDate>,
    ) -> Result<AnalysisResult> {
        let today = resolve_today(today);
        let daily_a = SeriesNormalizer::normalize(&a.samples, today)?;
        let daily_b = SeriesNormalizer::normalize(&b.samples, today)?;
        let (values_a, values_b) = align_by_date(&daily_a, &daily_b);

        let series_a = TypedSeries::new(a.kind, values_a)
            .with_label(a.label.clone())
            .with_coding(a.coding);
        let series_b = TypedSeries::new(b.kind, values_b)
            .with_label(b.label.clone())
            .with_coding(b.coding);
        PairAnalyzer::analyze(&series_a, &series_b, &self.config)
    }
}

/// Values of both series on the dates they share, in ascending date order
pub fn align_by_date(a: &[DailyValue], b: &[DailyValue]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let by_date: HashMap<NaiveDate, Option<f64>> = b.iter().map(|d| (d.date, d.value)).collect();
    let mut dates: Vec<&DailyValue> = a.iter().filter(|d| by_date.contains_key(&d.date)).collect();
    dates.sort_by_key(|d| d.date);

    let aligned: (Vec<_>, Vec<_>) = dates
        .into_iter()
        .map(|d| (d.value, by_date.get(&d.date).copied().flatten()))
        .unzip();
    tracing::debug!(left = a.len(), right = b.len(), shared = aligned.0.len(), "aligned series");
    aligned
}

fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

/// Trend view from a JSON request, default configuration
pub fn trend_to_json(request_json: &str) -> Result<String> {
    InsightEngine::default().trend_json(request_json)
}

/// Relationship view from a JSON request, default configuration
pub fn relationship_to_json(request_json: &str) -> Result<String> {
    InsightEngine::default().relationship_json(request_json)
}

/// Cell drill-down from a JSON request, default configuration
pub fn select_cell_to_json(request_json: &str) -> Result<String> {
    InsightEngine::default().select_cell_json(request_json)
}

/// Weekly heatmap from a JSON request, default configuration
pub fn heatmap_to_json(request_json: &str) -> Result<String> {
    InsightEngine::default().heatmap_json(request_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EffectTier, HeatCell, Method, TimeSpanTier};
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Storage-style samples starting at `start`, one per value
    fn samples(start: NaiveDate, values: &[f64]) -> Vec<Sample> {
        start
            .iter_days()
            .zip(values)
            .map(|(date, value)| Sample::new(date.format("%-d.%-m.%Y").to_string(), *value))
            .collect()
    }

    fn sample_relationship_json() -> String {
        r#"{
            "a": {
                "label": "workout",
                "kind": "boolean",
                "samples": [
                    {"date": "1.3.2024", "value": 1},
                    {"date": "2.3.2024", "value": 1},
                    {"date": "3.3.2024", "value": 0},
                    {"date": "4.3.2024", "value": 0},
                    {"date": "5.3.2024", "value": 1},
                    {"date": "6.3.2024", "value": -1}
                ]
            },
            "b": {
                "label": "good sleep",
                "kind": "boolean",
                "samples": [
                    {"date": "1.3.2024", "value": 1},
                    {"date": "2.3.2024", "value": 1},
                    {"date": "3.3.2024", "value": 0},
                    {"date": "4.3.2024", "value": 1},
                    {"date": "5.3.2024", "value": 1},
                    {"date": "6.3.2024", "value": 0}
                ]
            },
            "today": "2024-03-06"
        }"#
        .to_string()
    }

    #[test]
    fn test_trend_scenario_days() {
        let variable = VariableInput::new(
            "meditated",
            VariableType::Boolean,
            samples(day(2024, 3, 1), &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0]),
        );
        let request = TrendRequest {
            variable,
            today: Some(day(2024, 3, 10)),
            range: None,
        };
        let report = InsightEngine::default().trend(&request).unwrap();

        assert_eq!(report.days, 10);
        assert_eq!(report.series.tier, TimeSpanTier::Days);
        assert_eq!(
            report.series.buckets,
            vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(report.summary.unwrap().mean, 0.7);
    }

    #[test]
    fn test_trend_scenario_months() {
        let values: Vec<f64> = (0..90).map(|i| (i % 5) as f64).collect();
        let request = TrendRequest {
            variable: VariableInput::new(
                "steps",
                VariableType::Numeric,
                samples(day(2024, 1, 2), &values),
            ),
            today: Some(day(2024, 3, 31)),
            range: None,
        };
        let report = InsightEngine::default().trend(&request).unwrap();
        assert_eq!(report.series.tier, TimeSpanTier::Months);
        assert_eq!(report.series.buckets.len(), 3);
    }

    #[test]
    fn test_trend_range_slice() {
        let request = TrendRequest {
            variable: VariableInput::new(
                "mood",
                VariableType::Ordinal,
                samples(day(2024, 3, 1), &[1.0, 2.0, 3.0, 4.0, 5.0]),
            ),
            today: Some(day(2024, 3, 5)),
            range: Some((1, 3)),
        };
        let report = InsightEngine::default().trend(&request).unwrap();
        assert_eq!(report.days, 3);
        assert_eq!(report.start_date, day(2024, 3, 2));
        assert_eq!(report.end_date, day(2024, 3, 4));
        assert_eq!(report.series.buckets, vec![2.0, 3.0, 4.0]);

        let out_of_range = TrendRequest {
            range: Some((10, 12)),
            ..request
        };
        assert!(matches!(
            InsightEngine::default().trend(&out_of_range),
            Err(AnalysisError::EmptyInput)
        ));
    }

    #[test]
    fn test_align_by_date_inner_join() {
        let today = day(2024, 3, 3);
        let a = SeriesNormalizer::normalize(&samples(day(2024, 3, 1), &[1.0, 2.0, 3.0]), today)
            .unwrap();
        let b = SeriesNormalizer::normalize(&samples(day(2024, 3, 2), &[5.0, -1.0]), today)
            .unwrap();
        let (left, right) = align_by_date(&a, &b);
        assert_eq!(left, vec![Some(2.0), Some(3.0)]);
        assert_eq!(right, vec![Some(5.0), None]);
    }

    #[test]
    fn test_relationship_json_round_trip() {
        let output = relationship_to_json(&sample_relationship_json()).unwrap();
        let report: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(report["label_a"], "workout");
        assert_eq!(report["analysis"]["method"], "phi");
        // day 6 has no workout entry, so five pairs remain
        assert_eq!(report["analysis"]["sample_count"], 5);
        assert!(report["recommendation"]["hypothesis"].as_str().is_some());
    }

    #[test]
    fn test_relationship_report() {
        let request: RelationshipRequest =
            serde_json::from_str(&sample_relationship_json()).unwrap();
        let report = InsightEngine::default().relationship(&request).unwrap();
        // TT=3 TF=0 FT=1 FF=1: phi = 3 / sqrt(3*2*4*1)
        assert_eq!(report.analysis.method, Method::Phi);
        assert!((report.analysis.statistic - 3.0 / 24f64.sqrt()).abs() < 1e-9);
        assert_eq!(report.analysis.effect_tier, EffectTier::Strong);
        assert!(report.recommendation.hypothesis.starts_with("workout is strongly associated"));
    }

    #[test]
    fn test_select_cell() {
        let relationship: RelationshipRequest =
            serde_json::from_str(&sample_relationship_json()).unwrap();
        let request = SelectCellRequest {
            a: relationship.a,
            b: relationship.b,
            row: 0,
            col: 0,
            today: relationship.today,
        };
        let report = InsightEngine::default().select_cell(&request).unwrap();
        assert_eq!(report.cell.count, 3);
        assert_eq!(report.cell.percent_of_total, 60.0);
        assert_eq!(
            report.description,
            "On 60.0% of logged days (n=3), workout was yes and good sleep was yes."
        );
    }

    #[test]
    fn test_select_cell_needs_categorical_pair() {
        let request = SelectCellRequest {
            a: VariableInput::new(
                "steps",
                VariableType::Numeric,
                samples(day(2024, 3, 1), &[1.0, 5.0, 3.0]),
            ),
            b: VariableInput::new(
                "kcal",
                VariableType::Numeric,
                samples(day(2024, 3, 1), &[2.0, 4.0, 9.0]),
            ),
            row: 0,
            col: 0,
            today: Some(day(2024, 3, 3)),
        };
        assert!(matches!(
            InsightEngine::default().select_cell(&request),
            Err(AnalysisError::UnsupportedTypePair(_, _))
        ));
    }

    #[test]
    fn test_heatmap() {
        let request = HeatmapRequest {
            variable: VariableInput::new(
                "walk",
                VariableType::Boolean,
                samples(day(2024, 3, 9), &[1.0, 0.0, -1.0, 1.0, 1.0]),
            ),
            width_px: 400.0,
            today: Some(day(2024, 3, 13)),
        };
        let grid = InsightEngine::default().heatmap(&request).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1][3], HeatCell::Value(1.0));
        assert_eq!(grid[1][1], HeatCell::Missing);
        assert_eq!(grid[0][6], HeatCell::Value(1.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            min_paired_samples: 1,
            ..Default::default()
        };
        assert!(matches!(
            InsightEngine::new(config),
            Err(AnalysisError::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            trend_to_json("not valid json"),
            Err(AnalysisError::JsonError(_))
        ));
    }
}
