//! Engine configuration
//!
//! Display and analysis knobs that callers may tune. The effect breakpoints
//! and the tier length thresholds are fixed and live next to the code that
//! uses them.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Default maximum number of visible axis labels
pub const DEFAULT_MAX_LABELS: usize = 5;

/// Default minimum number of paired samples for an analysis
pub const DEFAULT_MIN_PAIRED_SAMPLES: usize = 3;

/// Default outlier threshold in standard deviations
pub const DEFAULT_OUTLIER_SIGMA: f64 = 2.0;

/// Default number of ranked contingency cells
pub const DEFAULT_TOP_CELLS: usize = 3;

/// Language used for month and weekday labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
}

impl Locale {
    /// Upper-case month abbreviations, January first
    pub fn month_abbreviations(&self) -> [&'static str; 12] {
        match self {
            Locale::En => [
                "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
            ],
            Locale::De => [
                "JAN", "FEB", "MÄR", "APR", "MAI", "JUN", "JUL", "AUG", "SEP", "OKT", "NOV", "DEZ",
            ],
        }
    }

    /// Short weekday names, Sunday first
    pub fn weekday_names(&self) -> [&'static str; 7] {
        match self {
            Locale::En => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            Locale::De => ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"],
        }
    }
}

/// Tunable engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Labels kept before thinning kicks in
    pub max_labels: usize,
    /// Paired samples required before a pair is analysed
    pub min_paired_samples: usize,
    /// Distance from the mean, in standard deviations, that marks an outlier
    pub outlier_sigma: f64,
    /// Cells returned by the contingency ranking
    pub top_cells: usize,
    /// Width of one heatmap column in pixels
    pub heatmap_cell_px: f64,
    /// Fraction of the screen width available to the heatmap
    pub heatmap_fill_ratio: f64,
    pub locale: Locale,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_labels: DEFAULT_MAX_LABELS,
            min_paired_samples: DEFAULT_MIN_PAIRED_SAMPLES,
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
            top_cells: DEFAULT_TOP_CELLS,
            heatmap_cell_px: 25.0,
            heatmap_fill_ratio: 0.8,
            locale: Locale::default(),
        }
    }
}

impl EngineConfig {
    /// Check that every knob is in a usable range
    pub fn validate(&self) -> Result<()> {
        if self.max_labels < 2 {
            return Err(AnalysisError::ConfigError(format!(
                "max_labels must be at least 2, got {}",
                self.max_labels
            )));
        }
        if self.min_paired_samples < DEFAULT_MIN_PAIRED_SAMPLES {
            return Err(AnalysisError::ConfigError(format!(
                "min_paired_samples must be at least {}, got {}",
                DEFAULT_MIN_PAIRED_SAMPLES, self.min_paired_samples
            )));
        }
        if !(self.outlier_sigma > 0.0) {
            return Err(AnalysisError::ConfigError(
                "outlier_sigma must be positive".to_string(),
            ));
        }
        if !(self.heatmap_cell_px > 0.0) {
            return Err(AnalysisError::ConfigError(
                "heatmap_cell_px must be positive".to_string(),
            ));
        }
        if !(self.heatmap_fill_ratio > 0.0 && self.heatmap_fill_ratio <= 1.0) {
            return Err(AnalysisError::ConfigError(
                "heatmap_fill_ratio must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_labels, 5);
        assert_eq!(config.min_paired_samples, 3);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"locale": "de", "max_labels": 7}"#).unwrap();
        assert_eq!(config.locale, Locale::De);
        assert_eq!(config.max_labels, 7);
        assert_eq!(config.top_cells, DEFAULT_TOP_CELLS);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"min_paired_samples": 2}"#),
            Err(AnalysisError::ConfigError(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"heatmap_fill_ratio": 1.5}"#),
            Err(AnalysisError::ConfigError(_))
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(AnalysisError::JsonError(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig {
            locale: Locale::De,
            ..Default::default()
        };
        let loaded = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, loaded);
    }
}
