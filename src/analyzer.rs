//! Pair analysis
//!
//! This module selects and runs the statistical procedure for two typed
//! series:
//! - Boolean x Boolean: phi coefficient over the 2x2 table plus conditional
//!   probabilities
//! - Any pair with one Boolean: point-biserial (Pearson with 0/1)
//! - Ordinal / Numeric pairs: Pearson correlation
//!
//! The type pair is ordered once (Boolean < Ordinal < Numeric) so mixed pairs
//! share one code path regardless of which side the caller put them on. All
//! outputs are reported in the caller's A/B orientation.

use crate::config::EngineConfig;
use crate::contingency::{categories_for, category_of, ContingencyTable};
use crate::error::{AnalysisError, Result};
use crate::stats::{count_outliers, is_constant, linear_regression, mean, pearson, percent_of};
use crate::types::{
    AnalysisResult, CategoryMean, ConditionalDifference, Direction, EffectTier, Method,
    TypedSeries, VariableType,
};

/// Unordered type pair after canonical ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypePair {
    BooleanBoolean,
    BooleanOrdinal,
    BooleanNumeric,
    OrdinalOrdinal,
    OrdinalNumeric,
    NumericNumeric,
}

impl TypePair {
    fn of(a: VariableType, b: VariableType) -> Result<Self> {
        let (low, high) = if a.rank() <= b.rank() { (a, b) } else { (b, a) };
        use VariableType::*;
        match (low, high) {
            (Boolean, Boolean) => Ok(TypePair::BooleanBoolean),
            (Boolean, Ordinal) => Ok(TypePair::BooleanOrdinal),
            (Boolean, Numeric) => Ok(TypePair::BooleanNumeric),
            (Ordinal, Ordinal) => Ok(TypePair::OrdinalOrdinal),
            (Ordinal, Numeric) => Ok(TypePair::OrdinalNumeric),
            (Numeric, Numeric) => Ok(TypePair::NumericNumeric),
            _ => Err(AnalysisError::UnsupportedTypePair(a, b)),
        }
    }

    fn method(self) -> Method {
        match self {
            TypePair::BooleanBoolean => Method::Phi,
            TypePair::BooleanOrdinal | TypePair::BooleanNumeric => Method::PointBiserial,
            TypePair::OrdinalOrdinal | TypePair::OrdinalNumeric | TypePair::NumericNumeric => {
                Method::Pearson
            }
        }
    }

    fn is_categorical(self) -> bool {
        matches!(
            self,
            TypePair::BooleanBoolean | TypePair::BooleanOrdinal | TypePair::OrdinalOrdinal
        )
    }
}

/// Analyzer for two typed series
pub struct PairAnalyzer;

impl PairAnalyzer {
    /// Analyze the relationship between `a` and `b`
    ///
    /// Days where either variable is missing are dropped before any
    /// statistic is computed.
    pub fn analyze(
        a: &TypedSeries,
        b: &TypedSeries,
        config: &EngineConfig,
    ) -> Result<AnalysisResult> {
        let pair = TypePair::of(a.kind, b.kind)?;

        if a.len() != b.len() {
            return Err(AnalysisError::LengthMismatch {
                left: a.len(),
                right: b.len(),
            });
        }

        let (xa, xb) = paired_values(a, b)?;
        if xa.len() < config.min_paired_samples {
            return Err(AnalysisError::InsufficientData {
                required: config.min_paired_samples,
                actual: xa.len(),
            });
        }

        let contingency = if pair.is_categorical() {
            // canonical values are already on scale, so only the type can fail here
            let table = ContingencyTable::build(a.kind, &xa, b.kind, &xb)
                .ok_or(AnalysisError::UnsupportedTypePair(a.kind, b.kind))?;
            Some(table)
        } else {
            None
        };

        let (statistic, slope, direction, conditional) = match pair {
            TypePair::BooleanBoolean => {
                let table = contingency
                    .as_ref()
                    .ok_or(AnalysisError::UnsupportedTypePair(a.kind, b.kind))?;
                let (phi, conditional) = phi_with_conditional(table, a, b)?;
                let direction =
                    Direction::from_sign(conditional.p_b_given_a - conditional.p_b_given_not_a);
                (phi, None, direction, Some(conditional))
            }
            _ => {
                let r = pearson(&xa, &xb).ok_or_else(|| zero_variance(&xa, a, b))?;
                let fit = linear_regression(&xa, &xb).ok_or_else(|| zero_variance(&xa, a, b))?;
                (r, Some(fit.slope), Direction::from_sign(fit.slope), None)
            }
        };

        let outlier_count_a = outliers_for(a.kind, &xa, config);
        let outlier_count_b = outliers_for(b.kind, &xb, config);

        let category_means = match (a.kind, b.kind) {
            (VariableType::Numeric, other) if other != VariableType::Numeric => {
                Some(category_means(other, &xb, &xa))
            }
            (other, VariableType::Numeric) if other != VariableType::Numeric => {
                Some(category_means(other, &xa, &xb))
            }
            _ => None,
        };

        let top_cells = contingency
            .as_ref()
            .map(|table| table.top_cells(config.top_cells))
            .unwrap_or_default();

        let effect_tier = EffectTier::from_statistic(statistic);
        tracing::debug!(
            pair = ?pair,
            n = xa.len(),
            statistic,
            tier = ?effect_tier,
            direction = ?direction,
            "analyzed pair"
        );

        Ok(AnalysisResult {
            kind_a: a.kind,
            kind_b: b.kind,
            method: pair.method(),
            statistic,
            effect_tier,
            direction,
            slope,
            sample_count: xa.len(),
            outlier_count_a,
            outlier_count_b,
            contingency,
            top_cells,
            conditional,
            category_means,
        })
    }
}

/// Canonical values for days where both series were logged
fn paired_values(a: &TypedSeries, b: &TypedSeries) -> Result<(Vec<f64>, Vec<f64>)> {
    let va = a.canonical_values()?;
    let vb = b.canonical_values()?;
    Ok(va
        .into_iter()
        .zip(vb)
        .filter_map(|pair| match pair {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        })
        .unzip())
}

/// Phi coefficient and conditional probabilities of B given A
fn phi_with_conditional(
    table: &ContingencyTable,
    a: &TypedSeries,
    b: &TypedSeries,
) -> Result<(f64, ConditionalDifference)> {
    let (tt, tf, ft, ff) = table
        .boolean_counts()
        .ok_or(AnalysisError::UnsupportedTypePair(a.kind, b.kind))?;

    let a_true = tt + tf;
    let a_false = ft + ff;
    let b_true = tt + ft;
    let b_false = tf + ff;

    if a_true == 0 || a_false == 0 {
        tracing::warn!(variable = a.display_label(), "boolean series never varies");
        return Err(AnalysisError::ZeroVariance(a.display_label().to_string()));
    }
    if b_true == 0 || b_false == 0 {
        tracing::warn!(variable = b.display_label(), "boolean series never varies");
        return Err(AnalysisError::ZeroVariance(b.display_label().to_string()));
    }

    let numerator = (tt * ff) as f64 - (tf * ft) as f64;
    let denominator = ((a_true * a_false) as f64 * (b_true * b_false) as f64).sqrt();
    let phi = (numerator / denominator).clamp(-1.0, 1.0);

    let p_b_given_a = tt as f64 / a_true as f64;
    let p_b_given_not_a = ft as f64 / a_false as f64;
    let conditional = ConditionalDifference {
        p_b_given_a,
        p_b_given_not_a,
        diff_percent_points: ((p_b_given_a - p_b_given_not_a) * 100.0).round() as i64,
    };

    Ok((phi, conditional))
}

fn zero_variance(xa: &[f64], a: &TypedSeries, b: &TypedSeries) -> AnalysisError {
    let constant = if is_constant(xa) { a } else { b };
    tracing::warn!(variable = constant.display_label(), "series has zero variance");
    AnalysisError::ZeroVariance(constant.display_label().to_string())
}

/// Booleans never carry outliers; other kinds use the sigma rule
fn outliers_for(kind: VariableType, values: &[f64], config: &EngineConfig) -> usize {
    match kind {
        VariableType::Boolean => 0,
        _ => count_outliers(values, config.outlier_sigma),
    }
}

/// Mean of `numeric` within each category of `categorical`
fn category_means(kind: VariableType, categorical: &[f64], numeric: &[f64]) -> Vec<CategoryMean> {
    let total = categorical.len();
    categories_for(kind)
        .unwrap_or_default()
        .into_iter()
        .map(|category| {
            let members: Vec<f64> = categorical
                .iter()
                .zip(numeric)
                .filter(|(c, _)| category_of(kind, **c) == Some(category))
                .map(|(_, n)| *n)
                .collect();
            CategoryMean {
                category,
                mean: mean(&members),
                count: members.len(),
                share_percent: percent_of(members.len(), total),
            }
        })
        .collect()
}
