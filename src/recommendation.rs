//! Recommendation text
//!
//! Maps an [`AnalysisResult`] to a hypothesis and a recommendation sentence.
//! Wording is associative only: results say two variables move together, never
//! that one drives the other.

use crate::types::{AnalysisResult, Direction, EffectTier, Recommendation, SelectedCell};

const OUTLIER_CAUTION: &str = "A few unusual values were logged, so treat this with some caution.";

/// Composer for relationship panel text
pub struct RecommendationComposer;

impl RecommendationComposer {
    /// Build hypothesis and recommendation for a pair result
    pub fn compose(result: &AnalysisResult, label_a: &str, label_b: &str) -> Recommendation {
        if result.effect_tier == EffectTier::None {
            return Recommendation {
                hypothesis: format!("No relationship was found between {label_a} and {label_b}."),
                recommendation: format!(
                    "Keep logging {label_a} and {label_b}; more data may reveal a pattern."
                ),
            };
        }

        let change = match result.direction {
            Direction::Positive => "an increase",
            Direction::Negative => "a decrease",
        };
        let strength = match result.effect_tier {
            EffectTier::Weak => "weakly",
            EffectTier::Moderate => "moderately",
            EffectTier::Strong => "strongly",
            EffectTier::VeryStrong | EffectTier::None => "very strongly",
        };

        let mut hypothesis =
            format!("{label_a} is {strength} associated with {change} in {label_b}.");
        if result.has_outliers() {
            hypothesis.push(' ');
            hypothesis.push_str(OUTLIER_CAUTION);
        }

        let mut recommendation =
            tier_advice(result.effect_tier, result.direction, label_a, label_b);
        if let Some(conditional) = &result.conditional {
            let diff = conditional.diff_percent_points;
            if diff != 0 {
                let comparison = if diff > 0 { "more" } else { "less" };
                recommendation.push_str(&format!(
                    " On days with {label_a}, {label_b} was logged {} percentage points \
                     {comparison} often than on days without it.",
                    diff.abs()
                ));
            }
        }

        tracing::trace!(
            tier = ?result.effect_tier,
            direction = ?result.direction,
            "composed recommendation"
        );

        Recommendation {
            hypothesis,
            recommendation,
        }
    }

    /// Sentence for a cell the user tapped in a contingency view
    pub fn describe_selection(cell: &SelectedCell, label_a: &str, label_b: &str) -> String {
        format!(
            "On {:.1}% of logged days (n={}), {label_a} was {} and {label_b} was {}.",
            cell.percent_of_total, cell.count, cell.category_a, cell.category_b
        )
    }
}

fn tier_advice(tier: EffectTier, direction: Direction, label_a: &str, label_b: &str) -> String {
    let more_or_less = match direction {
        Direction::Positive => "more",
        Direction::Negative => "less",
    };
    match tier {
        EffectTier::None | EffectTier::Weak => format!(
            "The pattern between {label_a} and {label_b} is faint. \
             Keep logging both before drawing conclusions."
        ),
        EffectTier::Moderate => format!(
            "Pay attention to {label_a}: days with more of it tended to come with \
             {more_or_less} {label_b}. See whether the pattern holds over the next weeks."
        ),
        EffectTier::Strong => format!(
            "{label_a} and {label_b} show a clear pattern in your data. \
             Consider experimenting with {label_a} while you keep tracking {label_b}."
        ),
        EffectTier::VeryStrong => format!(
            "{label_a} and {label_b} move together very consistently, with {more_or_less} \
             {label_b} alongside more {label_a}. \
             Experimenting with {label_a} while tracking {label_b} is worthwhile."
        ),
    }
}
