//! Risk aggregator.
//!
//! Combines the three normalized components into the overall risk score:
//! `raw = w_vol*volatility + w_conc*concentration + w_corr*correlation`,
//! scaled to [1, 10] via `1 + 9*raw` and classified without rounding.

use crate::config::{AssessmentBands, RiskConfig, ScoreWeights};
use crate::error::{ensure_finite, Result};
use crate::metrics::{ConcentrationMetrics, CorrelationMetrics, VolatilityMetrics};
use crate::report::{FactorAssessment, FactorAssessments, RiskBreakdown, RiskLevel};

// ============================================================================
// Aggregator
// ============================================================================

/// Combines component metrics into the portfolio risk breakdown.
pub struct RiskAggregator {
    weights: ScoreWeights,
    bands: AssessmentBands,
}

impl RiskAggregator {
    pub fn new(config: &RiskConfig) -> Self {
        Self {
            weights: config.score_weights.clone(),
            bands: config.assessment.clone(),
        }
    }

    /// Aggregate the three component results into a breakdown.
    ///
    /// Every component is guarded against non-finite values before it
    /// enters the weighted sum.
    pub fn aggregate(
        &self,
        volatility: &VolatilityMetrics,
        concentration: &ConcentrationMetrics,
        correlation: &CorrelationMetrics,
    ) -> Result<RiskBreakdown> {
        let vol = ensure_finite(volatility.normalized, "volatility", None)?;
        let conc = ensure_finite(concentration.hhi, "concentration", None)?;
        let corr = ensure_finite(correlation.correlation_risk, "correlation", None)?;

        let raw = self.weights.volatility * vol
            + self.weights.concentration * conc
            + self.weights.correlation * corr;
        let risk_score = ensure_finite(1.0 + 9.0 * raw, "aggregation", None)?.clamp(1.0, 10.0);
        let risk_level = RiskLevel::from_score(risk_score);

        tracing::debug!(
            volatility = vol,
            concentration = conc,
            correlation = corr,
            risk_score,
            level = %risk_level,
            "aggregated portfolio risk"
        );

        Ok(RiskBreakdown {
            volatility: vol,
            annualized_volatility: volatility.portfolio_annualized,
            concentration: conc,
            diversification: concentration.diversification,
            correlation_risk: corr,
            risk_score,
            risk_level,
            interpretation: risk_level.interpretation().to_string(),
            assessments: self.assess(volatility, concentration, correlation),
        })
    }

    fn assess(
        &self,
        volatility: &VolatilityMetrics,
        concentration: &ConcentrationMetrics,
        correlation: &CorrelationMetrics,
    ) -> FactorAssessments {
        let vol_rating = self.bands.volatility.classify(volatility.normalized);
        let conc_rating = self.bands.concentration.classify(concentration.hhi);
        let corr_rating = self.bands.correlation.classify(correlation.correlation_risk);

        FactorAssessments {
            volatility: FactorAssessment {
                value: volatility.normalized,
                assessment: vol_rating,
                description: format!(
                    "Portfolio volatility is {} at {:.1}% annualized",
                    vol_rating,
                    volatility.portfolio_annualized * 100.0
                ),
            },
            concentration: FactorAssessment {
                value: concentration.hhi,
                assessment: conc_rating,
                description: format!(
                    "Portfolio concentration is {} (HHI: {:.3})",
                    conc_rating, concentration.hhi
                ),
            },
            correlation: FactorAssessment {
                value: correlation.correlation_risk,
                assessment: corr_rating,
                description: format!(
                    "Asset correlation is {} at {:.2}",
                    corr_rating, correlation.correlation_risk
                ),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
