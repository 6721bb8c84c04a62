//! Stock-level analyzer.
//!
//! Scores each effective position on its own annualized volatility, its
//! portfolio weight (a concentration proxy: a heavy position in one name
//! is risky even when the name itself is calm), and a loss severity
//! term, then classifies with the same threshold table as the portfolio
//! score.

use crate::config::StockScoreConfig;
use crate::error::{ensure_finite, Result};
use crate::portfolio::ValuedPosition;
use crate::report::RiskLevel;

// ============================================================================
// Score
// ============================================================================

/// Per-position score result.
#[derive(Debug, Clone, Copy)]
pub struct StockScore {
    /// Risk score in [1, 10]
    pub risk_score: f64,
    /// Level from the shared threshold table
    pub risk_level: RiskLevel,
    /// Normalized loss severity term that entered the score
    pub loss_severity: f64,
}

// ============================================================================
// Analyzer
// ============================================================================

/// Stock-level analyzer.
pub struct StockAnalyzer {
    config: StockScoreConfig,
    volatility_ceiling: f64,
}

impl StockAnalyzer {
    pub fn new(config: StockScoreConfig, volatility_ceiling: f64) -> Self {
        Self {
            config,
            volatility_ceiling,
        }
    }

    /// Score one position.
    ///
    /// `stock_raw = w_vol*min(vol/ceiling, 1) + w_conc*weight +
    /// w_loss*loss_severity`, scaled to [1, 10] like the portfolio score.
    /// Monotonically non-decreasing in volatility and in weight.
    pub fn score(&self, position: &ValuedPosition, annualized_volatility: f64) -> Result<StockScore> {
        let symbol = position.position.symbol.as_str();

        let vol_term = (annualized_volatility / self.volatility_ceiling).clamp(0.0, 1.0);
        let loss_severity = self.loss_severity(position.gain_loss_percent());

        let raw = self.config.volatility_weight * vol_term
            + self.config.concentration_weight * position.weight
            + self.config.loss_weight * loss_severity;
        let risk_score =
            ensure_finite(1.0 + 9.0 * raw, "stock_score", Some(symbol))?.clamp(1.0, 10.0);

        Ok(StockScore {
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            loss_severity,
        })
    }

    /// Normalized drawdown kicker: 0 at break-even or better, saturating
    /// at 1.0 once the loss reaches the configured floor.
    fn loss_severity(&self, gain_loss_percent: f64) -> f64 {
        if gain_loss_percent >= 0.0 {
            0.0
        } else {
            (-gain_loss_percent / self.config.loss_severity_floor_pct).clamp(0.0, 1.0)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
