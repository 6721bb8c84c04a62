//! Volatility calculator.
//!
//! Per-symbol annualized volatility (population standard deviation of
//! daily returns × √252) and the exposure-weighted portfolio aggregate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::config::VolatilityConfig;
use crate::data::ReturnSeries;
use crate::portfolio::ValuedPosition;

// ============================================================================
// Metrics
// ============================================================================

/// One symbol's annualized volatility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolVolatility {
    pub symbol: String,
    /// Annualized volatility as a decimal (0.25 = 25%)
    pub annualized: f64,
    /// True when the neutral default was substituted for missing history
    pub from_default: bool,
}

/// Portfolio-level volatility result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityMetrics {
    /// Per-symbol volatilities, in position order
    pub per_symbol: Vec<SymbolVolatility>,
    /// Weighted average annualized volatility (weights = position weights)
    pub portfolio_annualized: f64,
    /// Portfolio volatility scaled against the calibration ceiling,
    /// clamped to [0, 1]
    pub normalized: f64,
}

// ============================================================================
// Calculator
// ============================================================================

/// Volatility calculator.
pub struct VolatilityCalculator {
    config: VolatilityConfig,
}

impl VolatilityCalculator {
    pub fn new(config: VolatilityConfig) -> Self {
        Self { config }
    }

    /// Annualized volatility of one return series, or None when the
    /// series has insufficient data.
    pub fn annualized(&self, returns: &ReturnSeries) -> Option<f64> {
        if !returns.is_sufficient() {
            return None;
        }
        let values = returns.values();
        let daily = values.iter().population_std_dev();
        Some(daily * self.config.annualization_factor())
    }

    /// Compute per-symbol and portfolio volatility.
    ///
    /// Weights are current position weights, not quantities: a risk
    /// contribution scales with exposure. Symbols with insufficient
    /// history contribute the configured neutral volatility.
    pub fn portfolio(
        &self,
        positions: &[ValuedPosition],
        returns: &HashMap<String, ReturnSeries>,
    ) -> VolatilityMetrics {
        let mut per_symbol = Vec::with_capacity(positions.len());
        let mut portfolio_annualized = 0.0;

        for position in positions {
            let symbol = &position.position.symbol;
            let (annualized, from_default) = match returns.get(symbol).and_then(|r| self.annualized(r))
            {
                Some(vol) => (vol, false),
                None => {
                    tracing::debug!(
                        symbol = %symbol,
                        neutral = self.config.neutral_volatility,
                        "insufficient history, substituting neutral volatility"
                    );
                    (self.config.neutral_volatility, true)
                }
            };
            portfolio_annualized += position.weight * annualized;
            per_symbol.push(SymbolVolatility {
                symbol: symbol.clone(),
                annualized,
                from_default,
            });
        }

        let normalized = (portfolio_annualized / self.config.ceiling).clamp(0.0, 1.0);

        VolatilityMetrics {
            per_symbol,
            portfolio_annualized,
            normalized,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
