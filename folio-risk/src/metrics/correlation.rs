//! Correlation calculator.
//!
//! Pairwise Pearson correlation over each pair's overlapping dates; no
//! global date alignment is required. The portfolio correlation risk is
//! the weight-product-weighted average of the upper-triangle pairs,
//! mapped from [-1, 1] to [0, 1] via `(corr + 1) / 2` so that
//! anti-correlated pairs lower the risk term.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::config::CorrelationConfig;
use crate::data::ReturnSeries;
use crate::portfolio::ValuedPosition;

// ============================================================================
// Metrics
// ============================================================================

/// One valid upper-triangle pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairCorrelation {
    pub symbol_a: String,
    pub symbol_b: String,
    /// Pearson coefficient in [-1, 1]
    pub coefficient: f64,
    /// Overlapping returns the coefficient was computed from
    pub overlap: usize,
}

/// Portfolio-level correlation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMetrics {
    /// Symbols in position order, indexing the matrix
    pub symbols: Vec<String>,
    /// n×n Pearson matrix; None where a pair is invalid
    /// (too little overlap or a zero-variance leg)
    pub matrix: Vec<Vec<Option<f64>>>,
    /// Valid upper-triangle pairs
    pub pairs: Vec<PairCorrelation>,
    /// Weighted average of `(corr + 1) / 2` over valid pairs, weights =
    /// product of the two positions' portfolio weights; the neutral
    /// constant when no valid pair exists
    pub correlation_risk: f64,
    /// True when the neutral constant was reported
    pub from_default: bool,
}

// ============================================================================
// Calculator
// ============================================================================

/// Correlation calculator.
pub struct CorrelationCalculator {
    config: CorrelationConfig,
}

impl CorrelationCalculator {
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    /// Pearson correlation of two return series over their overlapping
    /// dates. None when the overlap is too short or either leg has zero
    /// variance.
    pub fn pair(&self, a: &ReturnSeries, b: &ReturnSeries) -> Option<(f64, usize)> {
        let b_by_date: HashMap<NaiveDate, f64> =
            b.returns.iter().map(|r| (r.date, r.value)).collect();

        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for r in &a.returns {
            if let Some(&y) = b_by_date.get(&r.date) {
                xs.push(r.value);
                ys.push(y);
            }
        }

        if xs.len() < self.config.min_overlap {
            return None;
        }

        let sx = xs.iter().population_std_dev();
        let sy = ys.iter().population_std_dev();
        if !sx.is_finite() || !sy.is_finite() || sx == 0.0 || sy == 0.0 {
            return None;
        }

        let cov = xs.iter().population_covariance(ys.iter());
        let coefficient = (cov / (sx * sy)).clamp(-1.0, 1.0);
        Some((coefficient, xs.len()))
    }

    /// Compute the pairwise matrix and the portfolio correlation risk.
    pub fn portfolio(
        &self,
        positions: &[ValuedPosition],
        returns: &HashMap<String, ReturnSeries>,
    ) -> CorrelationMetrics {
        let n = positions.len();
        let symbols: Vec<String> = positions.iter().map(|p| p.position.symbol.clone()).collect();
        let mut matrix: Vec<Vec<Option<f64>>> = vec![vec![None; n]; n];
        let mut pairs = Vec::new();

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for i in 0..n {
            matrix[i][i] = Some(1.0);
            for j in (i + 1)..n {
                let pair = match (returns.get(&symbols[i]), returns.get(&symbols[j])) {
                    (Some(a), Some(b)) => self.pair(a, b),
                    _ => None,
                };
                if let Some((coefficient, overlap)) = pair {
                    matrix[i][j] = Some(coefficient);
                    matrix[j][i] = Some(coefficient);

                    // Dominant positions' mutual correlation matters most
                    let pair_weight = positions[i].weight * positions[j].weight;
                    weighted_sum += pair_weight * (coefficient + 1.0) / 2.0;
                    weight_total += pair_weight;

                    pairs.push(PairCorrelation {
                        symbol_a: symbols[i].clone(),
                        symbol_b: symbols[j].clone(),
                        coefficient,
                        overlap,
                    });
                }
            }
        }

        let (correlation_risk, from_default) = if weight_total > 0.0 {
            ((weighted_sum / weight_total).clamp(0.0, 1.0), false)
        } else {
            tracing::debug!(
                neutral = self.config.neutral_risk,
                "no valid correlation pair, reporting neutral risk"
            );
            (self.config.neutral_risk, true)
        };

        CorrelationMetrics {
            symbols,
            matrix,
            pairs,
            correlation_risk,
            from_default,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
