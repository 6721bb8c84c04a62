//! Concentration calculator.
//!
//! Herfindahl-Hirschman Index over position weights. Pure function of
//! the weights; no price-history dependency.

use serde::{Deserialize, Serialize};

// ============================================================================
// Metrics
// ============================================================================

/// Concentration result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConcentrationMetrics {
    /// Raw HHI: Σ weight², in [1/n, 1] for n positions
    pub hhi: f64,
    /// Min-max scaled against the diversified baseline:
    /// `(HHI - 1/n) / (1 - 1/n)`, 0 for equal-weight, 1 for a single
    /// holding (defined as 1.0 when n = 1)
    pub diversification: f64,
}

// ============================================================================
// Calculation
// ============================================================================

/// Compute concentration metrics from position weights.
///
/// Weights that do not sum to 1 are defensively re-normalized before
/// squaring.
pub fn concentration(weights: &[f64]) -> ConcentrationMetrics {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() || total <= 0.0 {
        return ConcentrationMetrics {
            hhi: 0.0,
            diversification: 0.0,
        };
    }

    let hhi: f64 = weights.iter().map(|w| (w / total).powi(2)).sum();

    let n = weights.len() as f64;
    let diversification = if weights.len() == 1 {
        1.0
    } else {
        let floor = 1.0 / n;
        ((hhi - floor) / (1.0 - floor)).clamp(0.0, 1.0)
    };

    ConcentrationMetrics {
        hhi,
        diversification,
    }
}

// ============================================================================
// Tests
// ============================================================================
