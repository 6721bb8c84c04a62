//! Output model for the risk engine.
//!
//! Everything downstream consumers see is defined here: the portfolio
//! breakdown, per-stock analyses, recommendations, and data-quality
//! warnings. All types are serde-serializable and never mutated after
//! creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::portfolio::UserProfile;

// ============================================================================
// Risk Level
// ============================================================================

/// Discrete risk classification derived from the numeric risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    Elevated,
    High,
}

impl RiskLevel {
    /// Classify a risk score on the [1, 10] scale.
    ///
    /// Boundaries are exact and inclusive on the lower side of each band:
    /// ≤3 LOW, (3, 5] MODERATE, (5, 7] ELEVATED, >7 HIGH. The score is
    /// classified at full precision; rounding is a presentation concern.
    pub fn from_score(score: f64) -> Self {
        if score <= 3.0 {
            Self::Low
        } else if score <= 5.0 {
            Self::Moderate
        } else if score <= 7.0 {
            Self::Elevated
        } else {
            Self::High
        }
    }

    /// Templated interpretation string for this level.
    pub fn interpretation(&self) -> &'static str {
        match self {
            Self::Low => "Your portfolio has low risk. It is well-diversified with stable assets.",
            Self::Moderate => {
                "Your portfolio has moderate risk. Consider monitoring for concentration issues."
            }
            Self::Elevated => {
                "Your portfolio has elevated risk. You may want to consider rebalancing."
            }
            Self::High => "Your portfolio has high risk. Immediate attention may be needed.",
        }
    }

    /// Check if this level counts toward the high-risk position tally.
    pub fn is_high_risk(&self) -> bool {
        matches!(self, Self::Elevated | Self::High)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Elevated => write!(f, "ELEVATED"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// Per-position action signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Hold,
    Reduce,
    Sell,
}

impl Recommendation {
    /// Check if this recommendation counts toward the sell tally.
    pub fn is_sell_signal(&self) -> bool {
        matches!(self, Self::Sell | Self::Reduce)
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold => write!(f, "HOLD"),
            Self::Reduce => write!(f, "REDUCE"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Confidence attached to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

// ============================================================================
// Factor Assessments
// ============================================================================

/// Qualitative banding of a single risk factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorRating {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for FactorRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
        }
    }
}

/// One factor's value, rating, and templated description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorAssessment {
    /// Normalized factor value in [0, 1]
    pub value: f64,
    /// Band the value falls in
    pub assessment: FactorRating,
    /// Human-readable description (templated, not generated)
    pub description: String,
}

/// Assessments for all three portfolio risk factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorAssessments {
    pub volatility: FactorAssessment,
    pub concentration: FactorAssessment,
    pub correlation: FactorAssessment,
}

// ============================================================================
// Risk Breakdown
// ============================================================================

/// Portfolio-level risk breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBreakdown {
    /// Normalized volatility component in [0, 1]
    pub volatility: f64,
    /// Raw annualized portfolio volatility (may exceed 1.0)
    pub annualized_volatility: f64,
    /// Concentration component: the raw HHI over position weights
    pub concentration: f64,
    /// Min-max scaled diversification value: 0 for equal-weight, 1 for a
    /// single holding
    pub diversification: f64,
    /// Correlation risk component in [0, 1]
    pub correlation_risk: f64,
    /// Overall risk score in [1, 10]
    pub risk_score: f64,
    /// Discrete risk level derived from the score
    pub risk_level: RiskLevel,
    /// Templated interpretation for the risk level
    pub interpretation: String,
    /// Per-factor qualitative assessments
    pub assessments: FactorAssessments,
}

// ============================================================================
// Stock Analysis
// ============================================================================

/// Per-position analysis, recommendation included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    /// Ticker symbol (upper-cased)
    pub symbol: String,
    /// Current market price per share
    pub current_price: f64,
    /// Effective purchase price per share (value-weighted across merged lots)
    pub purchase_price: f64,
    /// Number of shares held
    pub quantity: f64,
    /// Current market value of the position
    pub current_value: f64,
    /// Share of total portfolio value, as a fraction in [0, 1]
    pub portfolio_weight: f64,
    /// Unrealized gain/loss in percent of cost basis
    pub gain_loss_percent: f64,
    /// Unrealized gain/loss amount
    pub gain_loss_amount: f64,
    /// Annualized volatility of this symbol's returns
    pub volatility: f64,
    /// Individual risk score in [1, 10]
    pub risk_score: f64,
    /// Risk level derived from the score (same thresholds as the portfolio)
    pub risk_level: RiskLevel,
    /// Hold/Reduce/Sell signal
    pub recommendation: Recommendation,
    /// Confidence in the recommendation
    pub confidence: Confidence,
    /// Human-readable reasons, at least one
    pub reasons: Vec<String>,
    /// Suggested action text; None for fallback HOLDs
    pub action: Option<String>,
}

/// Summary of per-position analyses, in input holding order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysisReport {
    /// Number of effective positions analyzed
    pub stock_count: usize,
    /// Positions rated ELEVATED or HIGH
    pub high_risk_count: usize,
    /// Positions with a SELL or REDUCE recommendation
    pub sell_recommendations: usize,
    /// Per-position analyses
    pub stock_analyses: Vec<StockAnalysis>,
}

impl StockAnalysisReport {
    /// Build the summary from a set of analyses.
    pub fn from_analyses(stock_analyses: Vec<StockAnalysis>) -> Self {
        let high_risk_count = stock_analyses
            .iter()
            .filter(|s| s.risk_level.is_high_risk())
            .count();
        let sell_recommendations = stock_analyses
            .iter()
            .filter(|s| s.recommendation.is_sell_signal())
            .count();
        Self {
            stock_count: stock_analyses.len(),
            high_risk_count,
            sell_recommendations,
            stock_analyses,
        }
    }
}

// ============================================================================
// Data Quality Warnings
// ============================================================================

/// Category of a data-quality degradation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// No price history was supplied for the symbol
    MissingHistory,
    /// Fewer than two usable price points remained after normalization
    InsufficientHistory,
    /// Non-finite or non-positive closes were dropped during normalization
    DroppedPricePoints,
    /// No current price was supplied; the purchase price was used instead
    MissingCurrentPrice,
}

/// A per-symbol diagnostic flag for degraded input data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityWarning {
    pub symbol: String,
    pub kind: WarningKind,
    pub message: String,
}

impl DataQualityWarning {
    pub fn new(symbol: impl Into<String>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            message: message.into(),
        }
    }
}

// ============================================================================
// Portfolio Analysis
// ============================================================================

/// Complete result of one engine invocation.
///
/// `analyzed_at` is the only time-dependent field; every scored field is a
/// pure function of the inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    /// Total current market value of the portfolio
    pub total_value: f64,
    /// Overall risk score in [1, 10]
    pub risk_score: f64,
    /// Portfolio-level risk breakdown
    pub risk_breakdown: RiskBreakdown,
    /// Per-position analyses and summary counts
    pub stock_analysis: StockAnalysisReport,
    /// Data-quality warnings accumulated while degrading gracefully
    pub data_warnings: Vec<DataQualityWarning>,
    /// Profile the recommendations were tuned for
    pub user_profile: UserProfile,
    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================
