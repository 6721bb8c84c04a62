//! Risk engine configuration.
//!
//! Every tunable constant used by the calculators and the recommendation
//! rules lives here as a named, serde-overridable field. Nothing in the
//! scoring path reads a literal threshold directly.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::portfolio::UserProfile;
use crate::report::{FactorRating, Recommendation};

// ============================================================================
// Main Configuration
// ============================================================================

/// Configuration for the portfolio risk engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Weights for combining the three portfolio-level risk components
    #[serde(default)]
    pub score_weights: ScoreWeights,

    /// Volatility calculation settings
    #[serde(default)]
    pub volatility: VolatilityConfig,

    /// Correlation calculation settings
    #[serde(default)]
    pub correlation: CorrelationConfig,

    /// Per-stock scoring settings
    #[serde(default)]
    pub stock: StockScoreConfig,

    /// Recommendation rule thresholds
    #[serde(default)]
    pub recommendation: RecommendationConfig,

    /// Banding thresholds for per-factor assessments
    #[serde(default)]
    pub assessment: AssessmentBands,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            score_weights: ScoreWeights::default(),
            volatility: VolatilityConfig::default(),
            correlation: CorrelationConfig::default(),
            stock: StockScoreConfig::default(),
            recommendation: RecommendationConfig::default(),
            assessment: AssessmentBands::default(),
        }
    }
}

impl RiskConfig {
    /// Validate the configuration before use.
    pub fn validate(&self) -> Result<()> {
        self.score_weights.validate()?;
        self.volatility.validate()?;
        self.stock.validate()?;
        self.assessment.validate()?;
        if self.recommendation.profit_take_pct < 0.0 {
            return Err(EngineError::Config(
                "profit_take_pct must be non-negative".into(),
            ));
        }
        if self.recommendation.loss_limit_pct > 0.0 {
            return Err(EngineError::Config(
                "loss_limit_pct must be zero or negative".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Portfolio Score Weights
// ============================================================================

/// Weights for the portfolio-level risk score.
///
/// `risk_score_raw = volatility*w_vol + concentration*w_conc +
/// correlation_risk*w_corr`, each component already normalized to [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the volatility component
    #[serde(default = "default_volatility_weight")]
    pub volatility: f64,

    /// Weight of the concentration (HHI) component
    #[serde(default = "default_concentration_weight")]
    pub concentration: f64,

    /// Weight of the correlation risk component
    #[serde(default = "default_correlation_weight")]
    pub correlation: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            volatility: default_volatility_weight(),
            concentration: default_concentration_weight(),
            correlation: default_correlation_weight(),
        }
    }
}

impl ScoreWeights {
    fn validate(&self) -> Result<()> {
        let sum = self.volatility + self.concentration + self.correlation;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(EngineError::Config(format!(
                "score weights must sum to 1.0, got {}",
                sum
            )));
        }
        if self.volatility < 0.0 || self.concentration < 0.0 || self.correlation < 0.0 {
            return Err(EngineError::Config("score weights must be non-negative".into()));
        }
        Ok(())
    }
}

fn default_volatility_weight() -> f64 {
    0.5
}

fn default_concentration_weight() -> f64 {
    0.3
}

fn default_correlation_weight() -> f64 {
    0.2
}

// ============================================================================
// Volatility Configuration
// ============================================================================

/// Volatility calculation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityConfig {
    /// Trading days per year used for annualization (√252 by default)
    #[serde(default = "default_trading_days")]
    pub trading_days_per_year: u32,

    /// Calibration ceiling: annualized volatility mapping to a 1.0 component
    /// (1.0 = 100% annualized volatility)
    #[serde(default = "default_volatility_ceiling")]
    pub ceiling: f64,

    /// Neutral annualized volatility substituted for symbols with
    /// insufficient price history
    #[serde(default = "default_neutral_volatility")]
    pub neutral_volatility: f64,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: default_trading_days(),
            ceiling: default_volatility_ceiling(),
            neutral_volatility: default_neutral_volatility(),
        }
    }
}

impl VolatilityConfig {
    /// Annualization factor: √(trading days per year).
    pub fn annualization_factor(&self) -> f64 {
        f64::from(self.trading_days_per_year).sqrt()
    }

    fn validate(&self) -> Result<()> {
        if self.trading_days_per_year == 0 {
            return Err(EngineError::Config("trading_days_per_year must be positive".into()));
        }
        if self.ceiling <= 0.0 {
            return Err(EngineError::Config("volatility ceiling must be positive".into()));
        }
        if self.neutral_volatility < 0.0 {
            return Err(EngineError::Config("neutral_volatility must be non-negative".into()));
        }
        Ok(())
    }
}

fn default_trading_days() -> u32 {
    252
}

fn default_volatility_ceiling() -> f64 {
    1.0
}

fn default_neutral_volatility() -> f64 {
    0.35
}

// ============================================================================
// Correlation Configuration
// ============================================================================

/// Correlation calculation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Minimum overlapping returns required for a pair to be valid
    #[serde(default = "default_min_overlap")]
    pub min_overlap: usize,

    /// Correlation risk reported when no valid pair exists
    /// (single holding, flat histories, no date overlap)
    #[serde(default)]
    pub neutral_risk: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_overlap: default_min_overlap(),
            neutral_risk: 0.0,
        }
    }
}

fn default_min_overlap() -> usize {
    2
}

// ============================================================================
// Stock Score Configuration
// ============================================================================

/// Per-stock risk score settings.
///
/// `stock_raw = w_vol*min(vol/ceiling, 1) + w_weight*weight + w_loss*loss_severity`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockScoreConfig {
    /// Weight of the stock's own annualized volatility (dominant term)
    #[serde(default = "default_stock_volatility_weight")]
    pub volatility_weight: f64,

    /// Weight of the stock's portfolio weight (concentration proxy)
    #[serde(default = "default_stock_concentration_weight")]
    pub concentration_weight: f64,

    /// Weight of the loss severity term (drawdown kicker)
    #[serde(default = "default_stock_loss_weight")]
    pub loss_weight: f64,

    /// Loss magnitude in percent, as a positive number, at which the loss
    /// severity term saturates at 1.0 (50.0 means a 50% loss saturates)
    #[serde(default = "default_loss_severity_floor")]
    pub loss_severity_floor_pct: f64,
}

impl Default for StockScoreConfig {
    fn default() -> Self {
        Self {
            volatility_weight: default_stock_volatility_weight(),
            concentration_weight: default_stock_concentration_weight(),
            loss_weight: default_stock_loss_weight(),
            loss_severity_floor_pct: default_loss_severity_floor(),
        }
    }
}

impl StockScoreConfig {
    fn validate(&self) -> Result<()> {
        let sum = self.volatility_weight + self.concentration_weight + self.loss_weight;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(EngineError::Config(format!(
                "stock score weights must sum to 1.0, got {}",
                sum
            )));
        }
        if self.loss_severity_floor_pct <= 0.0 {
            return Err(EngineError::Config(
                "loss_severity_floor_pct must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn default_stock_volatility_weight() -> f64 {
    0.60
}

fn default_stock_concentration_weight() -> f64 {
    0.25
}

fn default_stock_loss_weight() -> f64 {
    0.15
}

fn default_loss_severity_floor() -> f64 {
    50.0
}

// ============================================================================
// Recommendation Configuration
// ============================================================================

/// Thresholds for the Hold/Reduce/Sell decision table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Gain percentage above which a HIGH risk position triggers SELL
    /// (strictly greater than)
    #[serde(default = "default_profit_take_pct")]
    pub profit_take_pct: f64,

    /// Portfolio weight percentage above which a HIGH risk position
    /// triggers REDUCE (strictly greater than)
    #[serde(default = "default_concentration_limit_pct")]
    pub concentration_limit_pct: f64,

    /// Base loss percentage (negative) for the ELEVATED risk loss rule,
    /// scaled per profile by its loss tolerance multiplier
    #[serde(default = "default_loss_limit_pct")]
    pub loss_limit_pct: f64,

    /// Annualized volatility percentage below which a position counts as
    /// stable for the HOLD positive signals
    #[serde(default = "default_stable_volatility_pct")]
    pub stable_volatility_pct: f64,

    /// Per-profile loss tolerance table
    #[serde(default)]
    pub profiles: ProfileTolerances,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            profit_take_pct: default_profit_take_pct(),
            concentration_limit_pct: default_concentration_limit_pct(),
            loss_limit_pct: default_loss_limit_pct(),
            stable_volatility_pct: default_stable_volatility_pct(),
            profiles: ProfileTolerances::default(),
        }
    }
}

fn default_profit_take_pct() -> f64 {
    20.0
}

fn default_concentration_limit_pct() -> f64 {
    25.0
}

fn default_loss_limit_pct() -> f64 {
    -15.0
}

fn default_stable_volatility_pct() -> f64 {
    20.0
}

// ============================================================================
// Profile Tolerance Table
// ============================================================================

/// Loss tolerance modifiers per user profile.
///
/// The multiplier scales `loss_limit_pct`: beginners trim earliest, senior
/// profiles tolerate the deepest drawdown before the loss rule fires and
/// then exit fully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileTolerances {
    #[serde(default = "default_beginner_tolerance")]
    pub beginner: ProfileTolerance,

    #[serde(default = "default_intermediate_tolerance")]
    pub intermediate: ProfileTolerance,

    #[serde(default = "default_senior_tolerance")]
    pub senior: ProfileTolerance,
}

impl Default for ProfileTolerances {
    fn default() -> Self {
        Self {
            beginner: default_beginner_tolerance(),
            intermediate: default_intermediate_tolerance(),
            senior: default_senior_tolerance(),
        }
    }
}

impl ProfileTolerances {
    /// Look up the tolerance entry for a profile.
    pub fn get(&self, profile: UserProfile) -> &ProfileTolerance {
        match profile {
            UserProfile::Beginner => &self.beginner,
            UserProfile::Intermediate => &self.intermediate,
            UserProfile::Senior => &self.senior,
        }
    }
}

/// One profile's loss tolerance entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileTolerance {
    /// Multiplier applied to `loss_limit_pct` before comparison
    pub loss_multiplier: f64,
    /// Action taken when the loss rule triggers
    pub loss_action: Recommendation,
}

fn default_beginner_tolerance() -> ProfileTolerance {
    ProfileTolerance {
        loss_multiplier: 1.0,
        loss_action: Recommendation::Reduce,
    }
}

fn default_intermediate_tolerance() -> ProfileTolerance {
    ProfileTolerance {
        loss_multiplier: 1.2,
        loss_action: Recommendation::Reduce,
    }
}

fn default_senior_tolerance() -> ProfileTolerance {
    ProfileTolerance {
        loss_multiplier: 1.5,
        loss_action: Recommendation::Sell,
    }
}

// ============================================================================
// Assessment Bands
// ============================================================================

/// A two-threshold band mapping a [0, 1] factor to low/moderate/high.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorBand {
    /// Values strictly above this are at least moderate
    pub moderate_above: f64,
    /// Values strictly above this are high
    pub high_above: f64,
}

impl FactorBand {
    /// Band a normalized factor value.
    pub fn classify(&self, value: f64) -> FactorRating {
        if value > self.high_above {
            FactorRating::High
        } else if value > self.moderate_above {
            FactorRating::Moderate
        } else {
            FactorRating::Low
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.moderate_above > self.high_above {
            return Err(EngineError::Config(format!(
                "{} band thresholds out of order: {} > {}",
                name, self.moderate_above, self.high_above
            )));
        }
        Ok(())
    }
}

/// Banding thresholds for the per-factor assessments in the breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentBands {
    #[serde(default = "default_volatility_band")]
    pub volatility: FactorBand,

    #[serde(default = "default_concentration_band")]
    pub concentration: FactorBand,

    #[serde(default = "default_correlation_band")]
    pub correlation: FactorBand,
}

impl Default for AssessmentBands {
    fn default() -> Self {
        Self {
            volatility: default_volatility_band(),
            concentration: default_concentration_band(),
            correlation: default_correlation_band(),
        }
    }
}

impl AssessmentBands {
    fn validate(&self) -> Result<()> {
        self.volatility.validate("volatility")?;
        self.concentration.validate("concentration")?;
        self.correlation.validate("correlation")?;
        Ok(())
    }
}

fn default_volatility_band() -> FactorBand {
    FactorBand {
        moderate_above: 0.15,
        high_above: 0.30,
    }
}

fn default_concentration_band() -> FactorBand {
    FactorBand {
        moderate_above: 0.20,
        high_above: 0.40,
    }
}

fn default_correlation_band() -> FactorBand {
    FactorBand {
        moderate_above: 0.40,
        high_above: 0.70,
    }
}

// ============================================================================
// Tests
// ============================================================================
