//! Recommendation engine.
//!
//! A deterministic decision table per position, evaluated in fixed
//! priority order with the first matching rule winning:
//!
//! 1. HIGH risk and gains past the profit-take threshold → SELL
//! 2. HIGH risk and weight past the concentration limit → REDUCE
//! 3. ELEVATED risk and losses past the profile-scaled limit →
//!    REDUCE or SELL per the profile tolerance table
//! 4. Otherwise HOLD, with confidence from the positive signals present
//!
//! All thresholds come from [`RecommendationConfig`]; profile behavior is
//! the declarative tolerance table, not inline conditionals.

use serde::{Deserialize, Serialize};

use crate::config::RecommendationConfig;
use crate::portfolio::UserProfile;
use crate::report::{Confidence, Recommendation, RiskLevel};

// ============================================================================
// Inputs & Outcome
// ============================================================================

/// The per-position facts the decision table reads.
#[derive(Debug, Clone, Copy)]
pub struct PositionSignals<'a> {
    pub symbol: &'a str,
    pub risk_level: RiskLevel,
    /// Unrealized gain/loss in percent
    pub gain_loss_percent: f64,
    /// Portfolio weight in percent (0-100)
    pub weight_pct: f64,
    /// Annualized volatility in percent
    pub volatility_pct: f64,
}

/// Result of one decision-table evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationOutcome {
    pub recommendation: Recommendation,
    pub confidence: Confidence,
    pub reasons: Vec<String>,
    pub action: Option<String>,
}

// ============================================================================
// Engine
// ============================================================================

/// Recommendation engine.
pub struct RecommendationEngine {
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    /// Evaluate the decision table for one position.
    pub fn recommend(&self, profile: UserProfile, signals: &PositionSignals<'_>) -> RecommendationOutcome {
        // Rule 1: lock in gains on a high-risk position (strictly greater)
        if signals.risk_level == RiskLevel::High
            && signals.gain_loss_percent > self.config.profit_take_pct
        {
            return RecommendationOutcome {
                recommendation: Recommendation::Sell,
                confidence: Confidence::High,
                reasons: vec![format!(
                    "Lock in gains: up {:.1}% with high risk exposure",
                    signals.gain_loss_percent
                )],
                action: Some(format!(
                    "Consider selling {} to lock in gains and reduce risk",
                    signals.symbol
                )),
            };
        }

        // Rule 2: trim an overconcentrated high-risk position
        if signals.risk_level == RiskLevel::High
            && signals.weight_pct > self.config.concentration_limit_pct
        {
            return RecommendationOutcome {
                recommendation: Recommendation::Reduce,
                confidence: Confidence::Medium,
                reasons: vec![format!(
                    "Overconcentrated in a high-risk position ({:.1}% of portfolio)",
                    signals.weight_pct
                )],
                action: Some(format!(
                    "Consider reducing your {} position by 25-50%",
                    signals.symbol
                )),
            };
        }

        // Rule 3: profile-scaled loss limit on elevated-risk positions
        let tolerance = self.config.profiles.get(profile);
        let loss_trigger = self.config.loss_limit_pct * tolerance.loss_multiplier;
        if signals.risk_level == RiskLevel::Elevated && signals.gain_loss_percent < loss_trigger {
            let action = match tolerance.loss_action {
                Recommendation::Sell => {
                    format!("Consider exiting {} to stop further losses", signals.symbol)
                }
                _ => format!("Consider reducing your {} position by 25-50%", signals.symbol),
            };
            return RecommendationOutcome {
                recommendation: tolerance.loss_action,
                confidence: Confidence::Medium,
                reasons: vec![format!(
                    "Loss of {:.1}% breaches the {:.1}% tolerance for {} profiles",
                    signals.gain_loss_percent, loss_trigger, profile
                )],
                action: Some(action),
            };
        }

        // Rule 4: HOLD, graded by positive signals
        let mut reasons = Vec::new();
        if signals.gain_loss_percent > self.config.profit_take_pct {
            reasons.push(format!("Strong gains ({:.1}%)", signals.gain_loss_percent));
        }
        if signals.risk_level == RiskLevel::Low {
            reasons.push("Low risk profile".to_string());
        }
        if signals.volatility_pct < self.config.stable_volatility_pct
            && signals.weight_pct < self.config.concentration_limit_pct
        {
            reasons.push("Well-balanced stable position".to_string());
        }

        let confidence = match reasons.len() {
            0 => Confidence::Low,
            1 => Confidence::Medium,
            _ => Confidence::High,
        };
        if reasons.is_empty() {
            reasons.push("Position is balanced and within normal parameters".to_string());
        }

        RecommendationOutcome {
            recommendation: Recommendation::Hold,
            confidence,
            reasons,
            action: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn make_engine() -> RecommendationEngine {
        RecommendationEngine::new(RecommendationConfig::default())
    }

    fn make_signals(
        level: RiskLevel,
        gain_loss_percent: f64,
        weight_pct: f64,
        volatility_pct: f64,
    ) -> PositionSignals<'static> {
        PositionSignals {
            symbol: "TEST",
            risk_level: level,
            gain_loss_percent,
            weight_pct,
            volatility_pct,
        }
    }

    // === Rule 1: SELL on high-risk gains ===

    #[test]
    fn test_sell_on_high_risk_gains() {
        let outcome = make_engine().recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::High, 35.0, 10.0, 60.0),
        );
        assert_eq!(outcome.recommendation, Recommendation::Sell);
        assert_eq!(outcome.confidence, Confidence::High);
        assert!(outcome.action.is_some());
        assert!(outcome.reasons[0].contains("Lock in gains"));
    }

    #[test]
    fn test_sell_boundary_is_strict() {
        let engine = make_engine();
        // Exactly at the threshold: rule 1 does not fire
        let at = engine.recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::High, 20.0, 10.0, 60.0),
        );
        assert_ne!(at.recommendation, Recommendation::Sell);

        // One tick above: it does
        let above = engine.recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::High, 20.0001, 10.0, 60.0),
        );
        assert_eq!(above.recommendation, Recommendation::Sell);
    }

    #[test]
    fn test_gains_without_high_risk_do_not_sell() {
        let outcome = make_engine().recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::Moderate, 35.0, 10.0, 15.0),
        );
        assert_eq!(outcome.recommendation, Recommendation::Hold);
    }

    // === Rule 2: REDUCE on concentration ===

    #[test]
    fn test_reduce_on_overconcentration() {
        let outcome = make_engine().recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::High, 5.0, 40.0, 60.0),
        );
        assert_eq!(outcome.recommendation, Recommendation::Reduce);
        assert_eq!(outcome.confidence, Confidence::Medium);
        assert!(outcome.reasons[0].contains("Overconcentrated"));
        assert!(outcome.action.as_deref().unwrap().contains("25-50%"));
    }

    #[test]
    fn test_concentration_boundary_is_strict() {
        let outcome = make_engine().recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::High, 5.0, 25.0, 60.0),
        );
        assert_eq!(outcome.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_rule_one_takes_priority_over_rule_two() {
        // Both gains and concentration trigger: first match wins
        let outcome = make_engine().recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::High, 35.0, 40.0, 60.0),
        );
        assert_eq!(outcome.recommendation, Recommendation::Sell);
    }

    // === Rule 3: profile-scaled loss rule ===

    // Beginner triggers at -15%, intermediate at -18%, senior at -22.5%
    #[test_case(UserProfile::Beginner, -16.0, Recommendation::Reduce; "beginner trims earliest")]
    #[test_case(UserProfile::Intermediate, -16.0, Recommendation::Hold; "intermediate tolerates -16")]
    #[test_case(UserProfile::Intermediate, -19.0, Recommendation::Reduce; "intermediate trims at -19")]
    #[test_case(UserProfile::Senior, -19.0, Recommendation::Hold; "senior tolerates -19")]
    #[test_case(UserProfile::Senior, -23.0, Recommendation::Sell; "senior exits fully past -22.5")]
    fn test_loss_rule_per_profile(profile: UserProfile, loss: f64, expected: Recommendation) {
        let outcome = make_engine().recommend(
            profile,
            &make_signals(RiskLevel::Elevated, loss, 10.0, 30.0),
        );
        assert_eq!(outcome.recommendation, expected);
    }

    #[test]
    fn test_loss_rule_needs_elevated_risk() {
        let outcome = make_engine().recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::Moderate, -30.0, 10.0, 15.0),
        );
        assert_eq!(outcome.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_senior_loss_action_text() {
        let outcome = make_engine().recommend(
            UserProfile::Senior,
            &make_signals(RiskLevel::Elevated, -25.0, 10.0, 30.0),
        );
        assert_eq!(outcome.recommendation, Recommendation::Sell);
        assert!(outcome.action.as_deref().unwrap().contains("exiting"));
    }

    // === Rule 4: HOLD confidence grading ===

    #[test]
    fn test_hold_fallback_has_low_confidence_and_no_action() {
        // No positive signal: moderate risk, small loss, volatile
        let outcome = make_engine().recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::Moderate, -5.0, 30.0, 40.0),
        );
        assert_eq!(outcome.recommendation, Recommendation::Hold);
        assert_eq!(outcome.confidence, Confidence::Low);
        assert_eq!(
            outcome.reasons,
            vec!["Position is balanced and within normal parameters".to_string()]
        );
        assert!(outcome.action.is_none());
    }

    #[test]
    fn test_hold_single_signal_is_medium() {
        let outcome = make_engine().recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::Low, -5.0, 30.0, 40.0),
        );
        assert_eq!(outcome.confidence, Confidence::Medium);
        assert_eq!(outcome.reasons, vec!["Low risk profile".to_string()]);
    }

    #[test]
    fn test_hold_multiple_signals_is_high() {
        let outcome = make_engine().recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::Low, 25.0, 10.0, 12.0),
        );
        assert_eq!(outcome.recommendation, Recommendation::Hold);
        assert_eq!(outcome.confidence, Confidence::High);
        assert_eq!(outcome.reasons.len(), 3);
        assert!(outcome.action.is_none());
    }

    #[test]
    fn test_custom_thresholds_are_respected() {
        let mut config = RecommendationConfig::default();
        config.profit_take_pct = 50.0;
        let engine = RecommendationEngine::new(config);
        let outcome = engine.recommend(
            UserProfile::Beginner,
            &make_signals(RiskLevel::High, 35.0, 10.0, 60.0),
        );
        // 35% gain no longer triggers the raised profit take
        assert_ne!(outcome.recommendation, Recommendation::Sell);
    }
}
