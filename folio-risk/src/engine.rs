//! Risk engine facade.
//!
//! Orchestrates one analysis pass: validate and merge holdings, price
//! the snapshot, normalize histories, run the three calculators,
//! aggregate the breakdown, then score and advise each position. Each
//! invocation is a pure function of its inputs (plus the timestamp);
//! concurrent invocations share no state.

use std::collections::HashMap;

use chrono::Utc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::analysis::{PositionSignals, RecommendationEngine, RiskAggregator, StockAnalyzer};
use crate::config::RiskConfig;
use crate::data::{returns, MarketData, ReturnSeries};
use crate::error::Result;
use crate::metrics::{CorrelationCalculator, SymbolVolatility, VolatilityCalculator};
use crate::portfolio::{merge_holdings, Holding, PortfolioSnapshot, UserProfile, ValuedPosition};
use crate::report::{
    DataQualityWarning, PortfolioAnalysis, StockAnalysis, StockAnalysisReport, WarningKind,
};

// ============================================================================
// Engine
// ============================================================================

/// Portfolio risk scoring engine.
pub struct RiskEngine {
    config: RiskConfig,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self {
            config: RiskConfig::default(),
        }
    }
}

impl RiskEngine {
    /// Create an engine with a validated configuration.
    pub fn new(config: RiskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Analyze a portfolio.
    ///
    /// Degrades gracefully on missing or short price histories (neutral
    /// defaults plus a warning per symbol) and fails only on invalid
    /// holdings, an empty portfolio, a worthless portfolio, or an
    /// internal non-finite value.
    pub fn analyze(
        &self,
        holdings: &[Holding],
        market: &MarketData,
        profile: UserProfile,
    ) -> Result<PortfolioAnalysis> {
        let positions = merge_holdings(holdings)?;
        let snapshot = PortfolioSnapshot::build(positions, &market.current_prices)?;
        let mut warnings = snapshot.warnings.clone();
        let return_series = self.normalize_histories(&snapshot, market, &mut warnings);

        tracing::debug!(
            positions = snapshot.positions.len(),
            total_value = snapshot.total_value,
            warnings = warnings.len(),
            "snapshot priced, running calculators"
        );

        let volatility_calc = VolatilityCalculator::new(self.config.volatility.clone());
        let correlation_calc = CorrelationCalculator::new(self.config.correlation.clone());
        let weights = snapshot.weights();
        let positions = &snapshot.positions;

        // The three calculators are independent and only read shared data
        #[cfg(feature = "parallel")]
        let (volatility, (concentration, correlation)) = rayon::join(
            || volatility_calc.portfolio(positions, &return_series),
            || {
                rayon::join(
                    || crate::metrics::concentration(&weights),
                    || correlation_calc.portfolio(positions, &return_series),
                )
            },
        );
        #[cfg(not(feature = "parallel"))]
        let (volatility, concentration, correlation) = (
            volatility_calc.portfolio(positions, &return_series),
            crate::metrics::concentration(&weights),
            correlation_calc.portfolio(positions, &return_series),
        );

        let breakdown =
            RiskAggregator::new(&self.config).aggregate(&volatility, &concentration, &correlation)?;

        let stock_analyzer =
            StockAnalyzer::new(self.config.stock.clone(), self.config.volatility.ceiling);
        let recommender = RecommendationEngine::new(self.config.recommendation.clone());
        let analyze_one = |position: &ValuedPosition, vol: &SymbolVolatility| {
            self.analyze_position(position, vol, profile, &stock_analyzer, &recommender)
        };

        // Output order always matches input holding order
        #[cfg(feature = "parallel")]
        let analyses: Result<Vec<StockAnalysis>> = positions
            .par_iter()
            .zip(volatility.per_symbol.par_iter())
            .map(|(position, vol)| analyze_one(position, vol))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let analyses: Result<Vec<StockAnalysis>> = positions
            .iter()
            .zip(volatility.per_symbol.iter())
            .map(|(position, vol)| analyze_one(position, vol))
            .collect();

        Ok(PortfolioAnalysis {
            total_value: snapshot.total_value,
            risk_score: breakdown.risk_score,
            risk_breakdown: breakdown,
            stock_analysis: StockAnalysisReport::from_analyses(analyses?),
            data_warnings: warnings,
            user_profile: profile,
            analyzed_at: Utc::now(),
        })
    }

    /// Normalize every position's history, flagging degradations.
    fn normalize_histories(
        &self,
        snapshot: &PortfolioSnapshot,
        market: &MarketData,
        warnings: &mut Vec<DataQualityWarning>,
    ) -> HashMap<String, ReturnSeries> {
        let mut series = HashMap::with_capacity(snapshot.positions.len());
        for position in &snapshot.positions {
            let symbol = &position.position.symbol;
            let Some(history) = market.histories.get(symbol) else {
                warnings.push(DataQualityWarning::new(
                    symbol.clone(),
                    WarningKind::MissingHistory,
                    format!("no price history for {}; using neutral defaults", symbol),
                ));
                continue;
            };
            let normalized = returns::normalize(symbol, history);
            if normalized.dropped_points > 0 {
                warnings.push(DataQualityWarning::new(
                    symbol.clone(),
                    WarningKind::DroppedPricePoints,
                    format!(
                        "dropped {} unusable price points for {}",
                        normalized.dropped_points, symbol
                    ),
                ));
            }
            if !normalized.is_sufficient() {
                warnings.push(DataQualityWarning::new(
                    symbol.clone(),
                    WarningKind::InsufficientHistory,
                    format!(
                        "only {} usable price points for {}; using neutral defaults",
                        normalized.usable_points, symbol
                    ),
                ));
            }
            series.insert(symbol.clone(), normalized);
        }
        series
    }

    fn analyze_position(
        &self,
        position: &ValuedPosition,
        vol: &SymbolVolatility,
        profile: UserProfile,
        stock_analyzer: &StockAnalyzer,
        recommender: &RecommendationEngine,
    ) -> Result<StockAnalysis> {
        let score = stock_analyzer.score(position, vol.annualized)?;
        let signals = PositionSignals {
            symbol: &position.position.symbol,
            risk_level: score.risk_level,
            gain_loss_percent: position.gain_loss_percent(),
            weight_pct: position.weight * 100.0,
            volatility_pct: vol.annualized * 100.0,
        };
        let outcome = recommender.recommend(profile, &signals);

        Ok(StockAnalysis {
            symbol: position.position.symbol.clone(),
            current_price: position.current_price,
            purchase_price: position.position.purchase_price,
            quantity: position.position.quantity,
            current_value: position.current_value,
            portfolio_weight: position.weight,
            gain_loss_percent: position.gain_loss_percent(),
            gain_loss_amount: position.gain_loss_amount(),
            volatility: vol.annualized,
            risk_score: score.risk_score,
            risk_level: score.risk_level,
            recommendation: outcome.recommendation,
            confidence: outcome.confidence,
            reasons: outcome.reasons,
            action: outcome.action,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FixedPriceProvider, PriceSeries};
    use crate::error::EngineError;
    use crate::report::{Recommendation, RiskLevel};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    /// Route engine tracing through the test harness for readable
    /// failure output (`RUST_LOG=debug cargo test -- --nocapture`).
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn flat_history(price: f64, days: usize) -> PriceSeries {
        PriceSeries::from_closes(start_date(), &vec![price; days])
    }

    /// Prices alternating ×1.1 / ×0.9: returns swing exactly ±10% daily.
    fn swing_history(start: f64, days: usize) -> PriceSeries {
        let mut closes = Vec::with_capacity(days);
        let mut price = start;
        for i in 0..days {
            closes.push(price);
            price *= if i % 2 == 0 { 1.1 } else { 0.9 };
        }
        PriceSeries::from_closes(start_date(), &closes)
    }

    fn flat_two_stock_market() -> MarketData {
        MarketData::new()
            .with_price("AAPL", 195.5)
            .with_price("GOOGL", 142.8)
            .with_history("AAPL", flat_history(195.5, 6))
            .with_history("GOOGL", flat_history(142.8, 6))
    }

    fn flat_two_stock_holdings() -> Vec<Holding> {
        vec![
            Holding::new("AAPL", 10.0, 150.0),
            Holding::new("GOOGL", 5.0, 140.0),
        ]
    }

    #[test]
    fn test_flat_history_scenario() {
        init_tracing();
        let engine = RiskEngine::default();
        let analysis = engine
            .analyze(
                &flat_two_stock_holdings(),
                &flat_two_stock_market(),
                UserProfile::Beginner,
            )
            .unwrap();

        let total = 10.0 * 195.5 + 5.0 * 142.8;
        assert!((analysis.total_value - total).abs() < 1e-9);

        let breakdown = &analysis.risk_breakdown;
        // Flat prices: zero volatility, correlation undefined → neutral 0
        assert!(breakdown.volatility.abs() < 1e-12);
        assert!(breakdown.correlation_risk.abs() < 1e-12);

        let w_aapl = 10.0 * 195.5 / total;
        let w_googl = 5.0 * 142.8 / total;
        let expected_hhi = w_aapl * w_aapl + w_googl * w_googl;
        assert!((breakdown.concentration - expected_hhi).abs() < 1e-9);

        // Only the concentration term contributes
        let expected_score = 1.0 + 9.0 * 0.3 * expected_hhi;
        assert!((breakdown.risk_score - expected_score).abs() < 1e-9);
        assert!(breakdown.risk_score > 1.0);
        assert!(breakdown.risk_score < 1.0 + 9.0 * 0.3);

        // Both positions HOLD; no loss or high-risk trigger
        for stock in &analysis.stock_analysis.stock_analyses {
            assert_eq!(stock.recommendation, Recommendation::Hold);
        }
        assert_eq!(analysis.stock_analysis.sell_recommendations, 0);
        assert!(analysis.data_warnings.is_empty());
    }

    #[test]
    fn test_extreme_volatility_single_holding() {
        let engine = RiskEngine::default();
        let holdings = vec![Holding::new("SWING", 10.0, 100.0)];
        let market = MarketData::new()
            .with_price("SWING", 100.0)
            .with_history("SWING", swing_history(100.0, 10));

        let analysis = engine
            .analyze(&holdings, &market, UserProfile::Beginner)
            .unwrap();

        let breakdown = &analysis.risk_breakdown;
        // ±10% daily annualizes past the 100% ceiling
        assert!((breakdown.volatility - 1.0).abs() < 1e-12);
        assert!(breakdown.annualized_volatility > 1.0);
        assert!((breakdown.concentration - 1.0).abs() < 1e-12);
        // No pair exists: neutral correlation
        assert!(breakdown.correlation_risk.abs() < 1e-12);

        // raw = 0.5 + 0.3 + 0 → score 8.2, HIGH
        assert!((breakdown.risk_score - 8.2).abs() < 1e-9);
        assert_eq!(breakdown.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_sell_trigger_on_high_risk_gains() {
        let engine = RiskEngine::default();
        // Single volatile holding up 25%: stock score is HIGH
        // (0.6*1 + 0.25*1 = 0.85 raw → 8.65) and gains beat +20%
        let holdings = vec![Holding::new("SWING", 10.0, 100.0)];
        let market = MarketData::new()
            .with_price("SWING", 125.0)
            .with_history("SWING", swing_history(100.0, 10));

        let analysis = engine
            .analyze(&holdings, &market, UserProfile::Beginner)
            .unwrap();
        let stock = &analysis.stock_analysis.stock_analyses[0];

        assert_eq!(stock.risk_level, RiskLevel::High);
        assert!((stock.gain_loss_percent - 25.0).abs() < 1e-9);
        assert_eq!(stock.recommendation, Recommendation::Sell);
        assert!(stock.action.is_some());
        assert_eq!(analysis.stock_analysis.sell_recommendations, 1);
        assert_eq!(analysis.stock_analysis.high_risk_count, 1);
    }

    #[test]
    fn test_gain_exactly_at_threshold_holds() {
        let engine = RiskEngine::default();
        let holdings = vec![Holding::new("SWING", 10.0, 100.0)];
        let market = MarketData::new()
            .with_price("SWING", 120.0)
            .with_history("SWING", swing_history(100.0, 10));

        let analysis = engine
            .analyze(&holdings, &market, UserProfile::Beginner)
            .unwrap();
        let stock = &analysis.stock_analysis.stock_analyses[0];

        // +20.0% is not strictly greater than the threshold
        assert!((stock.gain_loss_percent - 20.0).abs() < 1e-9);
        assert_ne!(stock.recommendation, Recommendation::Sell);
    }

    #[test]
    fn test_missing_history_degrades_with_warnings() {
        init_tracing();
        let engine = RiskEngine::default();
        let holdings = vec![
            Holding::new("AAPL", 10.0, 150.0),
            Holding::new("MYSTERY", 10.0, 50.0),
        ];
        let market = MarketData::new()
            .with_price("AAPL", 195.5)
            .with_price("MYSTERY", 55.0)
            .with_history("AAPL", flat_history(195.5, 6));

        let analysis = engine
            .analyze(&holdings, &market, UserProfile::Beginner)
            .unwrap();

        assert!(analysis
            .data_warnings
            .iter()
            .any(|w| w.symbol == "MYSTERY" && w.kind == WarningKind::MissingHistory));

        // MYSTERY carries the neutral volatility
        let mystery = analysis
            .stock_analysis
            .stock_analyses
            .iter()
            .find(|s| s.symbol == "MYSTERY")
            .unwrap();
        assert!((mystery.volatility - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_worthless_portfolio_is_computation_error() {
        let engine = RiskEngine::default();
        let holdings = vec![Holding::new("ZZZZ", 10.0, 0.0)];
        let err = engine
            .analyze(&holdings, &MarketData::new(), UserProfile::Beginner)
            .unwrap_err();
        assert!(matches!(err, EngineError::Computation { .. }));
        assert!(!err.is_validation_error());
    }

    #[test]
    fn test_invalid_holding_is_rejected() {
        let engine = RiskEngine::default();
        let holdings = vec![Holding::new("AAPL", -1.0, 150.0)];
        let err = engine
            .analyze(&holdings, &flat_two_stock_market(), UserProfile::Beginner)
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_empty_portfolio_is_rejected() {
        let engine = RiskEngine::default();
        let err = engine
            .analyze(&[], &MarketData::new(), UserProfile::Beginner)
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyPortfolio));
    }

    #[test]
    fn test_output_preserves_input_order() {
        let engine = RiskEngine::default();
        let provider = FixedPriceProvider::with_sample_data();
        let symbols: Vec<String> = ["TSLA", "AAPL", "NVDA", "SPY"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let market = MarketData::gather(&provider, &symbols, 8);
        let holdings: Vec<Holding> = symbols
            .iter()
            .map(|s| Holding::new(s.clone(), 5.0, 100.0))
            .collect();

        let analysis = engine
            .analyze(&holdings, &market, UserProfile::Intermediate)
            .unwrap();
        let output: Vec<&str> = analysis
            .stock_analysis
            .stock_analyses
            .iter()
            .map(|s| s.symbol.as_str())
            .collect();
        assert_eq!(output, vec!["TSLA", "AAPL", "NVDA", "SPY"]);
    }

    #[test]
    fn test_duplicate_lots_are_merged_in_output() {
        let engine = RiskEngine::default();
        let holdings = vec![
            Holding::new("AAPL", 10.0, 100.0),
            Holding::new("GOOGL", 5.0, 140.0),
            Holding::new("AAPL", 10.0, 200.0),
        ];
        let analysis = engine
            .analyze(&holdings, &flat_two_stock_market(), UserProfile::Beginner)
            .unwrap();

        assert_eq!(analysis.stock_analysis.stock_count, 2);
        let aapl = &analysis.stock_analysis.stock_analyses[0];
        assert_eq!(aapl.symbol, "AAPL");
        assert!((aapl.quantity - 20.0).abs() < 1e-12);
        assert!((aapl.purchase_price - 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_idempotence_modulo_timestamp() {
        let engine = RiskEngine::default();
        let holdings = flat_two_stock_holdings();
        let market = flat_two_stock_market();

        let first = engine
            .analyze(&holdings, &market, UserProfile::Senior)
            .unwrap();
        let second = engine
            .analyze(&holdings, &market, UserProfile::Senior)
            .unwrap();

        let mut a = serde_json::to_value(&first).unwrap();
        let mut b = serde_json::to_value(&second).unwrap();
        a["analyzed_at"] = serde_json::Value::Null;
        b["analyzed_at"] = serde_json::Value::Null;
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_portfolio_end_to_end() {
        let engine = RiskEngine::default();
        let provider = FixedPriceProvider::with_sample_data();
        let symbols: Vec<String> = ["SPY", "QQQ", "VTI"].iter().map(|s| s.to_string()).collect();
        let market = MarketData::gather(&provider, &symbols, 8);
        let holdings = vec![
            Holding::new("SPY", 20.0, 450.0),
            Holding::new("QQQ", 10.0, 380.0),
            Holding::new("VTI", 15.0, 230.0),
        ];

        let analysis = engine
            .analyze(&holdings, &market, UserProfile::Beginner)
            .unwrap();

        assert!(analysis.risk_score >= 1.0 && analysis.risk_score <= 10.0);
        assert!(analysis.data_warnings.is_empty());
        let weight_sum: f64 = analysis
            .stock_analysis
            .stock_analyses
            .iter()
            .map(|s| s.portfolio_weight)
            .sum();
        assert!((weight_sum - 1.0).abs() < 1e-6);
    }

    // === Property tests ===

    const PROP_SYMBOLS: [&str; 8] = [
        "AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "NVDA", "META", "SPY",
    ];

    proptest! {
        #[test]
        fn prop_weights_sum_to_one_and_score_in_range(
            entries in proptest::collection::vec(
                (0usize..8, 1.0f64..100.0, 1.0f64..500.0),
                1..8,
            )
        ) {
            let engine = RiskEngine::default();
            let mut market = MarketData::new();
            let mut holdings = Vec::new();
            for (idx, quantity, price) in &entries {
                let symbol = PROP_SYMBOLS[*idx];
                holdings.push(Holding::new(symbol, *quantity, 100.0));
                market.current_prices.insert(symbol.to_string(), *price);
                market
                    .histories
                    .insert(symbol.to_string(), flat_history(*price, 5));
            }

            let analysis = engine
                .analyze(&holdings, &market, UserProfile::Beginner)
                .unwrap();

            let weight_sum: f64 = analysis
                .stock_analysis
                .stock_analyses
                .iter()
                .map(|s| s.portfolio_weight)
                .sum();
            prop_assert!((weight_sum - 1.0).abs() < 1e-6);
            prop_assert!(analysis.risk_score >= 1.0 && analysis.risk_score <= 10.0);
            prop_assert!(analysis.risk_score.is_finite());
            for stock in &analysis.stock_analysis.stock_analyses {
                prop_assert!(stock.risk_score >= 1.0 && stock.risk_score <= 10.0);
            }
        }

        #[test]
        fn prop_equal_value_concentration_is_one_over_n(n in 1usize..8) {
            let engine = RiskEngine::default();
            let mut market = MarketData::new();
            let mut holdings = Vec::new();
            for symbol in PROP_SYMBOLS.iter().take(n) {
                holdings.push(Holding::new(*symbol, 10.0, 100.0));
                market.current_prices.insert(symbol.to_string(), 100.0);
                market
                    .histories
                    .insert(symbol.to_string(), flat_history(100.0, 5));
            }

            let analysis = engine
                .analyze(&holdings, &market, UserProfile::Beginner)
                .unwrap();
            let expected = 1.0 / n as f64;
            prop_assert!((analysis.risk_breakdown.concentration - expected).abs() < 1e-9);
        }
    }
}
