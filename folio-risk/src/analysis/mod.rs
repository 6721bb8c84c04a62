//! Portfolio- and position-level analysis built on the metric
//! calculators: score aggregation, per-stock scoring, and the
//! recommendation decision table.

pub mod aggregator;
pub mod recommendation;
pub mod stock;

pub use aggregator::RiskAggregator;
pub use recommendation::{PositionSignals, RecommendationEngine, RecommendationOutcome};
pub use stock::{StockAnalyzer, StockScore};
