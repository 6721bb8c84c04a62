//! Folio Risk - Portfolio risk scoring engine.
//!
//! Computes a multi-factor risk assessment for a stock portfolio: an
//! overall risk score on a 1-10 scale, a component breakdown, per-stock
//! risk analyses, and actionable Hold/Reduce/Sell recommendations tuned
//! to the investor's profile.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         RiskEngine                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  holdings ──► merge ──► snapshot ──► return normalizer          │
//! │                                          │                      │
//! │              ┌───────────────┬───────────┴────────┐             │
//! │      ┌───────▼──────┐ ┌──────▼───────┐ ┌──────────▼─────┐       │
//! │      │  Volatility  │ │Concentration │ │  Correlation   │       │
//! │      │  Calculator  │ │    (HHI)     │ │  Calculator    │       │
//! │      └───────┬──────┘ └──────┬───────┘ └──────────┬─────┘       │
//! │              └───────────────┼────────────────────┘             │
//! │                      ┌───────▼────────┐                         │
//! │                      │ Risk Aggregator│──► risk score, level    │
//! │                      └────────────────┘                         │
//! │      per position: Stock Analyzer ──► Recommendation Engine     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Risk Score
//! A weighted blend of three normalized components (volatility 50%,
//! concentration 30%, correlation 20%), scaled to [1, 10] and classified
//! as LOW / MODERATE / ELEVATED / HIGH.
//!
//! ## Graceful Degradation
//! Missing quotes or thin histories never fail an analysis: the engine
//! substitutes neutral defaults and reports what it did through
//! [`DataQualityWarning`](report::DataQualityWarning) entries.
//!
//! ## Determinism
//! One invocation is a pure function of its inputs; the timestamp is the
//! only time-dependent output field. The engine holds no mutable state,
//! so concurrent analyses need no synchronization.
//!
//! # Example
//!
//! ```no_run
//! use folio_risk::prelude::*;
//!
//! # fn main() -> folio_risk::error::Result<()> {
//! let engine = RiskEngine::default();
//! let holdings = vec![
//!     Holding::new("AAPL", 10.0, 150.0),
//!     Holding::new("MSFT", 5.0, 300.0),
//! ];
//! let provider = FixedPriceProvider::with_sample_data();
//! let symbols: Vec<String> = holdings.iter().map(|h| h.symbol.clone()).collect();
//! let market = MarketData::gather(&provider, &symbols, 30);
//!
//! let analysis = engine.analyze(&holdings, &market, UserProfile::Beginner)?;
//! println!("risk score: {:.2} ({})", analysis.risk_score, analysis.risk_breakdown.risk_level);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod portfolio;
pub mod report;

pub use config::RiskConfig;
pub use engine::RiskEngine;
pub use error::{EngineError, Result};
pub use portfolio::{Holding, UserProfile};
pub use report::{PortfolioAnalysis, Recommendation, RiskLevel};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::RiskConfig;
    pub use crate::data::{FixedPriceProvider, MarketData, PriceProvider, PriceSeries};
    pub use crate::engine::RiskEngine;
    pub use crate::error::{EngineError, Result};
    pub use crate::portfolio::{Holding, UserProfile};
    pub use crate::report::{
        PortfolioAnalysis, Recommendation, RiskBreakdown, RiskLevel, StockAnalysis,
    };
}
