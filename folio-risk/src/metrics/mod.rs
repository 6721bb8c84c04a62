//! Portfolio risk metric calculators.
//!
//! The three calculators are independent: each reads only the normalized
//! return series and the valued positions, so they can run concurrently.

pub mod concentration;
pub mod correlation;
pub mod volatility;

pub use concentration::{concentration, ConcentrationMetrics};
pub use correlation::{CorrelationCalculator, CorrelationMetrics, PairCorrelation};
pub use volatility::{SymbolVolatility, VolatilityCalculator, VolatilityMetrics};
