//! Price data provider abstraction.
//!
//! The engine depends only on this trait, never on a concrete data
//! source. Price fetching must complete before the engine runs, so the
//! trait is synchronous over pre-fetched or cached data.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use super::{PricePoint, PriceSeries};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors a price data provider can report.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// No current quote for the symbol
    #[error("No current price available for {0}")]
    PriceUnavailable(String),

    /// No price history for the symbol
    #[error("No price history available for {0}")]
    HistoryUnavailable(String),

    /// Malformed request (empty symbol, zero-day range)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// ============================================================================
// Price Provider Trait
// ============================================================================

/// Trait for price data sources.
pub trait PriceProvider: Send + Sync {
    /// Get the current price for a symbol.
    fn current_price(&self, symbol: &str) -> Result<f64, ProviderError>;

    /// Get up to `days` daily price points for a symbol, oldest first.
    fn price_history(&self, symbol: &str, days: usize) -> Result<PriceSeries, ProviderError>;
}

// ============================================================================
// Fixed Price Provider
// ============================================================================

/// Deterministic in-memory provider for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct FixedPriceProvider {
    quotes: HashMap<String, f64>,
    histories: HashMap<String, PriceSeries>,
}

/// Builtin sample quotes: (symbol, current price, 8 daily closes).
const SAMPLE_QUOTES: &[(&str, f64, [f64; 8])] = &[
    ("AAPL", 195.50, [190.0, 192.5, 188.0, 195.0, 193.5, 196.0, 194.0, 195.5]),
    ("GOOGL", 142.80, [138.0, 140.5, 139.0, 141.5, 143.0, 144.0, 142.5, 142.8]),
    ("MSFT", 378.90, [370.0, 372.5, 375.0, 374.0, 376.5, 378.0, 377.5, 378.9]),
    ("AMZN", 155.20, [150.0, 152.5, 151.0, 153.5, 154.0, 155.5, 154.8, 155.2]),
    ("TSLA", 242.60, [234.0, 239.5, 236.0, 244.0, 249.0, 242.0, 240.5, 242.6]),
    ("NVDA", 495.00, [480.0, 485.5, 490.0, 492.0, 498.0, 500.5, 494.0, 495.0]),
    ("META", 325.40, [318.0, 320.5, 322.0, 324.0, 326.5, 328.0, 325.0, 325.4]),
    ("SPY", 445.30, [438.0, 440.5, 441.5, 442.5, 443.0, 444.5, 445.0, 445.3]),
    ("QQQ", 385.70, [378.0, 380.5, 382.0, 383.5, 384.0, 385.5, 385.0, 385.7]),
    ("VTI", 235.10, [229.0, 231.5, 232.0, 233.5, 234.0, 235.0, 235.5, 235.1]),
    ("INFY", 18.45, [17.7, 18.0, 18.2, 18.4, 18.3, 18.5, 18.4, 18.45]),
    ("TCS", 3850.00, [3780.0, 3800.5, 3820.0, 3835.5, 3840.0, 3845.5, 3848.0, 3850.0]),
    ("WIPRO", 245.30, [240.0, 241.5, 242.0, 243.5, 244.0, 245.5, 245.0, 245.3]),
];

/// First date of the builtin sample histories.
fn sample_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date")
}

impl FixedPriceProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider preloaded with the builtin sample quote table.
    pub fn with_sample_data() -> Self {
        let mut provider = Self::new();
        let start = sample_start_date();
        for (symbol, current, history) in SAMPLE_QUOTES {
            provider.quotes.insert((*symbol).to_string(), *current);
            provider
                .histories
                .insert((*symbol).to_string(), PriceSeries::from_closes(start, history));
        }
        provider
    }

    /// Set the current price for a symbol.
    pub fn set_price(&mut self, symbol: impl Into<String>, price: f64) {
        self.quotes.insert(symbol.into(), price);
    }

    /// Set the price history for a symbol.
    pub fn set_history(&mut self, symbol: impl Into<String>, series: PriceSeries) {
        self.histories.insert(symbol.into(), series);
    }
}

impl PriceProvider for FixedPriceProvider {
    fn current_price(&self, symbol: &str) -> Result<f64, ProviderError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ProviderError::InvalidRequest("empty symbol".into()));
        }
        self.quotes
            .get(&symbol)
            .copied()
            .ok_or(ProviderError::PriceUnavailable(symbol))
    }

    fn price_history(&self, symbol: &str, days: usize) -> Result<PriceSeries, ProviderError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ProviderError::InvalidRequest("empty symbol".into()));
        }
        if days == 0 {
            return Err(ProviderError::InvalidRequest("history range is zero days".into()));
        }
        let series = self
            .histories
            .get(&symbol)
            .ok_or(ProviderError::HistoryUnavailable(symbol))?;
        // Take the most recent `days` points
        let skip = series.len().saturating_sub(days);
        let points: Vec<PricePoint> = series.points.iter().skip(skip).copied().collect();
        Ok(PriceSeries::new(points))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_quotes() {
        let provider = FixedPriceProvider::with_sample_data();
        assert!((provider.current_price("AAPL").unwrap() - 195.50).abs() < 1e-12);
        assert!((provider.current_price("tcs").unwrap() - 3850.00).abs() < 1e-12);
        assert!((provider.current_price(" wipro ").unwrap() - 245.30).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_symbol_errors() {
        let provider = FixedPriceProvider::with_sample_data();
        assert!(matches!(
            provider.current_price("ZZZZ"),
            Err(ProviderError::PriceUnavailable(_))
        ));
        assert!(matches!(
            provider.price_history("ZZZZ", 8),
            Err(ProviderError::HistoryUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_requests() {
        let provider = FixedPriceProvider::with_sample_data();
        assert!(matches!(
            provider.current_price("  "),
            Err(ProviderError::InvalidRequest(_))
        ));
        assert!(matches!(
            provider.price_history("AAPL", 0),
            Err(ProviderError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_history_truncates_to_most_recent_days() {
        let provider = FixedPriceProvider::with_sample_data();
        let series = provider.price_history("AAPL", 3).unwrap();
        assert_eq!(series.len(), 3);
        // Last sample close survives truncation
        assert!((series.points.last().unwrap().close - 195.5).abs() < 1e-12);
    }

    #[test]
    fn test_history_shorter_than_requested() {
        let provider = FixedPriceProvider::with_sample_data();
        let series = provider.price_history("AAPL", 30).unwrap();
        assert_eq!(series.len(), 8);
    }

    #[test]
    fn test_custom_entries_override() {
        let mut provider = FixedPriceProvider::new();
        provider.set_price("TEST", 42.0);
        assert!((provider.current_price("TEST").unwrap() - 42.0).abs() < 1e-12);
    }
}
