//! Market data types for the risk engine.
//!
//! The engine never fetches anything itself: `MarketData` is a plain
//! value assembled before invocation, either by hand or through the
//! [`PriceProvider`] trait.

mod provider;
pub mod returns;

pub use provider::{FixedPriceProvider, PriceProvider, ProviderError};
pub use returns::{DailyReturn, ReturnSeries};

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Data Types
// ============================================================================

/// One closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Raw price history for one symbol.
///
/// May arrive unsorted, with duplicate dates or junk closes; the
/// normalizer in [`returns`] cleans it up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    /// Build a series from consecutive daily closes starting at `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close: *close,
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest close by date, if any point is present.
    pub fn latest_close(&self) -> Option<f64> {
        self.points
            .iter()
            .max_by_key(|p| p.date)
            .map(|p| p.close)
    }
}

// ============================================================================
// Market Data
// ============================================================================

/// Current prices and histories for the symbols under analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketData {
    /// Current price per symbol
    pub current_prices: HashMap<String, f64>,
    /// Price history per symbol
    pub histories: HashMap<String, PriceSeries>,
}

impl MarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current price for a symbol.
    pub fn with_price(mut self, symbol: impl Into<String>, price: f64) -> Self {
        self.current_prices.insert(symbol.into(), price);
        self
    }

    /// Set the price history for a symbol.
    pub fn with_history(mut self, symbol: impl Into<String>, series: PriceSeries) -> Self {
        self.histories.insert(symbol.into(), series);
        self
    }

    /// Gather prices and histories for `symbols` from a provider.
    ///
    /// Missing data is skipped rather than failing: the engine degrades
    /// per symbol and surfaces warnings in the result.
    pub fn gather<P: PriceProvider + ?Sized>(
        provider: &P,
        symbols: &[String],
        history_days: usize,
    ) -> Self {
        let mut data = Self::new();
        for symbol in symbols {
            match provider.current_price(symbol) {
                Ok(price) => {
                    data.current_prices.insert(symbol.clone(), price);
                }
                Err(err) => {
                    tracing::warn!(symbol = %symbol, error = %err, "current price unavailable");
                }
            }
            match provider.price_history(symbol, history_days) {
                Ok(series) => {
                    data.histories.insert(symbol.clone(), series);
                }
                Err(err) => {
                    tracing::warn!(symbol = %symbol, error = %err, "price history unavailable");
                }
            }
        }
        data
    }
}

// ============================================================================
// Tests
// ============================================================================
