//! Portfolio input types: holdings, user profiles, effective positions,
//! and the valued snapshot the calculators read.
//!
//! Upstream validation is the Portfolio Input Provider's job, but the
//! engine re-validates defensively so bad input surfaces as an error
//! instead of NaN propagation.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::report::{DataQualityWarning, WarningKind};

/// Maximum accepted symbol length after trimming.
const MAX_SYMBOL_LEN: usize = 20;

// ============================================================================
// User Profile
// ============================================================================

/// Investor profile used as a risk-tolerance modifier by the
/// recommendation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserProfile {
    Beginner,
    Intermediate,
    Senior,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::Beginner
    }
}

impl std::fmt::Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Senior => write!(f, "senior"),
        }
    }
}

// ============================================================================
// Holding
// ============================================================================

/// A single lot in a portfolio, as delivered by the input provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol
    pub symbol: String,
    /// Number of shares, must be positive
    pub quantity: f64,
    /// Purchase price per share, must be non-negative
    pub purchase_price: f64,
    /// Optional purchase date
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
}

impl Holding {
    /// Create a holding without a purchase date.
    pub fn new(symbol: impl Into<String>, quantity: f64, purchase_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            purchase_price,
            purchase_date: None,
        }
    }

    /// Total cost of this lot.
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.purchase_price
    }

    /// Validate and normalize the holding.
    ///
    /// Symbols are trimmed and upper-cased. Rejects non-positive or
    /// non-finite quantities, negative or non-finite prices, and empty or
    /// over-long symbols.
    pub fn validated(&self) -> Result<Self> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN {
            return Err(EngineError::InvalidHolding {
                symbol: self.symbol.clone(),
                reason: format!("symbol must be 1-{} characters", MAX_SYMBOL_LEN),
            });
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(EngineError::InvalidHolding {
                symbol,
                reason: format!("quantity must be positive and finite, got {}", self.quantity),
            });
        }
        if !self.purchase_price.is_finite() || self.purchase_price < 0.0 {
            return Err(EngineError::InvalidHolding {
                symbol,
                reason: format!(
                    "purchase_price must be non-negative and finite, got {}",
                    self.purchase_price
                ),
            });
        }
        Ok(Self {
            symbol,
            quantity: self.quantity,
            purchase_price: self.purchase_price,
            purchase_date: self.purchase_date,
        })
    }
}

// ============================================================================
// Effective Position
// ============================================================================

/// Holdings of the same symbol merged into one scored position.
///
/// Quantity is summed; the purchase price is the value-weighted average
/// (total cost / total quantity). Original lots stay with the caller for
/// per-lot display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub purchase_price: f64,
    /// Number of input lots merged into this position
    pub merged_lots: usize,
}

impl Position {
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.purchase_price
    }
}

/// Validate all holdings and merge duplicate symbols into effective
/// positions, preserving first-seen input order.
pub fn merge_holdings(holdings: &[Holding]) -> Result<Vec<Position>> {
    if holdings.is_empty() {
        return Err(EngineError::EmptyPortfolio);
    }

    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, Position> = HashMap::new();

    for holding in holdings {
        let holding = holding.validated()?;
        match merged.get_mut(&holding.symbol) {
            Some(position) => {
                let total_cost = position.cost_basis() + holding.cost_basis();
                position.quantity += holding.quantity;
                position.purchase_price = total_cost / position.quantity;
                position.merged_lots += 1;
            }
            None => {
                order.push(holding.symbol.clone());
                merged.insert(
                    holding.symbol.clone(),
                    Position {
                        symbol: holding.symbol,
                        quantity: holding.quantity,
                        purchase_price: holding.purchase_price,
                        merged_lots: 1,
                    },
                );
            }
        }
    }

    Ok(order
        .into_iter()
        .map(|symbol| merged.remove(&symbol).expect("ordered symbol was merged"))
        .collect())
}

// ============================================================================
// Portfolio Snapshot
// ============================================================================

/// An effective position priced at current market value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuedPosition {
    pub position: Position,
    /// Current price per share (purchase price when the quote is missing)
    pub current_price: f64,
    /// Current market value of the position
    pub current_value: f64,
    /// Share of total portfolio value, as a fraction in [0, 1]
    pub weight: f64,
}

impl ValuedPosition {
    /// Unrealized gain/loss in percent of cost basis.
    /// Defined as 0 when the purchase price is zero.
    pub fn gain_loss_percent(&self) -> f64 {
        if self.position.purchase_price > 0.0 {
            (self.current_price - self.position.purchase_price) / self.position.purchase_price
                * 100.0
        } else {
            0.0
        }
    }

    /// Unrealized gain/loss amount.
    pub fn gain_loss_amount(&self) -> f64 {
        (self.current_price - self.position.purchase_price) * self.position.quantity
    }
}

/// Derived, read-only view of the portfolio at current prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Positions in input order, with value and weight
    pub positions: Vec<ValuedPosition>,
    /// Total current market value
    pub total_value: f64,
    /// Warnings for symbols that needed a price fallback
    pub warnings: Vec<DataQualityWarning>,
}

impl PortfolioSnapshot {
    /// Price the positions and derive weights.
    ///
    /// A position without a current price falls back to its purchase price
    /// and gets a `MissingCurrentPrice` warning. A zero or negative total
    /// value is a computation error: no meaningful weights exist.
    pub fn build(positions: Vec<Position>, current_prices: &HashMap<String, f64>) -> Result<Self> {
        let mut warnings = Vec::new();
        let mut priced: Vec<(Position, f64)> = Vec::with_capacity(positions.len());
        let mut total_value = 0.0;

        for position in positions {
            let current_price = match current_prices.get(&position.symbol) {
                Some(price) if price.is_finite() && *price > 0.0 => *price,
                _ => {
                    tracing::warn!(
                        symbol = %position.symbol,
                        fallback = position.purchase_price,
                        "no current price, falling back to purchase price"
                    );
                    warnings.push(DataQualityWarning::new(
                        position.symbol.clone(),
                        WarningKind::MissingCurrentPrice,
                        format!(
                            "no current price for {}; using purchase price {}",
                            position.symbol, position.purchase_price
                        ),
                    ));
                    position.purchase_price
                }
            };
            total_value += position.quantity * current_price;
            priced.push((position, current_price));
        }

        if !total_value.is_finite() || total_value <= 0.0 {
            return Err(EngineError::computation(
                "valuation",
                None,
                format!("total portfolio value is {}, cannot derive weights", total_value),
            ));
        }

        let positions = priced
            .into_iter()
            .map(|(position, current_price)| {
                let current_value = position.quantity * current_price;
                ValuedPosition {
                    weight: current_value / total_value,
                    position,
                    current_price,
                    current_value,
                }
            })
            .collect();

        Ok(Self {
            positions,
            total_value,
            warnings,
        })
    }

    /// Position weights in snapshot order.
    pub fn weights(&self) -> Vec<f64> {
        self.positions.iter().map(|p| p.weight).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
