//! Error types for the risk engine.

use thiserror::Error;

/// Result type alias using the engine error type.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Unified error type for the risk engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error (bad weights, thresholds, bands)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Portfolio contains no holdings
    #[error("Empty portfolio: at least one holding is required")]
    EmptyPortfolio,

    /// A holding failed defensive validation
    #[error("Invalid holding '{symbol}': {reason}")]
    InvalidHolding { symbol: String, reason: String },

    /// A numeric stage produced a non-finite or meaningless result
    #[error("Computation error in {stage}: {detail}")]
    Computation { stage: &'static str, detail: String },
}

impl EngineError {
    /// Create a computation error, optionally naming the offending symbol.
    pub fn computation(stage: &'static str, symbol: Option<&str>, detail: impl Into<String>) -> Self {
        let detail = match symbol {
            Some(sym) => format!("[{}] {}", sym, detail.into()),
            None => detail.into(),
        };
        Self::Computation { stage, detail }
    }

    /// Check if this error is a validation error (caller sent bad input)
    /// as opposed to a computation failure.
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::EmptyPortfolio | Self::InvalidHolding { .. })
    }
}

/// Guard a computed value against NaN/Infinity leaking into the output.
pub fn ensure_finite(value: f64, stage: &'static str, symbol: Option<&str>) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::computation(
            stage,
            symbol,
            format!("produced a non-finite value ({})", value),
        ))
    }
}
