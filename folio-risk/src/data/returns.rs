//! Price series normalizer.
//!
//! Turns a raw price history into a clean daily return series: junk
//! closes dropped, dates sorted, duplicates resolved, and each return
//! tagged with its date so the correlation calculator can align pairs on
//! overlapping ranges.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PriceSeries;

// ============================================================================
// Return Types
// ============================================================================

/// One daily return, tagged with the later of its two trading dates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub value: f64,
}

/// Normalized daily returns for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub symbol: String,
    /// Chronological daily returns
    pub returns: Vec<DailyReturn>,
    /// Usable price points after cleaning
    pub usable_points: usize,
    /// Points dropped for non-finite or non-positive closes
    pub dropped_points: usize,
}

impl ReturnSeries {
    /// Whether enough data survived to compute statistics
    /// (at least two usable prices, so at least one return).
    pub fn is_sufficient(&self) -> bool {
        !self.returns.is_empty()
    }

    /// Return values without dates.
    pub fn values(&self) -> Vec<f64> {
        self.returns.iter().map(|r| r.value).collect()
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalize a raw price history into a daily return series.
///
/// Steps, in order: drop points whose close is NaN, infinite, or ≤ 0;
/// sort ascending by date; deduplicate by date keeping the last point
/// seen (a later correction supersedes an earlier quote); derive
/// `returns[i] = close[i]/close[i-1] - 1`.
pub fn normalize(symbol: &str, series: &PriceSeries) -> ReturnSeries {
    let mut usable: Vec<(NaiveDate, f64)> = series
        .points
        .iter()
        .filter(|p| p.close.is_finite() && p.close > 0.0)
        .map(|p| (p.date, p.close))
        .collect();
    let dropped_points = series.points.len() - usable.len();

    if dropped_points > 0 {
        tracing::debug!(
            symbol = %symbol,
            dropped = dropped_points,
            "dropped unusable price points during normalization"
        );
    }

    // Stable sort keeps input order within a date, so the last point
    // seen for a date wins the dedup below.
    usable.sort_by_key(|(date, _)| *date);
    let mut deduped: Vec<(NaiveDate, f64)> = Vec::with_capacity(usable.len());
    for (date, close) in usable {
        match deduped.last_mut() {
            Some(last) if last.0 == date => last.1 = close,
            _ => deduped.push((date, close)),
        }
    }

    let returns = deduped
        .windows(2)
        .map(|pair| DailyReturn {
            date: pair[1].0,
            value: pair[1].1 / pair[0].1 - 1.0,
        })
        .collect();

    ReturnSeries {
        symbol: symbol.to_string(),
        returns,
        usable_points: deduped.len(),
        dropped_points,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PricePoint;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn make_series(points: &[(u32, f64)]) -> PriceSeries {
        PriceSeries::new(
            points
                .iter()
                .map(|(day, close)| PricePoint {
                    date: date(*day),
                    close: *close,
                })
                .collect(),
        )
    }

    #[test]
    fn test_basic_returns() {
        let series = make_series(&[(2, 100.0), (3, 110.0), (4, 99.0)]);
        let normalized = normalize("TEST", &series);

        assert!(normalized.is_sufficient());
        assert_eq!(normalized.usable_points, 3);
        assert_eq!(normalized.dropped_points, 0);
        assert_eq!(normalized.returns.len(), 2);
        assert!((normalized.returns[0].value - 0.1).abs() < 1e-12);
        assert!((normalized.returns[1].value - -0.1).abs() < 1e-12);
        // Returns are tagged with the later date
        assert_eq!(normalized.returns[0].date, date(3));
        assert_eq!(normalized.returns[1].date, date(4));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let series = make_series(&[(4, 99.0), (2, 100.0), (3, 110.0)]);
        let normalized = normalize("TEST", &series);
        assert!((normalized.returns[0].value - 0.1).abs() < 1e-12);
        assert!((normalized.returns[1].value - -0.1).abs() < 1e-12);
    }

    #[test]
    fn test_junk_closes_dropped() {
        let series = make_series(&[(2, 100.0), (3, f64::NAN), (4, -5.0), (5, 0.0), (6, 110.0)]);
        let normalized = normalize("TEST", &series);
        assert_eq!(normalized.dropped_points, 3);
        assert_eq!(normalized.usable_points, 2);
        assert_eq!(normalized.returns.len(), 1);
        assert!((normalized.returns[0].value - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_date_last_wins() {
        let series = make_series(&[(2, 100.0), (3, 50.0), (3, 110.0)]);
        let normalized = normalize("TEST", &series);
        assert_eq!(normalized.usable_points, 2);
        assert_eq!(normalized.returns.len(), 1);
        // The later 110.0 correction supersedes the 50.0 quote
        assert!((normalized.returns[0].value - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_data() {
        let empty = normalize("TEST", &PriceSeries::default());
        assert!(!empty.is_sufficient());

        let single = normalize("TEST", &make_series(&[(2, 100.0)]));
        assert!(!single.is_sufficient());
        assert_eq!(single.usable_points, 1);

        let all_junk = normalize("TEST", &make_series(&[(2, f64::NAN), (3, 0.0)]));
        assert!(!all_junk.is_sufficient());
        assert_eq!(all_junk.dropped_points, 2);
    }

    #[test]
    fn test_flat_series_yields_zero_returns() {
        let series = make_series(&[(2, 100.0), (3, 100.0), (4, 100.0)]);
        let normalized = normalize("TEST", &series);
        assert!(normalized.is_sufficient());
        assert!(normalized.values().iter().all(|r| r.abs() < 1e-12));
    }
}
