use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{Symbol, UtcDateTime, ValidationError};

/// Top-of-book quote for one instrument.
///
/// `price` is always the bid/ask midpoint. `timestamp` is the event time
/// reported by the venue, not the fetch time; the age of the data is derived
/// at read time via [`Quote::data_age`] and never stored. Quotes are
/// immutable and replaced, not mutated, on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub bid: f64,
    pub ask: f64,
    pub timestamp: UtcDateTime,
}

impl Quote {
    /// Build a quote from top-of-book prices, deriving the midpoint.
    pub fn from_book(
        symbol: Symbol,
        bid: f64,
        ask: f64,
        timestamp: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("bid", bid)?;
        validate_non_negative("ask", ask)?;

        Ok(Self {
            symbol,
            price: (bid + ask) / 2.0,
            bid,
            ask,
            timestamp,
        })
    }

    /// Age of the quote relative to `now`.
    pub fn data_age(&self, now: UtcDateTime) -> Duration {
        now - self.timestamp
    }
}

/// OHLCV bar for one fixed time bucket of one instrument.
///
/// Sequences of bars are ordered by ascending timestamp and assumed already
/// venue-ordered on receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(input: &str) -> UtcDateTime {
        UtcDateTime::parse(input).expect("timestamp")
    }

    #[test]
    fn quote_price_is_midpoint() {
        let symbol = Symbol::parse("ES").expect("symbol");
        let quote = Quote::from_book(symbol, 4500.0, 4502.0, ts("2024-01-01T00:00:00Z"))
            .expect("quote");
        assert_eq!(quote.price, 4501.0);
    }

    #[test]
    fn quote_age_is_derived_from_now() {
        let symbol = Symbol::parse("ES").expect("symbol");
        let quote = Quote::from_book(symbol, 1.0, 2.0, ts("2024-01-01T00:00:00Z")).expect("quote");
        let age = quote.data_age(ts("2024-01-01T00:00:45Z"));
        assert_eq!(age, Duration::seconds(45));
    }

    #[test]
    fn rejects_negative_book_price() {
        let symbol = Symbol::parse("ES").expect("symbol");
        let err = Quote::from_book(symbol, -1.0, 2.0, ts("2024-01-01T00:00:00Z"))
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::NegativeValue { field: "bid" }));
    }

    #[test]
    fn rejects_invalid_bar_bounds() {
        let err = Bar::new(ts("2024-01-01T00:00:00Z"), 10.0, 12.0, 9.0, 12.5, 10)
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidBarBounds));
    }

    #[test]
    fn rejects_inverted_bar_range() {
        let err = Bar::new(ts("2024-01-01T00:00:00Z"), 10.0, 9.0, 12.0, 10.0, 10)
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidBarRange));
    }
}
