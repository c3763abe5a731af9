use thiserror::Error;

use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::domain::Symbol;
use crate::transport::TransportError;

/// Validation and contract errors exposed by `tickline-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or digit: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid timeframe '{value}', expected one of 1m, 1h, 4h, 1d")]
    InvalidTimeframe { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("timestamp {nanos}ns is outside the representable range")]
    TimestampOutOfRange { nanos: i128 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,
}

/// Top-level error type for engine operations.
///
/// Each variant maps to one failure class: configuration problems are fatal
/// and raised before any network call; transport errors have already
/// consumed the retry budget; decode and no-data errors are never retried.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode {context} for {symbol}: {source}")]
    Decode {
        symbol: Symbol,
        context: String,
        #[source]
        source: DecodeError,
    },

    #[error("no data available for {symbol} ({context})")]
    NoData { symbol: Symbol, context: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl FeedError {
    pub fn decode(symbol: &Symbol, context: impl Into<String>, source: DecodeError) -> Self {
        Self::Decode {
            symbol: symbol.clone(),
            context: context.into(),
            source,
        }
    }

    pub fn no_data(symbol: &Symbol, context: impl Into<String>) -> Self {
        Self::NoData {
            symbol: symbol.clone(),
            context: context.into(),
        }
    }
}
