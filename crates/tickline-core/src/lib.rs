//! # Tickline Core
//!
//! Client-side access engine for a remote historical/real-time market-data
//! service. Translates symbol/timeframe requests into authenticated HTTP
//! calls, decodes tabular and JSON responses, and derives market facts:
//! current quotes, aggregated OHLCV bars, and trading-session
//! classification.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Short-TTL quote memoization |
//! | [`config`] | Engine configuration and credential validation |
//! | [`contract`] | Static symbol-to-continuous-contract mapping |
//! | [`decode`] | Tabular, JSON, and fixed-point decoders |
//! | [`domain`] | Domain models (Quote, Bar, Symbol, Timeframe) |
//! | [`engine`] | Quote cache front, bar pipeline, session lookup |
//! | [`error`] | Error taxonomy |
//! | [`http_client`] | HTTP client abstraction |
//! | [`session`] | Trading-session classifier |
//! | [`transport`] | Authenticated transport with classified retry |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickline_core::{EngineConfig, MarketDataEngine, Timeframe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::from_env()?;
//!     let engine = MarketDataEngine::new(config);
//!
//!     let quote = engine.get_quote("ES").await?;
//!     println!("ES mid: {:.2}", quote.price);
//!
//!     let bars = engine.get_historical_bars("NQ", Timeframe::H4, 10).await?;
//!     println!("{} four-hour bars", bars.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Classes
//!
//! All operations return [`FeedError`]: configuration errors are raised at
//! construction before any network call; transport errors surface only
//! after the retry budget is spent or a non-retryable status is seen;
//! decode and no-data errors are never retried.

pub mod cache;
pub mod config;
pub mod contract;
pub mod decode;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http_client;
pub mod session;
pub mod transport;

pub use cache::{QuoteCache, QUOTE_TTL};
pub use config::{ConfigError, EngineConfig, API_KEY_ENV, API_KEY_PREFIX, DEFAULT_BASE_URL};
pub use contract::{continuous_contract, DATASET, STYPE_CONTINUOUS};
pub use decode::{
    decode_json, decode_price, decode_response, parse_table, DecodeError, DecodedResponse, Record,
    ResponseFormat, PRICE_SCALE,
};
pub use domain::{Bar, Quote, Symbol, Timeframe, UtcDateTime};
pub use engine::MarketDataEngine;
pub use error::{FeedError, ValidationError};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use session::{classify, SessionInfo, TradingSession};
pub use transport::{Backoff, FormValue, RetryPolicy, Transport, TransportError, TransportErrorKind};
