//! Market data access engine: quote cache, bar pipeline, session lookup.

use std::sync::Arc;

use time::Duration;
use tracing::debug;

use crate::cache::QuoteCache;
use crate::config::EngineConfig;
use crate::contract::{continuous_contract, DATASET, STYPE_CONTINUOUS};
use crate::decode::{parse_table, Record};
use crate::domain::{Bar, Quote, Symbol, Timeframe, UtcDateTime};
use crate::error::{FeedError, ValidationError};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::session::{classify, SessionInfo};
use crate::transport::{FormValue, Transport};

/// Extra lookback absorbing weekends and holidays with no ticks.
const LOOKBACK_PAD: Duration = Duration::days(7);

/// Top-of-book schema serving current quotes.
const QUOTE_SCHEMA: &str = "mbp-1";

const TIMESERIES_PATH: &str = "timeseries.get_range";

/// Client-side access layer over the historical market-data service.
///
/// One instance owns its transport and quote cache; multiple instances do
/// not share state. All calls are request/response with no background work.
pub struct MarketDataEngine {
    transport: Transport,
    cache: QuoteCache,
}

impl MarketDataEngine {
    /// Build an engine with the production HTTP client.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    /// Build an engine over a caller-supplied HTTP client.
    pub fn with_http_client(config: EngineConfig, http: Arc<dyn HttpClient>) -> Self {
        let cache = QuoteCache::new(config.quote_ttl);
        let transport = Transport::new(&config, http);
        Self { transport, cache }
    }

    /// Current quote for a logical symbol, served from cache when fresh.
    ///
    /// There is no in-flight de-duplication: two callers missing the cache
    /// at the same time each fetch upstream and the last write wins.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, FeedError> {
        let symbol = Symbol::parse(symbol)?;

        if let Some(hit) = self.cache.get_fresh(&symbol).await {
            debug!(symbol = %symbol, "serving quote from cache");
            return Ok(hit);
        }

        let quote = self.fetch_quote(&symbol).await?;
        self.cache.put(quote.clone()).await;
        Ok(quote)
    }

    /// Historical bars, most-recent-last.
    ///
    /// The 4-hour timeframe has no native upstream bucket and is aggregated
    /// from hourly bars. Fewer than `count` available bars is not an error;
    /// whatever exists is returned.
    pub async fn get_historical_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Bar>, FeedError> {
        let symbol = Symbol::parse(symbol)?;
        let native_count = count.saturating_mul(timeframe.native_bars_per_bucket());
        let window = timeframe.native_step() * native_count as i32 + LOOKBACK_PAD;

        let end = UtcDateTime::now();
        let body = self
            .fetch_range(&symbol, timeframe.native_schema(), end - window, end)
            .await?;

        let rows = parse_table(&body);
        let context = format!("{timeframe} bars");
        if rows.is_empty() {
            return Err(FeedError::no_data(&symbol, context));
        }

        let mut bars = Vec::with_capacity(rows.len());
        for row in &rows {
            bars.push(decode_bar(&symbol, &context, row)?);
        }

        let mut bars = if timeframe.is_synthetic() {
            aggregate(&bars, timeframe.native_bars_per_bucket())?
        } else {
            bars
        };

        let keep_from = bars.len().saturating_sub(count);
        Ok(bars.split_off(keep_from))
    }

    /// Session classification; defaults to now and never touches the network.
    pub fn get_session_info(&self, timestamp: Option<UtcDateTime>) -> SessionInfo {
        classify(timestamp.unwrap_or_else(UtcDateTime::now))
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, FeedError> {
        let end = UtcDateTime::now();
        let body = self
            .fetch_range(symbol, QUOTE_SCHEMA, end - LOOKBACK_PAD, end)
            .await?;

        let rows = parse_table(&body);
        let Some(last) = rows.last() else {
            return Err(FeedError::no_data(symbol, "quote window"));
        };

        let wrap = |e| FeedError::decode(symbol, "quote", e);
        let bid = last.price("bid_px_00").map_err(wrap)?;
        let ask = last.price("ask_px_00").map_err(wrap)?;
        let ts_event = last.require_i64("ts_event").map_err(wrap)?;

        let timestamp = UtcDateTime::from_unix_nanos(ts_event)?;
        debug!(symbol = %symbol, bid, ask, "refreshed quote from upstream");
        Ok(Quote::from_book(symbol.clone(), bid, ask, timestamp)?)
    }

    async fn fetch_range(
        &self,
        symbol: &Symbol,
        schema: &str,
        start: UtcDateTime,
        end: UtcDateTime,
    ) -> Result<String, FeedError> {
        let contract = continuous_contract(symbol);
        let fields = [
            ("dataset", FormValue::text(DATASET)),
            ("symbols", FormValue::list([contract])),
            ("schema", FormValue::text(schema)),
            ("start", FormValue::text(start.format_rfc3339())),
            ("end", FormValue::text(end.format_rfc3339())),
            ("stype_in", FormValue::text(STYPE_CONTINUOUS)),
            ("encoding", FormValue::text("csv")),
        ];

        Ok(self.transport.post_form(TIMESERIES_PATH, &fields).await?)
    }
}

fn decode_bar(symbol: &Symbol, context: &str, row: &Record) -> Result<Bar, FeedError> {
    let wrap = |e| FeedError::decode(symbol, context, e);

    let ts_event = row.require_i64("ts_event").map_err(wrap)?;
    let timestamp = UtcDateTime::from_unix_nanos(ts_event)?;
    let open = row.price("open").map_err(wrap)?;
    let high = row.price("high").map_err(wrap)?;
    let low = row.price("low").map_err(wrap)?;
    let close = row.price("close").map_err(wrap)?;
    let volume = row.require_u64("volume").map_err(wrap)?;

    Ok(Bar::new(timestamp, open, high, low, close, volume)?)
}

/// Combine consecutive groups of `group_size` bars into coarser buckets.
///
/// Groups follow received order, not calendar alignment. A trailing group
/// shorter than `group_size` is still aggregated from whatever it holds.
fn aggregate(bars: &[Bar], group_size: usize) -> Result<Vec<Bar>, ValidationError> {
    bars.chunks(group_size)
        .map(|chunk| {
            let first = &chunk[0];
            let last = &chunk[chunk.len() - 1];
            let high = chunk.iter().map(|bar| bar.high).fold(f64::MIN, f64::max);
            let low = chunk.iter().map(|bar| bar.low).fold(f64::MAX, f64::min);
            let volume = chunk.iter().map(|bar| bar.volume).sum();
            Bar::new(first.ts, first.open, high, low, last.close, volume)
        })
        .collect()
}
