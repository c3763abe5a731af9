//! Short-TTL memoization for current quotes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::{Quote, Symbol};

/// Maximum age before a cached quote must be refetched.
pub const QUOTE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CacheEntry {
    quote: Quote,
    stored_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<Symbol, CacheEntry>,
    ttl: Duration,
}

impl CacheInner {
    fn new(ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            ttl,
        }
    }

    fn get_fresh(&self, symbol: &Symbol) -> Option<Quote> {
        self.map.get(symbol).and_then(|entry| {
            if entry.stored_at.elapsed() < self.ttl {
                Some(entry.quote.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, quote: Quote) {
        let entry = CacheEntry {
            stored_at: Instant::now(),
            quote,
        };
        self.map.insert(entry.quote.symbol.clone(), entry);
    }
}

/// Thread-safe quote cache keyed by logical symbol.
///
/// Explicitly owned by the engine instance, never process-global. Stale
/// entries are superseded on refresh rather than deleted; concurrent
/// refreshes resolve last-writer-wins.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(ttl))),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(QUOTE_TTL)
    }

    /// Return the cached quote if present and younger than the TTL.
    pub async fn get_fresh(&self, symbol: &Symbol) -> Option<Quote> {
        let store = self.inner.read().await;
        store.get_fresh(symbol)
    }

    /// Store a quote, superseding any previous entry for its symbol.
    pub async fn put(&self, quote: Quote) {
        let mut store = self.inner.write().await;
        store.put(quote);
    }

    /// Number of entries, fresh or stale.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
