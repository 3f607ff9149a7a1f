//! Price history providers
//!
//! The engine never fetches anything itself. Callers resolve a ticker and a
//! date range to bars through a [`PriceHistoryProvider`] and hand the bars
//! over.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use crate::cache::{CacheKey, StockCache};
use crate::data::{PriceBar, normalize_bars};
use crate::error::{Result, StockError};

/// Source of daily OHLCV history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Bars for `symbol` between `start` and `end` inclusive, oldest first
    async fn history(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceBar>>;

    /// Provider name for logs
    fn name(&self) -> &str {
        "provider"
    }
}

/// Trim and upper-case a ticker, rejecting anything that is not one
///
/// Accepts letters, digits and the `.`/`-`/`^` used by exchange suffixes
/// and index symbols.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= 20
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^'));
    if valid {
        Ok(symbol)
    } else {
        Err(StockError::InvalidSymbol(symbol))
    }
}

/// `(start, end)` covering `days` calendar days up to and including `end`
pub fn lookback(end: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    (end - Duration::days(i64::from(days)), end)
}

/// Provider over bars held in memory
///
/// Used for offline runs (bars loaded from a file) and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    histories: HashMap<String, Vec<PriceBar>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the history of one ticker; bars are normalized on the way in
    pub fn with_history(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    pub fn insert(&mut self, symbol: &str, bars: Vec<PriceBar>) {
        self.histories
            .insert(symbol.trim().to_uppercase(), normalize_bars(bars));
    }

    /// Tickers with a registered history, sorted
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.histories.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}

#[async_trait]
impl PriceHistoryProvider for StaticProvider {
    async fn history(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceBar>> {
        let key = symbol.trim().to_uppercase();
        let bars = self
            .histories
            .get(&key)
            .ok_or_else(|| StockError::DataUnavailable {
                symbol: key.clone(),
                reason: "no history loaded".to_string(),
            })?;

        Ok(bars
            .iter()
            .filter(|bar| bar.date >= start && bar.date <= end)
            .copied()
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Provider wrapper that memoizes histories for the cache TTL
pub struct CachedProvider<P> {
    inner: P,
    cache: StockCache,
}

impl<P: PriceHistoryProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: StockCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &StockCache {
        &self.cache
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: PriceHistoryProvider> PriceHistoryProvider for CachedProvider<P> {
    async fn history(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceBar>> {
        let key = CacheKey::new(symbol, start, end);
        self.cache
            .get_or_fetch(key, || self.inner.history(symbol, start, end))
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
