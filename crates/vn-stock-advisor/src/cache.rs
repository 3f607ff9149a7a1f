//! Caching layer for fetched price histories
//!
//! Only raw provider output is cached. Analysis results are always
//! recomputed from the cached bars.

use cached::{Cached, TimedCache};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::data::PriceBar;

/// Cache key for a price history request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Ticker as requested, upper-cased
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(symbol: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            start,
            end,
        }
    }
}

/// Thread-safe TTL cache of price histories
pub struct StockCache {
    cache: Arc<RwLock<TimedCache<CacheKey, Vec<PriceBar>>>>,
}

impl StockCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<PriceBar>> {
        // TimedCache evicts on read, so reads need the write lock
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: CacheKey, bars: Vec<PriceBar>) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, bars);
    }

    /// Get or fetch a value using the provided fetcher function
    ///
    /// A cache hit returns immediately. On a miss the fetcher runs and a
    /// successful result is stored; errors are returned and not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<Vec<PriceBar>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<PriceBar>, E>>,
    {
        if let Some(bars) = self.get(&key).await {
            tracing::debug!(symbol = %key.symbol, bars = bars.len(), "Cache hit");
            return Ok(bars);
        }

        tracing::debug!(symbol = %key.symbol, start = %key.start, end = %key.end, "Cache miss");

        let bars = fetcher().await?;
        self.insert(key, bars.clone()).await;

        Ok(bars)
    }

    /// Invalidate a specific cache entry
    pub async fn invalidate(&self, key: &CacheKey) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(key);
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for StockCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn sample_bars() -> Vec<PriceBar> {
        vec![PriceBar::new(date(3), 25.0, 25.5, 24.8, 25.2, 1_000.0)]
    }

    #[test]
    fn test_cache_key_normalizes_symbol() {
        let key = CacheKey::new(" hpg ", date(1), date(20));
        assert_eq!(key.symbol, "HPG");
        assert_eq!(key, CacheKey::new("HPG", date(1), date(20)));
        assert_ne!(key, CacheKey::new("HPG", date(2), date(20)));
    }

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = StockCache::new(Duration::from_secs(60));
        let key = CacheKey::new("FPT", date(1), date(20));

        cache.insert(key.clone(), sample_bars()).await;

        assert_eq!(cache.get(&key).await, Some(sample_bars()));
    }

    #[tokio::test]
    async fn test_cache_get_or_fetch() {
        let cache = StockCache::new(Duration::from_secs(60));
        let key = CacheKey::new("VNM", date(1), date(20));

        let mut call_count = 0;
        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(sample_bars()) }
            })
            .await
            .unwrap();
        assert_eq!(result, sample_bars());
        assert_eq!(call_count, 1);

        // Second call should use cache
        let result = cache
            .get_or_fetch(key.clone(), || {
                call_count += 1;
                async { Ok::<_, String>(Vec::new()) }
            })
            .await
            .unwrap();
        assert_eq!(result, sample_bars());
        assert_eq!(call_count, 1);
    }

    #[test]
    fn test_fetch_errors_are_not_cached() {
        let cache = StockCache::new(Duration::from_secs(60));
        let key = CacheKey::new("MWG", date(1), date(20));

        let result = tokio_test::block_on(
            cache.get_or_fetch(key, || async { Err::<Vec<PriceBar>, _>("offline") }),
        );
        assert_eq!(result, Err("offline"));
        assert!(tokio_test::block_on(cache.is_empty()));
    }

    #[tokio::test]
    async fn test_cache_invalidation_and_clear() {
        let cache = StockCache::new(Duration::from_secs(60));
        let key = CacheKey::new("HPG", date(1), date(20));

        cache.insert(key.clone(), sample_bars()).await;
        cache.invalidate(&key).await;
        assert!(cache.get(&key).await.is_none());

        for symbol in ["HPG", "FPT", "VNM"] {
            cache.insert(CacheKey::new(symbol, date(1), date(20)), sample_bars()).await;
        }
        assert_eq!(cache.len().await, 3);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = StockCache::new(Duration::from_secs(1));
        let key = CacheKey::new("SSI", date(1), date(20));

        cache.insert(key.clone(), sample_bars()).await;
        tokio::time::sleep(Duration::from_millis(1_200)).await;
        assert!(cache.get(&key).await.is_none());
    }
}
