//! Yahoo Finance price history client
//!
//! HOSE/HNX tickers are listed on Yahoo with a `.VN` suffix (`HPG.VN`).
//! Bare tickers get the configured suffix; symbols that already carry an
//! exchange suffix or are indices (`^VNINDEX`) are sent unchanged.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::config::StockConfig;
use crate::data::{PriceBar, normalize_bars};
use crate::error::{Result, StockError};
use crate::provider::PriceHistoryProvider;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Yahoo Finance API client
#[derive(Clone)]
pub struct YahooFinanceClient {
    config: Arc<StockConfig>,
    rate_limiter: SharedRateLimiter,
}

/// Ticker as Yahoo lists it
pub fn yahoo_symbol(symbol: &str, suffix: Option<&str>) -> String {
    let symbol = symbol.trim().to_uppercase();
    match suffix {
        Some(suffix) if !symbol.contains('.') && !symbol.starts_with('^') => {
            format!("{symbol}{}", suffix.to_uppercase())
        }
        _ => symbol,
    }
}

fn to_offset(date: NaiveDate) -> Result<OffsetDateTime> {
    let timestamp = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| StockError::Other(format!("Invalid date: {date}")))?;
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| StockError::YahooFinanceError(format!("Invalid timestamp: {e}")))
}

fn to_bar(quote: &yahoo::Quote) -> Option<PriceBar> {
    let date = DateTime::from_timestamp(quote.timestamp as i64, 0)?.date_naive();
    Some(PriceBar::new(
        date,
        quote.open,
        quote.high,
        quote.low,
        quote.close,
        quote.volume as f64,
    ))
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(config: Arc<StockConfig>) -> Self {
        let quota = Quota::per_minute(
            NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN),
        );
        Self {
            config,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Ticker this client would request for `symbol`
    pub fn resolve_symbol(&self, symbol: &str) -> String {
        yahoo_symbol(symbol, self.config.symbol_suffix.as_deref())
    }

    /// One request, no retry
    async fn fetch_once(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceBar>> {
        self.rate_limiter.until_ready().await;

        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        // Yahoo's end bound is exclusive
        let start_odt = to_offset(start)?;
        let end_odt = to_offset(end + Duration::days(1))?;

        let request = provider.get_quote_history(ticker, start_odt, end_odt);
        let response = tokio::time::timeout(self.config.request_timeout, request)
            .await
            .map_err(|_| {
                StockError::YahooFinanceError(format!(
                    "request for {ticker} timed out after {:?}",
                    self.config.request_timeout
                ))
            })?
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(to_bar)
            .filter(|bar| bar.date >= start && bar.date <= end)
            .collect();

        Ok(normalize_bars(bars))
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    async fn history(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceBar>> {
        let ticker = self.resolve_symbol(symbol);
        let mut attempt = 0;

        loop {
            match self.fetch_once(&ticker, start, end).await {
                Ok(bars) if bars.is_empty() => {
                    return Err(StockError::DataUnavailable {
                        symbol: ticker,
                        reason: format!("no quotes between {start} and {end}"),
                    });
                }
                Ok(bars) => {
                    debug!(ticker = %ticker, bars = bars.len(), "Fetched price history");
                    return Ok(bars);
                }
                Err(e) if attempt + 1 < self.config.max_retries => {
                    let backoff = self.config.retry_backoff(attempt);
                    warn!(ticker = %ticker, attempt, error = %e, ?backoff, "Retrying Yahoo Finance request");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
