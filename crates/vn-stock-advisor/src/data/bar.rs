//! Daily OHLCV bar

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of price history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Create a bar
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Sort bars by date and drop duplicate dates, keeping the last bar of each day
///
/// Providers sometimes append an intraday snapshot for the current session
/// next to the daily bar; the later one wins.
pub fn normalize_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    // Stable sort keeps arrival order among equal dates.
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}
