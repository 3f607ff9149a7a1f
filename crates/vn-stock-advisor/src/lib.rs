//! Technical data engine for Vietnamese equities
//!
//! Turns a daily price history into the technical picture a stock
//! advisor crew works from:
//!
//! - indicators per bar (SMA 20/50/200, EMA 12/26, MACD, RSI 14,
//!   Bollinger Bands, volume averages, OBV)
//! - support and resistance levels from clustered pivot points
//! - a rule-based assessment of trend, momentum and volume
//! - a localized text report (Vietnamese or English)
//!
//! Price history comes from a [`PriceHistoryProvider`]: Yahoo Finance
//! ([`YahooFinanceClient`]) behind a TTL cache, or bars held in memory
//! ([`StaticProvider`]). Agents reach the engine through the
//! `technical_data` tool ([`tools::TechnicalDataTool`]).
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use vn_stock_advisor::{PriceBar, TechnicalEngine};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let bars: Vec<PriceBar> = (0..60_i32)
//!     .map(|i| {
//!         let close = 25_000.0 + f64::from(i) * 50.0;
//!         PriceBar::new(start + Duration::days(i64::from(i)), close, close + 100.0, close - 100.0, close, 1_000_000.0)
//!     })
//!     .collect();
//!
//! let analysis = TechnicalEngine::new().analyze(&bars).unwrap();
//! assert_eq!(analysis.rows.len(), 60);
//! assert!(analysis.latest().unwrap().sma_short.is_some());
//! ```

pub mod agents;
pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod provider;
pub mod report;
pub mod tools;

pub use agents::TechnicalAnalystAgent;
pub use analysis::{IndicatorParams, SignalThresholds, TechnicalAnalysis, TechnicalEngine};
pub use api::YahooFinanceClient;
pub use cache::StockCache;
pub use config::StockConfig;
pub use data::{PriceBar, bars_from_records};
pub use error::{Result, StockError};
pub use provider::{CachedProvider, PriceHistoryProvider, StaticProvider, normalize_symbol};
pub use report::{Language, ReportFormat};
pub use tools::TechnicalDataTool;
