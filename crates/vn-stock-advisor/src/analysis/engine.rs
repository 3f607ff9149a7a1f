//! Technical analysis engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::indicators::{IndicatorRow, compute_indicators};
use super::levels::{SupportResistance, find_support_resistance};
use super::params::IndicatorParams;
use super::summary::{AnalysisSummary, summarize};
use crate::data::PriceBar;
use crate::error::{Result, StockError};

/// Everything derived from one price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    /// One row per input bar, oldest first
    pub rows: Vec<IndicatorRow>,
    pub levels: SupportResistance,
    pub summary: AnalysisSummary,
    pub params: IndicatorParams,
}

impl TechnicalAnalysis {
    /// Indicator row of the most recent bar
    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// Close of the most recent bar
    pub fn current_price(&self) -> f64 {
        self.summary.snapshot.price
    }

    /// Date of the most recent bar
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.latest().map(|row| row.date)
    }

    /// The last `n` rows, oldest first
    pub fn recent(&self, n: usize) -> &[IndicatorRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }
}

/// Pure analysis over an ordered price history
///
/// The engine holds no state besides its parameters; the same bars always
/// produce the same [`TechnicalAnalysis`].
///
/// # Example
///
/// ```
/// use vn_stock_advisor::{PriceBar, TechnicalEngine};
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
/// let bars: Vec<PriceBar> = (0..30_i32)
///     .map(|i| {
///         let close = 25.0 + f64::from(i) * 0.1;
///         PriceBar::new(start + Duration::days(i64::from(i)), close, close + 0.2, close - 0.2, close, 1_000_000.0)
///     })
///     .collect();
///
/// let analysis = TechnicalEngine::new().analyze(&bars).unwrap();
/// assert_eq!(analysis.rows.len(), 30);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TechnicalEngine {
    params: IndicatorParams,
}

impl TechnicalEngine {
    /// Engine with the production parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with custom parameters
    pub fn with_params(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Analyze an ascending price history
    ///
    /// Fails with [`StockError::InsufficientData`] below the minimum length
    /// and with [`StockError::InvalidRecord`] when dates are not strictly
    /// ascending or a value is not finite. Nothing is computed on failure.
    pub fn analyze(&self, bars: &[PriceBar]) -> Result<TechnicalAnalysis> {
        self.params.validate()?;

        if bars.len() < self.params.min_bars {
            return Err(StockError::InsufficientData {
                bars: bars.len(),
                required: self.params.min_bars,
            });
        }
        check_bars(bars)?;

        let rows = compute_indicators(bars, &self.params)?;
        let Some(last) = rows.last() else {
            return Err(StockError::InsufficientData {
                bars: 0,
                required: self.params.min_bars,
            });
        };

        let current_price = last.close;
        let levels = find_support_resistance(bars, current_price, &self.params);
        let summary = summarize(last, current_price, &self.params.thresholds);

        debug!(
            bars = bars.len(),
            price = current_price,
            resistance = levels.resistance.len(),
            support = levels.support.len(),
            signals = summary.signals.len(),
            "Technical analysis complete"
        );

        Ok(TechnicalAnalysis {
            rows,
            levels,
            summary,
            params: self.params.clone(),
        })
    }
}

fn check_bars(bars: &[PriceBar]) -> Result<()> {
    for (index, bar) in bars.iter().enumerate() {
        let values = [bar.open, bar.high, bar.low, bar.close, bar.volume];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(StockError::InvalidRecord {
                index,
                reason: "non-finite price or volume".to_string(),
            });
        }
        if index > 0 && bar.date <= bars[index - 1].date {
            return Err(StockError::InvalidRecord {
                index,
                reason: format!(
                    "date {} does not follow {}",
                    bar.date,
                    bars[index - 1].date
                ),
            });
        }
    }
    Ok(())
}
