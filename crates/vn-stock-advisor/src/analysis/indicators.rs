//! Indicator table computation
//!
//! One [`IndicatorRow`] per input bar. Rolling values stay `None` until
//! their window fills; EMA-based values (and therefore MACD) are defined
//! from the first bar.

use serde::{Deserialize, Serialize};

use super::params::IndicatorParams;
use super::rolling::{ema, ratio, rolling_std, sma};
use crate::data::PriceBar;
use crate::error::Result;

/// RSI reported when it cannot be computed (no losses in the window, or the
/// window has not filled yet)
pub const NEUTRAL_RSI: f64 = 50.0;

/// Volume ratio reported when the volume average is zero
pub const FLAT_VOLUME_RATIO: f64 = 1.0;

/// Derived indicator values for one bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: chrono::NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub sma_short: Option<f64>,
    pub sma_medium: Option<f64>,
    pub sma_long: Option<f64>,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub rsi: f64,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub volume_sma_short: Option<f64>,
    pub volume_sma_medium: Option<f64>,
    pub volume_sma_long: Option<f64>,
    pub volume_ratio_short: Option<f64>,
    pub volume_ratio_medium: Option<f64>,
    pub obv: f64,
}

/// RSI from simple averages of zero-floored gains and losses
///
/// The first bar contributes a change of zero, so the averages are defined
/// from bar `period − 1`. Undefined values and zero average loss both map
/// to [`NEUTRAL_RSI`].
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let changes: Vec<f64> = std::iter::once(0.0)
        .chain(closes.windows(2).map(|w| w[1] - w[0]))
        .take(closes.len())
        .collect();
    let gains: Vec<f64> = changes.iter().map(|c| c.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|c| (-c).max(0.0)).collect();

    sma(&gains, period)
        .into_iter()
        .zip(sma(&losses, period))
        .map(|(gain, loss)| match (gain, loss) {
            (Some(gain), Some(loss)) if loss != 0.0 => 100.0 - 100.0 / (1.0 + gain / loss),
            _ => NEUTRAL_RSI,
        })
        .collect()
}

/// On-balance volume as a left fold over the bars
///
/// Seeded with the first bar's volume; each later bar adds its volume on an
/// up close, subtracts it on a down close, and carries the total on a flat
/// close.
pub fn on_balance_volume(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .scan(None::<(f64, f64)>, |state, bar| {
            let total = match *state {
                None => bar.volume,
                Some((prev_close, total)) if bar.close > prev_close => total + bar.volume,
                Some((prev_close, total)) if bar.close < prev_close => total - bar.volume,
                Some((_, total)) => total,
            };
            *state = Some((bar.close, total));
            Some(total)
        })
        .collect()
}

/// Compute the full indicator table
///
/// Does not check the minimum length; [`super::TechnicalEngine`] does.
pub fn compute_indicators(bars: &[PriceBar], params: &IndicatorParams) -> Result<Vec<IndicatorRow>> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let sma_short = sma(&closes, params.sma_short);
    let sma_medium = sma(&closes, params.sma_medium);
    let sma_long = sma(&closes, params.sma_long);

    let ema_fast = ema(&closes, params.ema_fast)?;
    let ema_slow = ema(&closes, params.ema_slow)?;
    let macd: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let macd_signal = ema(&macd, params.macd_signal)?;

    let rsi = rsi(&closes, params.rsi_period);

    let bb_middle = sma(&closes, params.bollinger_period);
    let bb_std = rolling_std(&closes, params.bollinger_period);

    let volume_sma_short = sma(&volumes, params.volume_short);
    let volume_sma_medium = sma(&volumes, params.volume_medium);
    let volume_sma_long = sma(&volumes, params.volume_long);
    let volume_ratio_short = ratio(&volumes, &volume_sma_short, FLAT_VOLUME_RATIO);
    let volume_ratio_medium = ratio(&volumes, &volume_sma_medium, FLAT_VOLUME_RATIO);

    let obv = on_balance_volume(bars);

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let band = |sign: f64| {
                bb_middle[i]
                    .zip(bb_std[i])
                    .map(|(mid, std)| mid + sign * params.bollinger_width * std)
            };
            IndicatorRow {
                date: bar.date,
                close: bar.close,
                volume: bar.volume,
                sma_short: sma_short[i],
                sma_medium: sma_medium[i],
                sma_long: sma_long[i],
                ema_fast: ema_fast[i],
                ema_slow: ema_slow[i],
                macd: macd[i],
                macd_signal: macd_signal[i],
                macd_hist: macd[i] - macd_signal[i],
                rsi: rsi[i],
                bb_upper: band(1.0),
                bb_middle: bb_middle[i],
                bb_lower: band(-1.0),
                volume_sma_short: volume_sma_short[i],
                volume_sma_medium: volume_sma_medium[i],
                volume_sma_long: volume_sma_long[i],
                volume_ratio_short: volume_ratio_short[i],
                volume_ratio_medium: volume_ratio_medium[i],
                obv: obv[i],
            }
        })
        .collect();

    Ok(rows)
}
