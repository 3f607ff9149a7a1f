//! Engine parameters
//!
//! Window lengths and signal thresholds travel as one explicit value so a
//! test can pin them. [`IndicatorParams::default`] is the production set.

use serde::{Deserialize, Serialize};

use crate::error::{MIN_BARS, Result, StockError};

/// Thresholds used by the narrative rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// Band position above which price is "near the upper band"
    pub band_near_upper: f64,
    /// Band position below which price is "near the lower band"
    pub band_near_lower: f64,
    pub volume_very_high: f64,
    pub volume_high: f64,
    pub volume_low: f64,
    /// Volume / volume-SMA ratio that counts as a spike for confirmation
    pub volume_spike: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            band_near_upper: 0.8,
            band_near_lower: 0.2,
            volume_very_high: 2.0,
            volume_high: 1.5,
            volume_low: 0.5,
            volume_spike: 1.5,
        }
    }
}

/// Window lengths and thresholds for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub sma_short: usize,
    pub sma_medium: usize,
    pub sma_long: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_width: f64,
    pub volume_short: usize,
    pub volume_medium: usize,
    pub volume_long: usize,
    /// Bars in the centered window used to detect pivots
    pub pivot_window: usize,
    /// Relative gap under which neighbouring levels merge
    pub cluster_threshold: f64,
    /// Support and resistance levels reported on each side
    pub max_levels: usize,
    pub min_bars: usize,
    pub thresholds: SignalThresholds,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_medium: 50,
            sma_long: 200,
            ema_fast: 12,
            ema_slow: 26,
            macd_signal: 9,
            rsi_period: 14,
            bollinger_period: 20,
            bollinger_width: 2.0,
            volume_short: 10,
            volume_medium: 20,
            volume_long: 50,
            pivot_window: 10,
            cluster_threshold: 0.03,
            max_levels: 3,
            min_bars: MIN_BARS,
            thresholds: SignalThresholds::default(),
        }
    }
}

impl IndicatorParams {
    /// Validate the parameter set
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("sma_short", self.sma_short),
            ("sma_medium", self.sma_medium),
            ("sma_long", self.sma_long),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("macd_signal", self.macd_signal),
            ("rsi_period", self.rsi_period),
            ("volume_short", self.volume_short),
            ("volume_medium", self.volume_medium),
            ("volume_long", self.volume_long),
            ("pivot_window", self.pivot_window),
            ("min_bars", self.min_bars),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(StockError::ConfigError(format!("{name} must be greater than 0")));
        }

        // Sample standard deviation needs two points
        if self.bollinger_period < 2 {
            return Err(StockError::ConfigError(
                "bollinger_period must be at least 2".to_string(),
            ));
        }

        if !(self.cluster_threshold > 0.0 && self.cluster_threshold.is_finite()) {
            return Err(StockError::ConfigError(
                "cluster_threshold must be a positive number".to_string(),
            ));
        }

        if self.thresholds.rsi_oversold >= self.thresholds.rsi_overbought {
            return Err(StockError::ConfigError(
                "rsi_oversold must be below rsi_overbought".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        let params = IndicatorParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.sma_long, 200);
        assert_eq!((params.ema_fast, params.ema_slow, params.macd_signal), (12, 26, 9));
        assert_eq!(params.min_bars, 5);
    }

    #[test]
    fn test_zero_window_rejected() {
        let params = IndicatorParams {
            rsi_period: 0,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("rsi_period"));
    }

    #[test]
    fn test_bollinger_period_needs_two_points() {
        let params = IndicatorParams {
            bollinger_period: 1,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_inverted_rsi_thresholds_rejected() {
        let params = IndicatorParams {
            thresholds: SignalThresholds {
                rsi_oversold: 80.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
