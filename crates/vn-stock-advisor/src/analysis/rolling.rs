//! Rolling-window primitives shared by the indicators
//!
//! Windows are counted in bars. A value is `None` until its window has
//! filled; each window is summed afresh so results do not drift with
//! series length.

use ta::{Next, indicators::ExponentialMovingAverage};

use crate::error::{Result, StockError};

fn windowed<F>(values: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                None
            } else {
                Some(f(&values[i + 1 - window..=i]))
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Simple moving average over the trailing `window` values
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    windowed(values, window, mean)
}

/// Rolling sample standard deviation (n − 1 denominator)
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    windowed(values, window, |w| {
        let m = mean(w);
        let ss: f64 = w.iter().map(|x| (x - m) * (x - m)).sum();
        (ss / (w.len() - 1) as f64).sqrt()
    })
}

/// Exponential moving average with α = 2/(span+1), seeded by the first value
///
/// Every position is defined: the first output equals the first input and
/// each later one is `α·x + (1−α)·prev`.
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(span)
        .map_err(|e| StockError::ConfigError(format!("EMA span {span}: {e}")))?;
    Ok(values.iter().map(|&v| ema.next(v)).collect())
}

/// Element-wise `numerator / denominator`
///
/// Undefined where the denominator is undefined; `zero_fallback` where the
/// denominator is exactly zero.
pub fn ratio(numerator: &[f64], denominator: &[Option<f64>], zero_fallback: f64) -> Vec<Option<f64>> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(n, d)| match d {
            Some(d) if *d == 0.0 => Some(zero_fallback),
            Some(d) => Some(n / d),
            None => None,
        })
        .collect()
}
