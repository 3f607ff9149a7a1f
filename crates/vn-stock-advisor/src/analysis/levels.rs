//! Support and resistance detection
//!
//! Pivot highs seed resistance candidates and pivot lows seed support
//! candidates. Each candidate set is clustered on relative distance and
//! the nearest clusters on either side of the current price are kept.

use serde::{Deserialize, Serialize};

use super::params::IndicatorParams;
use crate::data::PriceBar;

/// Side of the price a level sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// A clustered price level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: f64,
    pub kind: LevelKind,
}

/// Nearest levels around the current price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    /// Ascending, nearest first
    pub resistance: Vec<Level>,
    /// Descending, nearest first
    pub support: Vec<Level>,
}

impl SupportResistance {
    /// Whether neither side produced a level
    pub fn is_empty(&self) -> bool {
        self.resistance.is_empty() && self.support.is_empty()
    }
}

/// Values that are extreme within their centered window
///
/// The window for index `i` spans `[i − window/2, i − window/2 + window − 1]`;
/// indices whose window would leave the series are skipped. `is_extreme`
/// receives the candidate and the window and decides.
fn pivots<F>(values: &[f64], window: usize, is_extreme: F) -> Vec<f64>
where
    F: Fn(f64, &[f64]) -> bool,
{
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    let half = window / 2;
    (half..=values.len() - window + half)
        .filter(|&i| is_extreme(values[i], &values[i - half..i - half + window]))
        .map(|i| values[i])
        .collect()
}

/// Highs that equal the maximum high of their centered window
pub fn pivot_highs(bars: &[PriceBar], window: usize) -> Vec<f64> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    pivots(&highs, window, |v, w| {
        v == w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Lows that equal the minimum low of their centered window
pub fn pivot_lows(bars: &[PriceBar], window: usize) -> Vec<f64> {
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    pivots(&lows, window, |v, w| {
        v == w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

fn joins(last: f64, value: f64, threshold: f64) -> bool {
    if last == 0.0 {
        return value == 0.0;
    }
    ((value - last) / last).abs() < threshold
}

/// Merge nearby levels
///
/// Values are sorted ascending and walked in order. A value joins the
/// running cluster when its relative distance to the cluster's last member
/// is below `threshold`; otherwise it opens a new cluster. Each cluster
/// collapses to its mean. Output is ascending.
pub fn cluster_levels(levels: &[f64], threshold: f64) -> Vec<f64> {
    let mut sorted = levels.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for value in sorted {
        match clusters.last_mut() {
            Some(cluster)
                if cluster
                    .last()
                    .is_some_and(|&last| joins(last, value, threshold)) =>
            {
                cluster.push(value);
            }
            _ => clusters.push(vec![value]),
        }
    }

    clusters
        .iter()
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect()
}

/// Find up to `max_levels` resistances above and supports below `current_price`
pub fn find_support_resistance(
    bars: &[PriceBar],
    current_price: f64,
    params: &IndicatorParams,
) -> SupportResistance {
    let mut resistance: Vec<f64> = cluster_levels(
        &pivot_highs(bars, params.pivot_window),
        params.cluster_threshold,
    )
    .into_iter()
    .filter(|&level| level > current_price)
    .collect();
    resistance.sort_by(f64::total_cmp);

    let mut support: Vec<f64> = cluster_levels(
        &pivot_lows(bars, params.pivot_window),
        params.cluster_threshold,
    )
    .into_iter()
    .filter(|&level| level < current_price)
    .collect();
    support.sort_by(|a, b| b.total_cmp(a));

    let to_levels = |prices: Vec<f64>, kind: LevelKind| -> Vec<Level> {
        prices
            .into_iter()
            .take(params.max_levels)
            .map(|price| Level { price, kind })
            .collect()
    };

    SupportResistance {
        resistance: to_levels(resistance, LevelKind::Resistance),
        support: to_levels(support, LevelKind::Support),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bars_hl(highs: &[f64], lows: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        highs
            .iter()
            .zip(lows)
            .enumerate()
            .map(|(i, (&h, &l))| {
                let mid = (h + l) / 2.0;
                PriceBar::new(start + Duration::days(i as i64), mid, h, l, mid, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_pivot_window_alignment() {
        // window 4 → index i covers [i-2, i+1]
        let highs = [1.0, 2.0, 5.0, 3.0, 2.0, 1.0, 4.0, 2.0];
        let lows = [0.0; 8];
        let bars = bars_hl(&highs, &lows);

        // i=2: [1,2,5,3] → pivot. i=6: [2,1,4,2] → pivot. i=7 has no full window.
        assert_eq!(pivot_highs(&bars, 4), vec![5.0, 4.0]);
    }

    #[test]
    fn test_pivot_lows_with_odd_window() {
        let highs = [10.0; 7];
        let lows = [5.0, 4.0, 3.0, 4.0, 5.0, 4.5, 4.8];
        let bars = bars_hl(&highs, &lows);
        // window 3 → [i-1, i+1]
        assert_eq!(pivot_lows(&bars, 3), vec![3.0, 4.5]);
    }

    #[test]
    fn test_short_series_has_no_pivots() {
        let bars = bars_hl(&[1.0, 2.0, 3.0], &[0.5, 1.5, 2.5]);
        assert!(pivot_highs(&bars, 10).is_empty());
        assert!(pivot_lows(&bars, 10).is_empty());
    }

    #[test]
    fn test_cluster_levels_merges_within_threshold() {
        let levels = [100.0, 102.0, 110.0, 101.0, 111.0, 130.0];
        let clustered = cluster_levels(&levels, 0.03);
        assert_eq!(clustered, vec![101.0, 110.5, 130.0]);
    }

    #[test]
    fn test_cluster_chains_through_last_member() {
        // Each step is 2%, so the chain keeps growing past 3% of the first value
        let levels = [100.0, 102.0, 104.04];
        assert_eq!(cluster_levels(&levels, 0.03).len(), 1);
    }

    #[test]
    fn test_cluster_empty() {
        assert!(cluster_levels(&[], 0.03).is_empty());
    }

    #[test]
    fn test_clustering_is_idempotent() {
        let mut state: u64 = 99;
        for _ in 0..20 {
            let levels: Vec<f64> = (0..40)
                .map(|_| {
                    state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                    20.0 + ((state >> 40) as f64 / (1u64 << 24) as f64) * 30.0
                })
                .collect();
            let once = cluster_levels(&levels, 0.03);
            let twice = cluster_levels(&once, 0.03);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_nearest_three_on_each_side() {
        let params = IndicatorParams {
            pivot_window: 3,
            ..Default::default()
        };
        // Alternating peaks and troughs, well separated
        let highs = [10.0, 20.0, 10.0, 30.0, 10.0, 40.0, 10.0, 50.0, 10.0, 60.0, 10.0];
        let lows = [9.0, 8.0, 9.0, 6.0, 9.0, 4.0, 9.0, 2.0, 9.0, 1.0, 9.0];
        let bars = bars_hl(&highs, &lows);

        let levels = find_support_resistance(&bars, 15.0, &params);

        let r: Vec<f64> = levels.resistance.iter().map(|l| l.price).collect();
        let s: Vec<f64> = levels.support.iter().map(|l| l.price).collect();
        assert_eq!(r, vec![20.0, 30.0, 40.0]);
        assert_eq!(s, vec![8.0, 6.0, 4.0]);
        assert!(levels.resistance.iter().all(|l| l.kind == LevelKind::Resistance));
        assert!(levels.support.iter().all(|l| l.kind == LevelKind::Support));
    }

    #[test]
    fn test_levels_strictly_above_and_below() {
        let params = IndicatorParams {
            pivot_window: 3,
            ..Default::default()
        };
        let highs = [10.0, 20.0, 10.0];
        let lows = [9.0, 8.0, 9.0];
        let bars = bars_hl(&highs, &lows);

        // Price equal to the only pivot high: not a resistance
        let levels = find_support_resistance(&bars, 20.0, &params);
        assert!(levels.resistance.is_empty());
        assert_eq!(levels.support.len(), 1);

        // Price equal to the only pivot low: not a support
        let levels = find_support_resistance(&bars, 8.0, &params);
        assert!(levels.support.is_empty());
        assert_eq!(levels.resistance.len(), 1);
    }
}
