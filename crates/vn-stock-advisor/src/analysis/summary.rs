//! Narrative rule engine
//!
//! The latest indicator row and the current price are captured in a
//! [`Snapshot`]. An ordered table of independent `(predicate, signal)`
//! rules runs against it and every rule that holds contributes its signal.
//! Within a topic the predicates are mutually exclusive, so each topic
//! yields exactly one signal, except volume confirmation which only speaks
//! on a volume spike.
//!
//! Comparisons involving an undefined value are false, which routes an
//! undefined input to the fall-through signal of its topic.

use serde::{Deserialize, Serialize};

use super::indicators::IndicatorRow;
use super::params::SignalThresholds;

/// Band position reported when the bands have collapsed to a single price
pub const FLAT_BAND_POSITION: f64 = 0.5;

/// Three-way direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// Two-way polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

/// Where price sits relative to the Bollinger Bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandZone {
    AboveUpper,
    BelowLower,
    NearUpper,
    NearLower,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeLevel {
    VeryHigh,
    High,
    Low,
    Normal,
}

/// One line of the technical checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "value", rename_all = "snake_case")]
pub enum Signal {
    LongTermTrend(Trend),
    ShortTermTrend(Trend),
    Rsi(RsiZone),
    Macd(Bias),
    Bollinger(BandZone),
    Volume(VolumeLevel),
    VolumeTrend(Trend),
    VolumeConfirmation(Bias),
}

/// Values the rules read, taken from the latest row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub price: f64,
    pub volume: f64,
    pub sma_short: Option<f64>,
    pub sma_medium: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub volume_sma_short: Option<f64>,
    pub volume_sma_medium: Option<f64>,
    pub volume_sma_long: Option<f64>,
    pub volume_ratio: Option<f64>,
}

impl Snapshot {
    /// Capture a row against the given current price
    pub fn new(row: &IndicatorRow, price: f64) -> Self {
        Self {
            price,
            volume: row.volume,
            sma_short: row.sma_short,
            sma_medium: row.sma_medium,
            sma_long: row.sma_long,
            rsi: row.rsi,
            macd: row.macd,
            macd_signal: row.macd_signal,
            bb_upper: row.bb_upper,
            bb_lower: row.bb_lower,
            volume_sma_short: row.volume_sma_short,
            volume_sma_medium: row.volume_sma_medium,
            volume_sma_long: row.volume_sma_long,
            volume_ratio: row.volume_ratio_medium,
        }
    }

    /// `(price − lower) / (upper − lower)`, not clamped
    pub fn band_position(&self) -> Option<f64> {
        let (upper, lower) = self.bb_upper.zip(self.bb_lower)?;
        if upper == lower {
            Some(FLAT_BAND_POSITION)
        } else {
            Some((self.price - lower) / (upper - lower))
        }
    }
}

/// Checklist produced for the latest bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub snapshot: Snapshot,
    pub signals: Vec<Signal>,
}

impl AnalysisSummary {
    /// First signal for a topic, matched by a selector
    pub fn find<T>(&self, select: impl Fn(&Signal) -> Option<T>) -> Option<T> {
        self.signals.iter().find_map(select)
    }
}

type Predicate = fn(&Snapshot, &SignalThresholds) -> bool;

struct Rule {
    signal: Signal,
    holds: Predicate,
}

fn gt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

fn lt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}

fn long_up(s: &Snapshot) -> bool {
    gt(Some(s.price), s.sma_long) && gt(s.sma_medium, s.sma_long)
}

fn long_down(s: &Snapshot) -> bool {
    lt(Some(s.price), s.sma_long) && lt(s.sma_medium, s.sma_long)
}

fn short_up(s: &Snapshot) -> bool {
    gt(Some(s.price), s.sma_short) && gt(s.sma_short, s.sma_medium)
}

fn short_down(s: &Snapshot) -> bool {
    lt(Some(s.price), s.sma_short) && lt(s.sma_short, s.sma_medium)
}

fn above_band(s: &Snapshot) -> bool {
    gt(Some(s.price), s.bb_upper)
}

fn below_band(s: &Snapshot) -> bool {
    lt(Some(s.price), s.bb_lower)
}

fn inside_band(s: &Snapshot) -> bool {
    !above_band(s) && !below_band(s)
}

fn near_upper(s: &Snapshot, t: &SignalThresholds) -> bool {
    inside_band(s) && gt(s.band_position(), Some(t.band_near_upper))
}

fn near_lower(s: &Snapshot, t: &SignalThresholds) -> bool {
    inside_band(s) && lt(s.band_position(), Some(t.band_near_lower))
}

fn volume_very_high(s: &Snapshot, t: &SignalThresholds) -> bool {
    gt(s.volume_ratio, Some(t.volume_very_high))
}

fn volume_high(s: &Snapshot, t: &SignalThresholds) -> bool {
    !volume_very_high(s, t) && gt(s.volume_ratio, Some(t.volume_high))
}

fn volume_low(s: &Snapshot, t: &SignalThresholds) -> bool {
    !volume_very_high(s, t) && !volume_high(s, t) && lt(s.volume_ratio, Some(t.volume_low))
}

fn volume_rising(s: &Snapshot) -> bool {
    gt(s.volume_sma_short, s.volume_sma_medium) && gt(s.volume_sma_medium, s.volume_sma_long)
}

fn volume_falling(s: &Snapshot) -> bool {
    lt(s.volume_sma_short, s.volume_sma_medium) && lt(s.volume_sma_medium, s.volume_sma_long)
}

fn volume_spike(s: &Snapshot, t: &SignalThresholds) -> bool {
    gt(Some(s.volume), s.volume_sma_medium.map(|v| v * t.volume_spike))
}

const RULES: &[Rule] = &[
    Rule {
        signal: Signal::LongTermTrend(Trend::Up),
        holds: |s, _| long_up(s),
    },
    Rule {
        signal: Signal::LongTermTrend(Trend::Down),
        holds: |s, _| long_down(s),
    },
    Rule {
        signal: Signal::LongTermTrend(Trend::Neutral),
        holds: |s, _| !long_up(s) && !long_down(s),
    },
    Rule {
        signal: Signal::ShortTermTrend(Trend::Up),
        holds: |s, _| short_up(s),
    },
    Rule {
        signal: Signal::ShortTermTrend(Trend::Down),
        holds: |s, _| short_down(s),
    },
    Rule {
        signal: Signal::ShortTermTrend(Trend::Neutral),
        holds: |s, _| !short_up(s) && !short_down(s),
    },
    Rule {
        signal: Signal::Rsi(RsiZone::Overbought),
        holds: |s, t| s.rsi > t.rsi_overbought,
    },
    Rule {
        signal: Signal::Rsi(RsiZone::Oversold),
        holds: |s, t| s.rsi < t.rsi_oversold,
    },
    Rule {
        signal: Signal::Rsi(RsiZone::Neutral),
        holds: |s, t| s.rsi <= t.rsi_overbought && s.rsi >= t.rsi_oversold,
    },
    Rule {
        signal: Signal::Macd(Bias::Positive),
        holds: |s, _| s.macd > s.macd_signal,
    },
    Rule {
        signal: Signal::Macd(Bias::Negative),
        holds: |s, _| s.macd <= s.macd_signal,
    },
    Rule {
        signal: Signal::Bollinger(BandZone::AboveUpper),
        holds: |s, _| above_band(s),
    },
    Rule {
        signal: Signal::Bollinger(BandZone::BelowLower),
        holds: |s, _| !above_band(s) && below_band(s),
    },
    Rule {
        signal: Signal::Bollinger(BandZone::NearUpper),
        holds: near_upper,
    },
    Rule {
        signal: Signal::Bollinger(BandZone::NearLower),
        holds: |s, t| !near_upper(s, t) && near_lower(s, t),
    },
    Rule {
        signal: Signal::Bollinger(BandZone::Middle),
        holds: |s, t| inside_band(s) && !near_upper(s, t) && !near_lower(s, t),
    },
    Rule {
        signal: Signal::Volume(VolumeLevel::VeryHigh),
        holds: volume_very_high,
    },
    Rule {
        signal: Signal::Volume(VolumeLevel::High),
        holds: volume_high,
    },
    Rule {
        signal: Signal::Volume(VolumeLevel::Low),
        holds: volume_low,
    },
    Rule {
        signal: Signal::Volume(VolumeLevel::Normal),
        holds: |s, t| !volume_very_high(s, t) && !volume_high(s, t) && !volume_low(s, t),
    },
    Rule {
        signal: Signal::VolumeTrend(Trend::Up),
        holds: |s, _| volume_rising(s),
    },
    Rule {
        signal: Signal::VolumeTrend(Trend::Down),
        holds: |s, _| volume_falling(s),
    },
    Rule {
        signal: Signal::VolumeTrend(Trend::Neutral),
        holds: |s, _| !volume_rising(s) && !volume_falling(s),
    },
    Rule {
        signal: Signal::VolumeConfirmation(Bias::Positive),
        holds: |s, t| volume_spike(s, t) && gt(Some(s.price), s.sma_short),
    },
    Rule {
        signal: Signal::VolumeConfirmation(Bias::Negative),
        holds: |s, t| volume_spike(s, t) && !gt(Some(s.price), s.sma_short),
    },
];

/// Run every rule against the snapshot, in table order
pub fn evaluate(snapshot: &Snapshot, thresholds: &SignalThresholds) -> Vec<Signal> {
    RULES
        .iter()
        .filter(|rule| (rule.holds)(snapshot, thresholds))
        .map(|rule| rule.signal)
        .collect()
}

/// Build the checklist for the latest row
pub fn summarize(row: &IndicatorRow, price: f64, thresholds: &SignalThresholds) -> AnalysisSummary {
    let snapshot = Snapshot::new(row, price);
    AnalysisSummary {
        signals: evaluate(&snapshot, thresholds),
        snapshot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Snapshot {
        Snapshot {
            price: 100.0,
            volume: 1000.0,
            sma_short: Some(100.0),
            sma_medium: Some(100.0),
            sma_long: Some(100.0),
            rsi: 50.0,
            macd: 0.0,
            macd_signal: 0.0,
            bb_upper: Some(110.0),
            bb_lower: Some(90.0),
            volume_sma_short: Some(1000.0),
            volume_sma_medium: Some(1000.0),
            volume_sma_long: Some(1000.0),
            volume_ratio: Some(1.0),
        }
    }

    fn signals(s: &Snapshot) -> Vec<Signal> {
        evaluate(s, &SignalThresholds::default())
    }

    fn topic_count(signals: &[Signal], pred: impl Fn(&Signal) -> bool) -> usize {
        signals.iter().filter(|s| pred(s)).count()
    }

    #[test]
    fn test_neutral_snapshot_checklist_order() {
        assert_eq!(
            signals(&base()),
            vec![
                Signal::LongTermTrend(Trend::Neutral),
                Signal::ShortTermTrend(Trend::Neutral),
                Signal::Rsi(RsiZone::Neutral),
                Signal::Macd(Bias::Negative),
                Signal::Bollinger(BandZone::Middle),
                Signal::Volume(VolumeLevel::Normal),
                Signal::VolumeTrend(Trend::Neutral),
            ]
        );
    }

    #[test]
    fn test_long_term_trend() {
        let up = Snapshot {
            price: 120.0,
            sma_medium: Some(110.0),
            sma_long: Some(100.0),
            ..base()
        };
        assert!(signals(&up).contains(&Signal::LongTermTrend(Trend::Up)));

        let down = Snapshot {
            price: 80.0,
            sma_medium: Some(90.0),
            sma_long: Some(100.0),
            ..base()
        };
        assert!(signals(&down).contains(&Signal::LongTermTrend(Trend::Down)));

        // Price above SMA200 but SMA50 below it: mixed
        let mixed = Snapshot {
            price: 120.0,
            sma_medium: Some(90.0),
            sma_long: Some(100.0),
            ..base()
        };
        assert!(signals(&mixed).contains(&Signal::LongTermTrend(Trend::Neutral)));
    }

    #[test]
    fn test_undefined_long_average_is_neutral() {
        let s = Snapshot {
            price: 150.0,
            sma_long: None,
            ..base()
        };
        assert!(signals(&s).contains(&Signal::LongTermTrend(Trend::Neutral)));
    }

    #[test]
    fn test_short_term_trend() {
        let up = Snapshot {
            price: 105.0,
            sma_short: Some(102.0),
            sma_medium: Some(100.0),
            ..base()
        };
        assert!(signals(&up).contains(&Signal::ShortTermTrend(Trend::Up)));

        let down = Snapshot {
            price: 95.0,
            sma_short: Some(98.0),
            sma_medium: Some(100.0),
            ..base()
        };
        assert!(signals(&down).contains(&Signal::ShortTermTrend(Trend::Down)));
    }

    #[test]
    fn test_rsi_zones_and_boundaries() {
        let zone = |rsi| {
            signals(&Snapshot { rsi, ..base() })
                .into_iter()
                .find_map(|s| match s {
                    Signal::Rsi(z) => Some(z),
                    _ => None,
                })
        };
        assert_eq!(zone(75.0), Some(RsiZone::Overbought));
        assert_eq!(zone(70.0), Some(RsiZone::Neutral));
        assert_eq!(zone(30.0), Some(RsiZone::Neutral));
        assert_eq!(zone(12.0), Some(RsiZone::Oversold));
    }

    #[test]
    fn test_macd_polarity() {
        let s = Snapshot {
            macd: 0.4,
            macd_signal: 0.1,
            ..base()
        };
        assert!(signals(&s).contains(&Signal::Macd(Bias::Positive)));
    }

    #[test]
    fn test_bollinger_zones() {
        let zone = |price| {
            signals(&Snapshot { price, ..base() })
                .into_iter()
                .find_map(|s| match s {
                    Signal::Bollinger(z) => Some(z),
                    _ => None,
                })
        };
        assert_eq!(zone(111.0), Some(BandZone::AboveUpper));
        assert_eq!(zone(89.0), Some(BandZone::BelowLower));
        assert_eq!(zone(108.0), Some(BandZone::NearUpper));
        assert_eq!(zone(92.0), Some(BandZone::NearLower));
        assert_eq!(zone(100.0), Some(BandZone::Middle));
        // On the band itself: inside, position 1.0
        assert_eq!(zone(110.0), Some(BandZone::NearUpper));
    }

    #[test]
    fn test_band_position_outside_bands() {
        let position = |price| Snapshot { price, ..base() }.band_position().unwrap();
        assert_eq!(position(100.0), 0.5);
        assert_eq!(position(115.0), 1.25);
        assert_eq!(position(85.0), -0.25);
        assert!(position(111.0) > 1.0);
        assert!(position(89.0) < 0.0);

        let no_bands = Snapshot {
            bb_upper: None,
            ..base()
        };
        assert_eq!(no_bands.band_position(), None);
    }

    #[test]
    fn test_collapsed_bands_fall_back_to_middle() {
        let s = Snapshot {
            bb_upper: Some(100.0),
            bb_lower: Some(100.0),
            ..base()
        };
        assert_eq!(s.band_position(), Some(FLAT_BAND_POSITION));
        assert!(signals(&s).contains(&Signal::Bollinger(BandZone::Middle)));
    }

    #[test]
    fn test_volume_levels() {
        let level = |ratio| {
            signals(&Snapshot {
                volume_ratio: ratio,
                ..base()
            })
            .into_iter()
            .find_map(|s| match s {
                Signal::Volume(v) => Some(v),
                _ => None,
            })
        };
        assert_eq!(level(Some(2.5)), Some(VolumeLevel::VeryHigh));
        assert_eq!(level(Some(1.8)), Some(VolumeLevel::High));
        assert_eq!(level(Some(0.3)), Some(VolumeLevel::Low));
        assert_eq!(level(Some(1.0)), Some(VolumeLevel::Normal));
        assert_eq!(level(None), Some(VolumeLevel::Normal));
    }

    #[test]
    fn test_volume_trend() {
        let rising = Snapshot {
            volume_sma_short: Some(300.0),
            volume_sma_medium: Some(200.0),
            volume_sma_long: Some(100.0),
            ..base()
        };
        assert!(signals(&rising).contains(&Signal::VolumeTrend(Trend::Up)));

        let falling = Snapshot {
            volume_sma_short: Some(100.0),
            volume_sma_medium: Some(200.0),
            volume_sma_long: Some(300.0),
            ..base()
        };
        assert!(signals(&falling).contains(&Signal::VolumeTrend(Trend::Down)));
    }

    #[test]
    fn test_volume_confirmation_only_on_spike() {
        let spike_up = Snapshot {
            volume: 1600.0,
            price: 105.0,
            ..base()
        };
        let out = signals(&spike_up);
        assert_eq!(out.last(), Some(&Signal::VolumeConfirmation(Bias::Positive)));

        let spike_down = Snapshot {
            volume: 1600.0,
            price: 95.0,
            ..base()
        };
        assert_eq!(
            signals(&spike_down).last(),
            Some(&Signal::VolumeConfirmation(Bias::Negative))
        );

        let quiet = Snapshot {
            volume: 1400.0,
            ..base()
        };
        assert_eq!(
            topic_count(&signals(&quiet), |s| matches!(s, Signal::VolumeConfirmation(_))),
            0
        );
    }

    #[test]
    fn test_one_signal_per_topic() {
        let cases = [
            base(),
            Snapshot {
                price: 200.0,
                rsi: 90.0,
                volume_ratio: Some(3.0),
                ..base()
            },
            Snapshot {
                sma_short: None,
                sma_medium: None,
                sma_long: None,
                bb_upper: None,
                bb_lower: None,
                volume_ratio: None,
                ..base()
            },
        ];
        for s in &cases {
            let out = signals(s);
            assert_eq!(topic_count(&out, |x| matches!(x, Signal::LongTermTrend(_))), 1);
            assert_eq!(topic_count(&out, |x| matches!(x, Signal::ShortTermTrend(_))), 1);
            assert_eq!(topic_count(&out, |x| matches!(x, Signal::Rsi(_))), 1);
            assert_eq!(topic_count(&out, |x| matches!(x, Signal::Macd(_))), 1);
            assert_eq!(topic_count(&out, |x| matches!(x, Signal::Bollinger(_))), 1);
            assert_eq!(topic_count(&out, |x| matches!(x, Signal::Volume(_))), 1);
            assert_eq!(topic_count(&out, |x| matches!(x, Signal::VolumeTrend(_))), 1);
        }
    }
}
