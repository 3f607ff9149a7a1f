//! Technical indicator engine
//!
//! Turns an ordered daily price history into an indicator table, a set of
//! support and resistance levels, and a rule-based checklist for the
//! latest bar.

pub mod engine;
pub mod indicators;
pub mod levels;
pub mod params;
pub mod rolling;
pub mod summary;

pub use engine::{TechnicalAnalysis, TechnicalEngine};
pub use indicators::{IndicatorRow, compute_indicators};
pub use levels::{Level, LevelKind, SupportResistance, cluster_levels, find_support_resistance};
pub use params::{IndicatorParams, SignalThresholds};
pub use summary::{
    AnalysisSummary, BandZone, Bias, RsiZone, Signal, Snapshot, Trend, VolumeLevel, summarize,
};
