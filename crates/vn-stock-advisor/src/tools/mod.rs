//! Tools the agent crew can call

pub mod technical;

pub use technical::{
    AnalysisDigest, TECHNICAL_DATA_TOOL, TechnicalData, TechnicalDataTool, market_today,
    offline_window,
};
