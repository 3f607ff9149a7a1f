//! Agents built on the technical data tool

pub mod technical_analyst;

pub use technical_analyst::TechnicalAnalystAgent;
