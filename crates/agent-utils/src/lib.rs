//! Shared utilities for the stock advisor workspace
//!
//! Logging setup and environment-driven configuration helpers.

pub mod config;
pub mod logging;

pub use config::{env_or, env_parse, load_env};
pub use logging::{init_tracing, init_tracing_json};
