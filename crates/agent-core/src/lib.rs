//! Core abstractions for the stock advisor agents
//!
//! This crate defines the traits and types shared by every agent in the
//! workspace: the [`Agent`] trait the upstream crew calls, the execution
//! [`Context`] carrying per-run inputs (ticker, analysis date, language),
//! and the common [`Error`] type.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
