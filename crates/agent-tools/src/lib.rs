//! Tool management and execution for the stock advisor
//!
//! Tools are the functions an agent crew can call. The crate defines the
//! [`Tool`] trait and a name-keyed [`ToolRegistry`].

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;
