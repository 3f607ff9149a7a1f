//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Required input missing from the execution context or the request
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Agent or tool processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// No tool registered under the requested name
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::ToolNotFound("technical_data".to_string()).to_string(),
            "Tool not found: technical_data"
        );
        assert_eq!(
            Error::MissingInput("symbol".to_string()).to_string(),
            "Missing input: symbol"
        );
    }
}
