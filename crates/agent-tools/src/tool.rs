//! Tool trait definition

use agent_core::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Each tool provides a name, a description the LLM reads to decide when to
/// call it, and a JSON schema for its input.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters (should match `input_schema`)
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name, unique within a [`crate::ToolRegistry`]
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "symbol": { "type": "string" }
    ///     },
    ///     "required": ["symbol"]
    /// });
    /// assert_eq!(schema["required"][0], "symbol");
    /// ```
    fn input_schema(&self) -> Value;
}
