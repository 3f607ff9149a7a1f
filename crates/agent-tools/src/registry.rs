//! Tool registry for managing available tools

use crate::Tool;
use agent_core::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry for managing tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(tool = tool.name(), "registering tool");
        tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).cloned()
    }

    /// Look up a tool by name and execute it
    pub async fn execute(&self, name: &str, params: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        tool.execute(params).await
    }

    /// List all registered tools, ordered by name
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.values().cloned().collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::MockTool;
    use serde_json::json;

    fn mock_tool(name: &'static str) -> MockTool {
        let mut tool = MockTool::new();
        tool.expect_name().return_const(name.to_string());
        tool
    }

    #[test]
    fn test_register_and_list() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(mock_tool("technical_data")));
        registry.register(Arc::new(mock_tool("file_read")));

        assert_eq!(registry.len(), 2);
        let names: Vec<String> = registry
            .list_tools()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["file_read", "technical_data"]);
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_name() {
        let registry = ToolRegistry::new();
        let mut tool = mock_tool("technical_data");
        tool.expect_execute()
            .withf(|params| params["symbol"] == "HPG")
            .returning(|_| Ok(json!({"report": "ok"})));
        registry.register(Arc::new(tool));

        let out = registry
            .execute("technical_data", json!({"symbol": "HPG"}))
            .await
            .unwrap();
        assert_eq!(out["report"], "ok");
    }

    #[test]
    fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = tokio_test::block_on(registry.execute("missing", json!({}))).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(name) if name == "missing"));
    }
}
