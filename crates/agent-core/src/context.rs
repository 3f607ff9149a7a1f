//! Execution context for agents
//!
//! The `Context` struct carries the per-run inputs the crew interpolates
//! into every task (ticker, analysis date, output language) plus any
//! extra key-value state an agent wants to hand to the next one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Ticker under analysis (e.g., "HPG")
    pub const SYMBOL: &str = "symbol";
    /// Analysis date as `YYYY-MM-DD`
    pub const CURRENT_DATE: &str = "current_date";
    /// Language preference (e.g., "vi", "en")
    pub const LANGUAGE: &str = "language";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use agent_core::Context;
/// use chrono::NaiveDate;
///
/// let ctx = Context::new()
///     .with_symbol("HPG")
///     .with_current_date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
///     .with_language("vi");
///
/// assert_eq!(ctx.symbol(), Some("HPG"));
/// assert_eq!(ctx.current_date(), NaiveDate::from_ymd_opt(2025, 3, 14));
/// assert_eq!(ctx.language(), Some("vi"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    // =========== Builder Methods ===========

    /// Set the ticker
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.set_symbol(symbol);
        self
    }

    /// Set the analysis date
    pub fn with_current_date(mut self, date: NaiveDate) -> Self {
        self.insert(
            keys::CURRENT_DATE,
            serde_json::json!(date.format("%Y-%m-%d").to_string()),
        );
        self
    }

    /// Set the language preference
    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.insert(keys::LANGUAGE, serde_json::json!(lang.into()));
        self
    }

    // =========== Common Accessors ===========

    /// Get the ticker
    pub fn symbol(&self) -> Option<&str> {
        self.get(keys::SYMBOL).and_then(|v| v.as_str())
    }

    /// Set the ticker
    pub fn set_symbol(&mut self, symbol: impl Into<String>) {
        self.insert(keys::SYMBOL, serde_json::json!(symbol.into()));
    }

    /// Get the analysis date, if present and well-formed
    pub fn current_date(&self) -> Option<NaiveDate> {
        self.get(keys::CURRENT_DATE)
            .and_then(|v| v.as_str())
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }

    /// Get the language preference
    pub fn language(&self) -> Option<&str> {
        self.get(keys::LANGUAGE).and_then(|v| v.as_str())
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Levels {
        support: Vec<f64>,
    }

    #[test]
    fn test_basic_operations() {
        let mut ctx = Context::new();
        assert!(ctx.is_empty());

        ctx.insert("key", serde_json::json!("value"));
        assert_eq!(ctx.len(), 1);
        assert!(ctx.contains_key("key"));

        ctx.remove("key");
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_typed_insert_get() {
        let mut ctx = Context::new();
        let levels = Levels {
            support: vec![24.5, 23.8],
        };

        ctx.insert_typed("levels", &levels).unwrap();
        let back: Levels = ctx.get_typed("levels").unwrap().unwrap();
        assert_eq!(back, levels);
    }

    #[test]
    fn test_current_date_roundtrip_and_garbage() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let ctx = Context::new().with_current_date(date);
        assert_eq!(ctx.current_date(), Some(date));

        let mut bad = Context::new();
        bad.insert(keys::CURRENT_DATE, serde_json::json!("31/12/2024"));
        assert_eq!(bad.current_date(), None);
    }

    #[test]
    fn test_set_symbol_overrides_builder() {
        let mut ctx = Context::new().with_language("en").with_symbol("fpt");
        ctx.set_symbol("FPT");
        assert_eq!(ctx.symbol(), Some("FPT"));
        assert_eq!(ctx.language(), Some("en"));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_get_typed_missing_key() {
        let ctx = Context::new();
        let result: crate::Result<Option<Levels>> = ctx.get_typed("missing");
        assert!(result.unwrap().is_none());
    }
}
