//! Technical analyst agent

use agent_core::{Agent, Context, Error, Result};
use agent_tools::ToolRegistry;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::StockConfig;
use crate::provider::PriceHistoryProvider;
use crate::tools::{TECHNICAL_DATA_TOOL, TechnicalDataTool};

/// Context key the last tool output is stored under
pub const TECHNICAL_DATA_KEY: &str = "technical_data";

/// Agent that answers with the technical data report for a ticker
///
/// The input is the ticker; when it is blank the symbol from the
/// [`Context`] is used. Language and analysis date come from the context
/// too. Analysis failures are returned as a localized message rather
/// than an error, so a crew run carries on with the other agents.
pub struct TechnicalAnalystAgent {
    tools: Arc<ToolRegistry>,
}

impl TechnicalAnalystAgent {
    /// Create an agent over an existing registry
    ///
    /// The registry must contain a tool named `technical_data`.
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// Create an agent with its own registry holding a [`TechnicalDataTool`]
    pub fn with_provider(provider: Arc<dyn PriceHistoryProvider>, config: Arc<StockConfig>) -> Self {
        let tools = Arc::new(ToolRegistry::new());
        tools.register(Arc::new(TechnicalDataTool::new(provider, config)));
        Self::new(tools)
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    fn params(symbol: &str, context: &Context) -> Value {
        let mut params = json!({ "symbol": symbol });
        if let Some(language) = context.language() {
            params["language"] = json!(language);
        }
        if let Some(date) = context.current_date() {
            params["date"] = json!(date);
        }
        params
    }
}

#[async_trait]
impl Agent for TechnicalAnalystAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        let symbol = match input.trim() {
            "" => context
                .symbol()
                .map(str::to_string)
                .ok_or_else(|| Error::MissingInput("symbol".to_string()))?,
            s => s.to_string(),
        };
        info!(symbol = %symbol, "Technical analyst processing");

        let params = Self::params(&symbol, context);
        match self.tools.execute(TECHNICAL_DATA_TOOL, params).await {
            Ok(data) => {
                let report = data["report"].as_str().unwrap_or_default().to_string();
                let resolved = data["symbol"].as_str().unwrap_or(&symbol).to_string();
                context.set_symbol(resolved);
                context.insert(TECHNICAL_DATA_KEY, data);
                Ok(report)
            }
            Err(Error::ProcessingFailed(message)) => {
                warn!(symbol = %symbol, "Technical data unavailable");
                Ok(message)
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        "TechnicalAnalystAgent"
    }

    fn description(&self) -> &str {
        "Technical indicators, support/resistance and signal assessment for Vietnamese stocks"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceBar;
    use crate::provider::StaticProvider;
    use chrono::{Duration, NaiveDate};

    fn end_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    fn agent() -> TechnicalAnalystAgent {
        let bars: Vec<PriceBar> = (0..120)
            .map(|i| {
                let close = 60_000.0 + i as f64 * 40.0 + ((i as f64) / 3.0).cos() * 900.0;
                PriceBar::new(
                    end_date() - Duration::days(119 - i as i64),
                    close,
                    close + 300.0,
                    close - 300.0,
                    close,
                    800_000.0 + (i % 6) as f64 * 40_000.0,
                )
            })
            .collect();
        let provider = StaticProvider::new().with_history("FPT", bars);
        TechnicalAnalystAgent::with_provider(Arc::new(provider), Arc::new(StockConfig::default()))
    }

    #[tokio::test]
    async fn test_report_for_input_symbol() {
        let agent = agent();
        let mut ctx = Context::new().with_current_date(end_date());

        let report = agent.process("fpt".to_string(), &mut ctx).await.unwrap();

        assert!(report.starts_with("Mã cổ phiếu: FPT"));
        assert_eq!(ctx.symbol(), Some("FPT"));
        let stored = ctx.get(TECHNICAL_DATA_KEY).unwrap();
        assert_eq!(stored["as_of"], "2025-06-20");
    }

    #[tokio::test]
    async fn test_symbol_and_language_from_context() {
        let agent = agent();
        let mut ctx = Context::new()
            .with_symbol("FPT")
            .with_language("en")
            .with_current_date(end_date());

        let report = agent.process(String::new(), &mut ctx).await.unwrap();
        assert!(report.starts_with("Ticker: FPT"));
        assert!(report.contains("TECHNICAL ASSESSMENT"));
    }

    #[tokio::test]
    async fn test_missing_symbol() {
        let agent = agent();
        let mut ctx = Context::new();
        let err = agent.process("  ".to_string(), &mut ctx).await.unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_symbol_returns_message() {
        let agent = agent();
        let mut ctx = Context::new().with_current_date(end_date());

        let message = agent.process("ZZZ".to_string(), &mut ctx).await.unwrap();
        assert!(message.starts_with("Không tìm thấy dữ liệu lịch sử cho cổ phiếu ZZZ"));
        assert!(ctx.get(TECHNICAL_DATA_KEY).is_none());
    }

    #[tokio::test]
    async fn test_missing_tool_is_an_error() {
        let agent = TechnicalAnalystAgent::new(Arc::new(ToolRegistry::new()));
        let mut ctx = Context::new();
        let err = agent.process("FPT".to_string(), &mut ctx).await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }

    #[test]
    fn test_agent_metadata() {
        let agent = agent();
        assert_eq!(agent.name(), "TechnicalAnalystAgent");
        assert_eq!(agent.tools().len(), 1);
    }
}
