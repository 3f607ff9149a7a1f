//! Tool exposing the technical data engine to agents

use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::{
    IndicatorRow, Signal, SupportResistance, TechnicalAnalysis, TechnicalEngine,
};
use crate::config::StockConfig;
use crate::data::{PriceBar, bars_from_records};
use crate::error::{Result, StockError};
use crate::provider::{PriceHistoryProvider, lookback, normalize_symbol};
use crate::report::{Language, ReportFormat, TechnicalReport};

/// Name the tool is registered under
pub const TECHNICAL_DATA_TOOL: &str = "technical_data";

/// Seconds east of UTC for Vietnam (ICT, no daylight saving)
const ICT_OFFSET_SECS: i32 = 7 * 3600;

/// Today's date on the Vietnamese market calendar
pub fn market_today() -> NaiveDate {
    let now = Utc::now();
    FixedOffset::east_opt(ICT_OFFSET_SECS)
        .map_or_else(|| now.date_naive(), |tz| now.with_timezone(&tz).date_naive())
}

/// Bars supplied by the caller rather than fetched, with their analysis date
///
/// The whole history is kept; no lookback window applies. The analysis
/// date defaults to the last bar, and an explicit date drops later bars.
pub fn offline_window(bars: Vec<PriceBar>, date: Option<NaiveDate>) -> (Vec<PriceBar>, NaiveDate) {
    match date {
        Some(date) => (bars.into_iter().filter(|b| b.date <= date).collect(), date),
        None => {
            let date = bars.last().map_or_else(market_today, |b| b.date);
            (bars, date)
        }
    }
}

#[derive(Debug, Deserialize)]
struct TechnicalDataParams {
    symbol: String,
    #[serde(default)]
    days: Option<u32>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    format: Option<String>,
    /// Analysis date, `YYYY-MM-DD`
    #[serde(default)]
    date: Option<NaiveDate>,
    /// Inline price records; skips the provider
    #[serde(default)]
    bars: Option<Vec<Value>>,
}

/// Latest-bar view of an analysis, small enough for a prompt
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisDigest {
    pub bars: usize,
    pub latest: IndicatorRow,
    pub band_position: Option<f64>,
    pub levels: SupportResistance,
    pub signals: Vec<Signal>,
}

impl AnalysisDigest {
    fn from_analysis(analysis: &TechnicalAnalysis) -> Option<Self> {
        Some(Self {
            bars: analysis.rows.len(),
            latest: analysis.latest()?.clone(),
            band_position: analysis.summary.snapshot.band_position(),
            levels: analysis.levels.clone(),
            signals: analysis.summary.signals.clone(),
        })
    }
}

/// Tool output
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalData {
    pub symbol: String,
    /// Date of the latest bar
    pub as_of: NaiveDate,
    pub analysis_date: NaiveDate,
    pub language: Language,
    pub report: String,
    pub analysis: AnalysisDigest,
}

/// Technical data lookup: fetch history, run the engine, render the report
pub struct TechnicalDataTool {
    provider: Arc<dyn PriceHistoryProvider>,
    engine: TechnicalEngine,
    config: Arc<StockConfig>,
}

impl TechnicalDataTool {
    /// Create a new technical data tool
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, config: Arc<StockConfig>) -> Self {
        Self {
            provider,
            engine: TechnicalEngine::new(),
            config,
        }
    }

    /// Replace the engine, e.g. to run with custom windows
    pub fn with_engine(mut self, engine: TechnicalEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Fetch `days` calendar days of history ending at `end`
    pub async fn load_bars(&self, symbol: &str, days: u32, end: NaiveDate) -> Result<Vec<PriceBar>> {
        let (start, end) = lookback(end, days);
        self.provider.history(symbol, start, end).await
    }

    pub fn engine(&self) -> &TechnicalEngine {
        &self.engine
    }

    fn resolve_format(requested: Option<&str>) -> ReportFormat {
        match requested.map(|f| f.trim().to_lowercase()).as_deref() {
            None | Some("text" | "txt") => ReportFormat::Text,
            Some("markdown" | "md") => ReportFormat::Markdown,
            Some(other) => {
                warn!(report_format = other, "Unsupported report format, using text");
                ReportFormat::Text
            }
        }
    }

    fn resolve_language(&self, requested: Option<&str>) -> Language {
        match requested {
            None => self.config.language,
            Some(code) => Language::from_code(code).unwrap_or_else(|| {
                warn!(language = code, "Unsupported language, using configured default");
                self.config.language
            }),
        }
    }

    async fn technical_data(&self, params: TechnicalDataParams, language: Language) -> Result<TechnicalData> {
        let symbol = normalize_symbol(&params.symbol)?;
        let format = Self::resolve_format(params.format.as_deref());

        let (bars, analysis_date) = match params.bars {
            Some(records) => offline_window(bars_from_records(&records)?, params.date),
            None => {
                let analysis_date = params.date.unwrap_or_else(market_today);
                let days = params.days.unwrap_or(self.config.history_days);
                (self.load_bars(&symbol, days, analysis_date).await?, analysis_date)
            }
        };

        let analysis = self.engine.analyze(&bars)?;
        let digest = AnalysisDigest::from_analysis(&analysis).ok_or_else(|| {
            StockError::InsufficientData {
                bars: 0,
                required: self.engine.params().min_bars,
            }
        })?;

        let report = format.formatter(language).format_report(&TechnicalReport {
            symbol: &symbol,
            analysis_date,
            analysis: &analysis,
        });

        Ok(TechnicalData {
            as_of: digest.latest.date,
            symbol,
            analysis_date,
            language,
            report,
            analysis: digest,
        })
    }
}

#[async_trait]
impl Tool for TechnicalDataTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: TechnicalDataParams = serde_json::from_value(params).map_err(|e| {
            agent_core::Error::ProcessingFailed(format!("Invalid parameters: {e}"))
        })?;

        let language = self.resolve_language(params.language.as_deref());
        let symbol = params.symbol.trim().to_uppercase();
        info!(symbol = %symbol, provider = self.provider.name(), "Running technical analysis");

        match self.technical_data(params, language).await {
            Ok(data) => Ok(serde_json::to_value(data)
                .map_err(|e| agent_core::Error::ProcessingFailed(e.to_string()))?),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Technical analysis failed");
                let formatter = ReportFormat::Text.formatter(language);
                Err(agent_core::Error::ProcessingFailed(formatter.format_error(&symbol, &e)))
            }
        }
    }

    fn name(&self) -> &str {
        TECHNICAL_DATA_TOOL
    }

    fn description(&self) -> &str {
        "Technical analysis data for a Vietnamese stock: recent closes and volumes, \
         SMA/EMA/MACD/RSI/Bollinger Bands, volume averages and OBV, support and \
         resistance levels, and a rule-based technical assessment."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock ticker, e.g. HPG, FPT, VNM"
                },
                "days": {
                    "type": "integer",
                    "description": "Calendar days of history to fetch",
                    "minimum": 1,
                    "default": self.config.history_days
                },
                "language": {
                    "type": "string",
                    "description": "Report language",
                    "enum": ["vi", "en"],
                    "default": self.config.language.code()
                },
                "format": {
                    "type": "string",
                    "enum": ["text", "markdown"],
                    "default": "text"
                },
                "date": {
                    "type": "string",
                    "description": "Analysis date (YYYY-MM-DD), defaults to today",
                    "format": "date"
                },
                "bars": {
                    "type": "array",
                    "description": "Optional daily price records {date, open, high, low, close, volume}; skips the data provider",
                    "items": { "type": "object" }
                }
            },
            "required": ["symbol"]
        })
    }
}
