//! Technical data CLI for Vietnamese stocks
//!
//! # Usage
//!
//! ```bash
//! # Report from Yahoo Finance daily history
//! cargo run --bin vn-stock-ta -- analyze HPG
//!
//! # English markdown, 120 days, with the last 10 indicator rows
//! cargo run --bin vn-stock-ta -- analyze FPT --lang en --format markdown --days 120 --rows 10
//!
//! # Offline, from a JSON array of {date, open, high, low, close, volume};
//! # every bar in the file is used and the analysis date is the last bar's
//! cargo run --bin vn-stock-ta -- analyze VNM --input bars.json --format json
//! ```

use agent_tools::Tool;
use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use vn_stock_advisor::agents::TechnicalAnalystAgent;
use vn_stock_advisor::analysis::{IndicatorRow, TechnicalAnalysis};
use vn_stock_advisor::report::number::{fixed_opt, thousands, thousands_opt};
use vn_stock_advisor::report::{Language, ReportFormat, TechnicalReport};
use vn_stock_advisor::tools::{TechnicalDataTool, market_today, offline_window};
use vn_stock_advisor::{
    CachedProvider, PriceBar, StaticProvider, StockCache, StockConfig, TechnicalEngine,
    YahooFinanceClient, bars_from_records, normalize_symbol,
};

#[derive(Parser, Debug)]
#[command(name = "vn-stock-ta")]
#[command(about = "Technical indicators and support/resistance for Vietnamese stocks", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one ticker
    Analyze(AnalyzeArgs),
    /// List the tools an agent can call, with their input schemas
    Tools,
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    /// Ticker, e.g. HPG
    symbol: String,

    /// Calendar days of history to fetch (ignored with --input)
    #[arg(short, long)]
    days: Option<u32>,

    /// Report language (vi or en)
    #[arg(short, long)]
    lang: Option<Language>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Analysis date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Read bars from a JSON file instead of Yahoo Finance
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Also print the last N indicator rows as a table
    #[arg(short, long)]
    rows: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agent_utils::load_env();
    let cli = Cli::parse();
    if cli.json_logs {
        agent_utils::init_tracing_json();
    } else {
        agent_utils::init_tracing();
    }

    let config = Arc::new(StockConfig::from_env()?);

    match cli.command {
        Command::Analyze(args) => analyze(args, config).await,
        Command::Tools => {
            list_tools(config);
            Ok(())
        }
    }
}

fn read_bars(path: &Path) -> anyhow::Result<Vec<PriceBar>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<Value> =
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(bars_from_records(&records)?)
}

async fn analyze(args: AnalyzeArgs, config: Arc<StockConfig>) -> anyhow::Result<()> {
    let symbol = normalize_symbol(&args.symbol)?;
    let language = args.lang.unwrap_or(config.language);

    let result = match &args.input {
        // File bars are analyzed whole, no lookback window
        Some(path) => {
            let (bars, analysis_date) = offline_window(read_bars(path)?, args.date);
            info!(symbol = %symbol, path = %path.display(), bars = bars.len(), "Analyzing offline bars");
            TechnicalEngine::new()
                .analyze(&bars)
                .map(|analysis| (analysis, analysis_date))
        }
        None => {
            let analysis_date = args.date.unwrap_or_else(market_today);
            let days = args.days.unwrap_or(config.history_days);
            let provider = CachedProvider::new(
                YahooFinanceClient::new(Arc::clone(&config)),
                StockCache::new(config.cache_ttl),
            );
            let tool = TechnicalDataTool::new(Arc::new(provider), Arc::clone(&config));
            info!(symbol = %symbol, days, "Analyzing");
            tool.load_bars(&symbol, days, analysis_date)
                .await
                .and_then(|bars| tool.engine().analyze(&bars))
                .map(|analysis| (analysis, analysis_date))
        }
    };
    let (analysis, analysis_date) = match result {
        Ok(found) => found,
        Err(e) => {
            let formatter = ReportFormat::Text.formatter(language);
            eprintln!("{}", formatter.format_error(&symbol, &e));
            std::process::exit(1);
        }
    };

    let report = TechnicalReport {
        symbol: &symbol,
        analysis_date,
        analysis: &analysis,
    };
    match args.format {
        OutputFormat::Text => {
            println!("{}", ReportFormat::Text.formatter(language).format_report(&report));
        }
        OutputFormat::Markdown => {
            println!("{}", ReportFormat::Markdown.formatter(language).format_report(&report));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
    }

    if let Some(n) = args.rows {
        println!("\n{}", indicator_table(&analysis, n));
    }
    Ok(())
}

fn indicator_table(analysis: &TechnicalAnalysis, n: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Date", "Close", "Volume", "SMA20", "SMA50", "SMA200", "MACD", "Signal", "RSI", "BB Upper",
        "BB Lower", "OBV",
    ]);

    for row in analysis.recent(n) {
        table.add_row(row_cells(row));
    }
    table
}

fn row_cells(row: &IndicatorRow) -> Vec<Cell> {
    let numbers = [
        thousands(row.close, 2),
        thousands(row.volume, 0),
        thousands_opt(row.sma_short, 2),
        thousands_opt(row.sma_medium, 2),
        thousands_opt(row.sma_long, 2),
        fixed_opt(Some(row.macd), 2),
        fixed_opt(Some(row.macd_signal), 2),
        fixed_opt(Some(row.rsi), 2),
        thousands_opt(row.bb_upper, 2),
        thousands_opt(row.bb_lower, 2),
        thousands(row.obv, 0),
    ];
    std::iter::once(Cell::new(row.date))
        .chain(
            numbers
                .into_iter()
                .map(|v| Cell::new(v).set_alignment(CellAlignment::Right)),
        )
        .collect()
}

fn list_tools(config: Arc<StockConfig>) {
    let agent = TechnicalAnalystAgent::with_provider(Arc::new(StaticProvider::new()), config);
    for tool in agent.tools().list_tools() {
        println!("{}\n  {}", tool.name(), tool.description());
        match serde_json::to_string_pretty(&tool.input_schema()) {
            Ok(schema) => println!("{schema}\n"),
            Err(e) => eprintln!("  schema unavailable: {e}"),
        }
    }
}
