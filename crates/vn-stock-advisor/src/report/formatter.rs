//! Text rendering of a technical analysis
//!
//! A report is assembled once as a list of titled sections and then laid
//! out by a [`Formatter`]: plain text for the agent prompt, markdown for
//! humans.

use chrono::NaiveDate;

use super::language::Language;
use super::number::{fixed_opt, thousands, thousands_opt};
use crate::analysis::{
    BandZone, Bias, IndicatorParams, Level, RsiZone, Signal, Snapshot, TechnicalAnalysis, Trend,
    VolumeLevel,
};
use crate::error::StockError;

/// Number of previous sessions listed under recent closes (T-1..T-4)
pub const PREVIOUS_SESSIONS: usize = 4;

/// Inputs of one rendered report
#[derive(Debug, Clone, Copy)]
pub struct TechnicalReport<'a> {
    pub symbol: &'a str,
    /// Day the analysis was run
    pub analysis_date: NaiveDate,
    pub analysis: &'a TechnicalAnalysis,
}

/// Lays a [`TechnicalReport`] out as text
pub trait Formatter: Send + Sync {
    fn language(&self) -> Language;

    fn format_report(&self, report: &TechnicalReport<'_>) -> String;

    /// One-line localized failure message
    fn format_error(&self, symbol: &str, error: &StockError) -> String {
        error_message(self.language(), symbol, error)
    }
}

/// Plain text, the layout the agent prompt consumes
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextFormatter {
    pub language: Language,
}

/// Markdown with headings, for terminals and chat surfaces
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormatter {
    pub language: Language,
}

impl PlainTextFormatter {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl MarkdownFormatter {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl Formatter for PlainTextFormatter {
    fn language(&self) -> Language {
        self.language
    }

    fn format_report(&self, report: &TechnicalReport<'_>) -> String {
        let mut out = String::new();
        for section in sections(report, self.language) {
            if let Some(title) = section.title {
                out.push_str(&title.to_uppercase());
                out.push_str(":\n");
                for line in &section.lines {
                    match line {
                        Line::Item(text) => out.push_str(&format!("- {text}\n")),
                        Line::Heading(text) => out.push_str(&format!("{text}:\n")),
                    }
                }
            } else {
                for line in &section.lines {
                    let (Line::Item(text) | Line::Heading(text)) = line;
                    out.push_str(text);
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}

impl Formatter for MarkdownFormatter {
    fn language(&self) -> Language {
        self.language
    }

    fn format_report(&self, report: &TechnicalReport<'_>) -> String {
        let mut out = format!("# {}\n\n", report.symbol);
        for section in sections(report, self.language) {
            if let Some(title) = section.title {
                out.push_str(&format!("## {title}\n\n"));
            }
            for line in &section.lines {
                match line {
                    Line::Item(text) => out.push_str(&format!("- {text}\n")),
                    Line::Heading(text) => out.push_str(&format!("\n**{text}**\n\n")),
                }
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    fn format_error(&self, symbol: &str, error: &StockError) -> String {
        format!("> {}", error_message(self.language, symbol, error))
    }
}

enum Line {
    Item(String),
    Heading(String),
}

struct Section {
    title: Option<&'static str>,
    lines: Vec<Line>,
}

struct Labels {
    symbol: &'static str,
    analysis_date: &'static str,
    latest_session: &'static str,
    current_price: &'static str,
    trading_volume: &'static str,
    shares: &'static str,
    recent_closes: &'static str,
    volume: &'static str,
    price_indicators: &'static str,
    volume_indicators: &'static str,
    current_volume: &'static str,
    average: &'static str,
    sessions: &'static str,
    volume_ratio: &'static str,
    levels: &'static str,
    resistance: &'static str,
    support: &'static str,
    no_levels: &'static str,
    narrative: &'static str,
}

const VI: Labels = Labels {
    symbol: "Mã cổ phiếu",
    analysis_date: "Ngày phân tích",
    latest_session: "Phiên gần nhất",
    current_price: "Giá hiện tại",
    trading_volume: "Khối lượng giao dịch",
    shares: "cp",
    recent_closes: "Giá đóng cửa gần nhất",
    volume: "Khối lượng",
    price_indicators: "Chỉ số kỹ thuật",
    volume_indicators: "Chỉ số khối lượng",
    current_volume: "Khối lượng hiện tại",
    average: "Trung bình",
    sessions: "phiên",
    volume_ratio: "Tỷ lệ Khối lượng / Trung bình",
    levels: "Vùng hỗ trợ và kháng cự",
    resistance: "Vùng kháng cự",
    support: "Vùng hỗ trợ",
    no_levels: "Chưa xác định",
    narrative: "Nhận định kỹ thuật",
};

const EN: Labels = Labels {
    symbol: "Ticker",
    analysis_date: "Analysis date",
    latest_session: "Latest session",
    current_price: "Current price",
    trading_volume: "Trading volume",
    shares: "shares",
    recent_closes: "Recent closes",
    volume: "Volume",
    price_indicators: "Technical indicators",
    volume_indicators: "Volume indicators",
    current_volume: "Current volume",
    average: "Average",
    sessions: "sessions",
    volume_ratio: "Volume / average",
    levels: "Support and resistance",
    resistance: "Resistance",
    support: "Support",
    no_levels: "None found",
    narrative: "Technical assessment",
};

fn labels(language: Language) -> &'static Labels {
    match language {
        Language::Vietnamese => &VI,
        Language::English => &EN,
    }
}

fn price(value: f64) -> String {
    format!("{} VND", thousands(value, 2))
}

fn sections(report: &TechnicalReport<'_>, language: Language) -> Vec<Section> {
    let l = labels(language);
    let analysis = report.analysis;
    let p = &analysis.params;
    let snapshot = &analysis.summary.snapshot;
    let Some(latest) = analysis.latest() else {
        return Vec::new();
    };

    let header = Section {
        title: None,
        lines: vec![
            Line::Item(format!("{}: {}", l.symbol, report.symbol)),
            Line::Item(format!("{}: {}", l.analysis_date, report.analysis_date.format("%Y-%m-%d"))),
            Line::Item(format!("{}: {}", l.latest_session, latest.date.format("%Y-%m-%d"))),
            Line::Item(format!("{}: {}", l.current_price, price(snapshot.price))),
            Line::Item(format!("{}: {} {}", l.trading_volume, thousands(latest.volume, 0), l.shares)),
        ],
    };

    // T-1 is the bar before the latest one
    let previous: Vec<Line> = analysis
        .rows
        .iter()
        .rev()
        .skip(1)
        .take(PREVIOUS_SESSIONS)
        .enumerate()
        .map(|(i, row)| {
            Line::Item(format!(
                "T-{}: {} ({}: {} {})",
                i + 1,
                price(row.close),
                l.volume,
                thousands(row.volume, 0),
                l.shares
            ))
        })
        .collect();

    let price_indicators = vec![
        Line::Item(format!("SMA ({}): {}", p.sma_short, thousands_opt(latest.sma_short, 2))),
        Line::Item(format!("SMA ({}): {}", p.sma_medium, thousands_opt(latest.sma_medium, 2))),
        Line::Item(format!("SMA ({}): {}", p.sma_long, thousands_opt(latest.sma_long, 2))),
        Line::Item(format!("EMA ({}): {}", p.ema_fast, thousands(latest.ema_fast, 2))),
        Line::Item(format!("EMA ({}): {}", p.ema_slow, thousands(latest.ema_slow, 2))),
        Line::Item(format!("RSI ({}): {:.2}", p.rsi_period, latest.rsi)),
        Line::Item(format!("MACD: {:.2}", latest.macd)),
        Line::Item(format!("MACD Signal: {:.2}", latest.macd_signal)),
        Line::Item(format!("MACD Histogram: {:.2}", latest.macd_hist)),
        Line::Item(format!("Bollinger Upper: {}", thousands_opt(latest.bb_upper, 2))),
        Line::Item(format!("Bollinger Middle: {}", thousands_opt(latest.bb_middle, 2))),
        Line::Item(format!("Bollinger Lower: {}", thousands_opt(latest.bb_lower, 2))),
    ];

    let average = |window: usize, value: Option<f64>| {
        Line::Item(format!(
            "{} {window} {}: {} {}",
            l.average,
            l.sessions,
            thousands_opt(value, 0),
            l.shares
        ))
    };
    let volume_indicators = vec![
        Line::Item(format!("{}: {} {}", l.current_volume, thousands(latest.volume, 0), l.shares)),
        average(p.volume_short, latest.volume_sma_short),
        average(p.volume_medium, latest.volume_sma_medium),
        average(p.volume_long, latest.volume_sma_long),
        Line::Item(format!(
            "{} {}: {}",
            l.volume_ratio,
            p.volume_medium,
            fixed_opt(latest.volume_ratio_medium, 2)
        )),
        Line::Item(format!("On-Balance Volume (OBV): {}", thousands(latest.obv, 0))),
    ];

    let level_lines = |heading: &str, prefix: char, levels: &[Level]| {
        let mut lines = vec![Line::Heading(heading.to_string())];
        if levels.is_empty() {
            lines.push(Line::Item(l.no_levels.to_string()));
        }
        lines.extend(
            levels
                .iter()
                .enumerate()
                .map(|(i, level)| Line::Item(format!("{prefix}{}: {}", i + 1, price(level.price)))),
        );
        lines
    };
    let mut levels = level_lines(l.resistance, 'R', &analysis.levels.resistance);
    levels.extend(level_lines(l.support, 'S', &analysis.levels.support));

    let narrative = analysis
        .summary
        .signals
        .iter()
        .map(|signal| Line::Item(describe(signal, snapshot, p, language)))
        .collect();

    vec![
        header,
        Section {
            title: Some(l.recent_closes),
            lines: previous,
        },
        Section {
            title: Some(l.price_indicators),
            lines: price_indicators,
        },
        Section {
            title: Some(l.volume_indicators),
            lines: volume_indicators,
        },
        Section {
            title: Some(l.levels),
            lines: levels,
        },
        Section {
            title: Some(l.narrative),
            lines: narrative,
        },
    ]
}

fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

/// Human-readable line for one narrative signal
pub fn describe(signal: &Signal, snapshot: &Snapshot, params: &IndicatorParams, language: Language) -> String {
    let (s, m, lg) = (params.sma_short, params.sma_medium, params.sma_long);
    let (vs, vm, vl) = (params.volume_short, params.volume_medium, params.volume_long);
    let t = &params.thresholds;

    match language {
        Language::Vietnamese => match signal {
            Signal::LongTermTrend(Trend::Up) => {
                format!("Xu hướng dài hạn: TĂNG (Giá trên SMA {lg}, SMA {m} trên SMA {lg})")
            }
            Signal::LongTermTrend(Trend::Down) => {
                format!("Xu hướng dài hạn: GIẢM (Giá dưới SMA {lg}, SMA {m} dưới SMA {lg})")
            }
            Signal::LongTermTrend(Trend::Neutral) => {
                "Xu hướng dài hạn: TRUNG LẬP (Tín hiệu trái chiều giữa các SMA)".to_string()
            }
            Signal::ShortTermTrend(Trend::Up) => {
                format!("Xu hướng ngắn hạn: TĂNG (Giá trên SMA {s}, SMA {s} trên SMA {m})")
            }
            Signal::ShortTermTrend(Trend::Down) => {
                format!("Xu hướng ngắn hạn: GIẢM (Giá dưới SMA {s}, SMA {s} dưới SMA {m})")
            }
            Signal::ShortTermTrend(Trend::Neutral) => {
                "Xu hướng ngắn hạn: TRUNG LẬP (Tín hiệu trái chiều giữa SMA ngắn hạn)".to_string()
            }
            Signal::Rsi(RsiZone::Overbought) => format!(
                "RSI: QUÁ MUA (RSI > {:.0}), có khả năng điều chỉnh giảm",
                t.rsi_overbought
            ),
            Signal::Rsi(RsiZone::Oversold) => {
                format!("RSI: QUÁ BÁN (RSI < {:.0}), có khả năng hồi phục", t.rsi_oversold)
            }
            Signal::Rsi(RsiZone::Neutral) => format!("RSI: TRUNG TÍNH ({:.2})", snapshot.rsi),
            Signal::Macd(Bias::Positive) => "MACD: TÍCH CỰC (MACD trên Signal Line)".to_string(),
            Signal::Macd(Bias::Negative) => "MACD: TIÊU CỰC (MACD dưới Signal Line)".to_string(),
            Signal::Bollinger(BandZone::AboveUpper) => {
                "Bollinger Bands: QUÁ MUA (Giá trên dải trên BB)".to_string()
            }
            Signal::Bollinger(BandZone::BelowLower) => {
                "Bollinger Bands: QUÁ BÁN (Giá dưới dải dưới BB)".to_string()
            }
            Signal::Bollinger(BandZone::NearUpper) => {
                "Bollinger Bands: GẦN VÙNG QUÁ MUA (Giá gần dải trên BB)".to_string()
            }
            Signal::Bollinger(BandZone::NearLower) => {
                "Bollinger Bands: GẦN VÙNG QUÁ BÁN (Giá gần dải dưới BB)".to_string()
            }
            Signal::Bollinger(BandZone::Middle) => {
                "Bollinger Bands: TRUNG TÍNH (Giá trong khoảng giữa dải BB)".to_string()
            }
            Signal::Volume(VolumeLevel::VeryHigh) => format!(
                "Khối lượng: RẤT CAO (>{} trung bình {vm} phiên)",
                percent(t.volume_very_high)
            ),
            Signal::Volume(VolumeLevel::High) => format!(
                "Khối lượng: CAO ({}-{} trung bình {vm} phiên)",
                percent(t.volume_high),
                percent(t.volume_very_high)
            ),
            Signal::Volume(VolumeLevel::Low) => format!(
                "Khối lượng: THẤP (<{} trung bình {vm} phiên)",
                percent(t.volume_low)
            ),
            Signal::Volume(VolumeLevel::Normal) => format!(
                "Khối lượng: BÌNH THƯỜNG ({}-{} trung bình {vm} phiên)",
                percent(t.volume_low),
                percent(t.volume_high)
            ),
            Signal::VolumeTrend(Trend::Up) => {
                format!("Xu hướng khối lượng: TĂNG (SMA {vs} > SMA {vm} > SMA {vl})")
            }
            Signal::VolumeTrend(Trend::Down) => {
                format!("Xu hướng khối lượng: GIẢM (SMA {vs} < SMA {vm} < SMA {vl})")
            }
            Signal::VolumeTrend(Trend::Neutral) => "Xu hướng khối lượng: TRUNG LẬP".to_string(),
            Signal::VolumeConfirmation(Bias::Positive) => {
                "Tín hiệu khối lượng: TÍCH CỰC (Khối lượng cao kèm giá tăng)".to_string()
            }
            Signal::VolumeConfirmation(Bias::Negative) => {
                "Tín hiệu khối lượng: TIÊU CỰC (Khối lượng cao kèm giá giảm)".to_string()
            }
        },
        Language::English => match signal {
            Signal::LongTermTrend(Trend::Up) => {
                format!("Long-term trend: UP (price above SMA {lg}, SMA {m} above SMA {lg})")
            }
            Signal::LongTermTrend(Trend::Down) => {
                format!("Long-term trend: DOWN (price below SMA {lg}, SMA {m} below SMA {lg})")
            }
            Signal::LongTermTrend(Trend::Neutral) => {
                "Long-term trend: NEUTRAL (mixed signals between the SMAs)".to_string()
            }
            Signal::ShortTermTrend(Trend::Up) => {
                format!("Short-term trend: UP (price above SMA {s}, SMA {s} above SMA {m})")
            }
            Signal::ShortTermTrend(Trend::Down) => {
                format!("Short-term trend: DOWN (price below SMA {s}, SMA {s} below SMA {m})")
            }
            Signal::ShortTermTrend(Trend::Neutral) => {
                "Short-term trend: NEUTRAL (mixed signals between the short SMAs)".to_string()
            }
            Signal::Rsi(RsiZone::Overbought) => format!(
                "RSI: OVERBOUGHT (RSI > {:.0}), a pullback is possible",
                t.rsi_overbought
            ),
            Signal::Rsi(RsiZone::Oversold) => {
                format!("RSI: OVERSOLD (RSI < {:.0}), a rebound is possible", t.rsi_oversold)
            }
            Signal::Rsi(RsiZone::Neutral) => format!("RSI: NEUTRAL ({:.2})", snapshot.rsi),
            Signal::Macd(Bias::Positive) => "MACD: BULLISH (MACD above the signal line)".to_string(),
            Signal::Macd(Bias::Negative) => "MACD: BEARISH (MACD below the signal line)".to_string(),
            Signal::Bollinger(BandZone::AboveUpper) => {
                "Bollinger Bands: OVERBOUGHT (price above the upper band)".to_string()
            }
            Signal::Bollinger(BandZone::BelowLower) => {
                "Bollinger Bands: OVERSOLD (price below the lower band)".to_string()
            }
            Signal::Bollinger(BandZone::NearUpper) => {
                "Bollinger Bands: NEAR OVERBOUGHT (price close to the upper band)".to_string()
            }
            Signal::Bollinger(BandZone::NearLower) => {
                "Bollinger Bands: NEAR OVERSOLD (price close to the lower band)".to_string()
            }
            Signal::Bollinger(BandZone::Middle) => {
                "Bollinger Bands: NEUTRAL (price in the middle of the bands)".to_string()
            }
            Signal::Volume(VolumeLevel::VeryHigh) => format!(
                "Volume: VERY HIGH (>{} of the {vm}-session average)",
                percent(t.volume_very_high)
            ),
            Signal::Volume(VolumeLevel::High) => format!(
                "Volume: HIGH ({}-{} of the {vm}-session average)",
                percent(t.volume_high),
                percent(t.volume_very_high)
            ),
            Signal::Volume(VolumeLevel::Low) => format!(
                "Volume: LOW (<{} of the {vm}-session average)",
                percent(t.volume_low)
            ),
            Signal::Volume(VolumeLevel::Normal) => format!(
                "Volume: NORMAL ({}-{} of the {vm}-session average)",
                percent(t.volume_low),
                percent(t.volume_high)
            ),
            Signal::VolumeTrend(Trend::Up) => {
                format!("Volume trend: UP (SMA {vs} > SMA {vm} > SMA {vl})")
            }
            Signal::VolumeTrend(Trend::Down) => {
                format!("Volume trend: DOWN (SMA {vs} < SMA {vm} < SMA {vl})")
            }
            Signal::VolumeTrend(Trend::Neutral) => "Volume trend: NEUTRAL".to_string(),
            Signal::VolumeConfirmation(Bias::Positive) => {
                "Volume signal: POSITIVE (high volume with rising price)".to_string()
            }
            Signal::VolumeConfirmation(Bias::Negative) => {
                "Volume signal: NEGATIVE (high volume with falling price)".to_string()
            }
        },
    }
}

/// Localized one-line message for a failed analysis
pub fn error_message(language: Language, symbol: &str, error: &StockError) -> String {
    match (language, error) {
        (Language::Vietnamese, StockError::InsufficientData { .. } | StockError::DataUnavailable { .. }) => {
            format!("Không tìm thấy dữ liệu lịch sử cho cổ phiếu {symbol} ({error})")
        }
        (Language::Vietnamese, StockError::InvalidSymbol(_)) => {
            "Lỗi: Mã cổ phiếu không hợp lệ".to_string()
        }
        (Language::Vietnamese, _) => format!("Lỗi khi lấy dữ liệu kỹ thuật: {error}"),
        (Language::English, StockError::InsufficientData { .. } | StockError::DataUnavailable { .. }) => {
            format!("No price history found for {symbol} ({error})")
        }
        (Language::English, StockError::InvalidSymbol(_)) => {
            "Error: Invalid stock symbol provided".to_string()
        }
        (Language::English, _) => format!("Error retrieving technical data: {error}"),
    }
}
