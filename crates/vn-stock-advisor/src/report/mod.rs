//! Human-readable technical reports

pub mod formatter;
pub mod language;
pub mod number;

pub use formatter::{
    Formatter, MarkdownFormatter, PlainTextFormatter, TechnicalReport, describe, error_message,
};
pub use language::Language;

/// Text layouts a report can be rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
}

impl ReportFormat {
    /// Formatter for this layout
    pub fn formatter(self, language: Language) -> Box<dyn Formatter> {
        match self {
            ReportFormat::Text => Box::new(PlainTextFormatter::new(language)),
            ReportFormat::Markdown => Box::new(MarkdownFormatter::new(language)),
        }
    }
}
