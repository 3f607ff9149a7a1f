//! Report language

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the report can be rendered in
///
/// # Examples
///
/// ```
/// use vn_stock_advisor::report::Language;
///
/// assert_eq!(Language::default(), Language::Vietnamese);
/// assert_eq!(Language::from_code("EN"), Some(Language::English));
/// assert_eq!(Language::from_code("tiếng việt"), Some(Language::Vietnamese));
/// assert_eq!(Language::from_code("ja"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// Vietnamese
    #[default]
    #[serde(rename = "vi")]
    Vietnamese,
    /// English
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Get ISO 639-1 language code
    pub fn code(self) -> &'static str {
        match self {
            Language::Vietnamese => "vi",
            Language::English => "en",
        }
    }

    /// Get language name for display
    pub fn name(self) -> &'static str {
        match self {
            Language::Vietnamese => "Tiếng Việt",
            Language::English => "English",
        }
    }

    /// Parse from ISO 639-1 code or common name
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "vi" | "vn" | "vi-vn" | "vietnamese" | "tiếng việt" => Some(Language::Vietnamese),
            "en" | "en-us" | "en-gb" | "english" => Some(Language::English),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| format!("unsupported language '{s}' (expected vi or en)"))
    }
}
