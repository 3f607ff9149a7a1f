//! Conversion from untyped price records to [`PriceBar`]s
//!
//! Price history reaches the engine either from a typed provider or as a
//! list of JSON objects (a tool call with inline bars, a file on disk). The
//! column check happens here so the engine itself only ever sees complete
//! bars.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use super::bar::{PriceBar, normalize_bars};
use crate::error::{Result, StockError};

/// Columns every record must carry
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "close", "volume", "high", "low"];

/// Accepted spellings per column; the first one is canonical
const ALIASES: [(&str, &[&str]); 6] = [
    ("date", &["date", "time", "timestamp"]),
    ("open", &["open"]),
    ("high", &["high"]),
    ("low", &["low"]),
    ("close", &["close"]),
    ("volume", &["volume"]),
];

fn aliases(column: &str) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(name, _)| *name == column)
        .map_or(&[], |(_, names)| *names)
}

fn lookup<'a>(record: &'a Map<String, Value>, column: &str) -> Option<&'a Value> {
    aliases(column).iter().find_map(|name| {
        record
            .get(*name)
            .or_else(|| record.get(&name.to_uppercase()))
            .or_else(|| {
                // Capitalized headers ("Close") from spreadsheet exports
                let mut chars = name.chars();
                chars.next().and_then(|first| {
                    let capitalized = first.to_uppercase().chain(chars).collect::<String>();
                    record.get(&capitalized)
                })
            })
    })
}

static NULL: Value = Value::Null;

fn field<'a>(record: &'a Map<String, Value>, column: &str) -> &'a Value {
    lookup(record, column).unwrap_or(&NULL)
}

fn parse_number(value: &Value, index: usize, column: &str) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(StockError::InvalidRecord {
            index,
            reason: format!("{column} is not a finite number: {value}"),
        }),
    }
}

fn parse_date(value: &Value, index: usize) -> Result<NaiveDate> {
    let parsed = match value {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                        .ok()
                        .map(|dt| dt.date())
                })
                .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        }
        // Unix seconds, or milliseconds for values past year 2286 in seconds
        Value::Number(n) => n.as_i64().and_then(|ts| {
            let secs = if ts > 10_000_000_000 { ts / 1000 } else { ts };
            DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
        }),
        _ => None,
    };
    parsed.ok_or_else(|| StockError::InvalidRecord {
        index,
        reason: format!("unrecognized date: {value}"),
    })
}

/// Convert JSON records into ordered bars
///
/// Every record must be an object carrying the [`REQUIRED_COLUMNS`]
/// (`date` may also be spelled `time` or `timestamp`). When any column is
/// absent from any record, all absent columns are reported together. A
/// missing `open` falls back to the record's close. The result is sorted by
/// date with duplicate dates collapsed to the last record.
pub fn bars_from_records(records: &[Value]) -> Result<Vec<PriceBar>> {
    let mut objects = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let object = record.as_object().ok_or_else(|| StockError::InvalidRecord {
            index,
            reason: "record is not an object".to_string(),
        })?;
        objects.push(object);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| objects.iter().any(|o| lookup(o, column).is_none()))
        .map(|column| (*column).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StockError::MissingColumns(missing));
    }

    let mut bars = Vec::with_capacity(objects.len());
    for (index, object) in objects.into_iter().enumerate() {
        let close = parse_number(field(object, "close"), index, "close")?;
        let open = match lookup(object, "open") {
            Some(Value::Null) | None => close,
            Some(v) => parse_number(v, index, "open")?,
        };

        bars.push(PriceBar {
            date: parse_date(field(object, "date"), index)?,
            open,
            high: parse_number(field(object, "high"), index, "high")?,
            low: parse_number(field(object, "low"), index, "low")?,
            close,
            volume: parse_number(field(object, "volume"), index, "volume")?,
        });
    }

    Ok(normalize_bars(bars))
}
