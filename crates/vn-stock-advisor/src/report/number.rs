//! Number formatting for reports

/// Placeholder for a value that is not defined yet
pub const NOT_AVAILABLE: &str = "N/A";

/// Fixed decimals with `,` thousands separators: `25300.5` → `25,300.50`
pub fn thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    // Rounding can turn a tiny negative into zero
    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// [`thousands`] for a value that may be undefined
pub fn thousands_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| thousands(v, decimals))
}

/// Plain fixed decimals, no grouping
pub fn fixed_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(25_300.5, 2), "25,300.50");
        assert_eq!(thousands(999.0, 0), "999");
        assert_eq!(thousands(1_000.0, 0), "1,000");
        assert_eq!(thousands(12_345_678.0, 0), "12,345,678");
        assert_eq!(thousands(-1_234.567, 2), "-1,234.57");
        assert_eq!(thousands(0.0, 2), "0.00");
        assert_eq!(thousands(-0.001, 2), "0.00");
        assert_eq!(thousands(f64::NAN, 2), NOT_AVAILABLE);
    }

    #[test]
    fn test_optional_values() {
        assert_eq!(thousands_opt(None, 2), NOT_AVAILABLE);
        assert_eq!(thousands_opt(Some(1_500_000.0), 0), "1,500,000");
        assert_eq!(fixed_opt(Some(1.23456), 2), "1.23");
        assert_eq!(fixed_opt(None, 2), NOT_AVAILABLE);
    }
}
