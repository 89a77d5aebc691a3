//! Revenue-share percentage normalization.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::DECIMAL_NUMBER;
use crate::models::canonical::{Canonical, Percent};

/// Parse the first decimal number in `text` as a percentage.
///
/// Surrounding words and `%` signs are ignored and the value is clamped to
/// `[0, 100]`. Text without any number is kept as `Unparsed`.
pub fn parse_percent(text: &str) -> Canonical<Percent> {
    if text.trim().is_empty() {
        return Canonical::Absent;
    }

    DECIMAL_NUMBER
        .find(text)
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
        .map(|value| Canonical::Parsed(Percent::new(value)))
        .unwrap_or_else(|| Canonical::Unparsed(text.to_string()))
}

/// `"14"`, `"14%"`, `"14.0 percent"` all become `"14%"`.
pub fn normalize_percent(text: &str) -> String {
    parse_percent(text).display()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_percent_forms() {
        assert_eq!(normalize_percent("14"), "14%");
        assert_eq!(normalize_percent("14%"), "14%");
        assert_eq!(normalize_percent("14.0 foo"), "14%");
        assert_eq!(normalize_percent("rate of 14.50%"), "14.5%");
        assert_eq!(normalize_percent("12.345"), "12.35%");
    }

    #[test]
    fn test_normalize_percent_clamps() {
        assert_eq!(normalize_percent("150"), "100%");
        assert_eq!(normalize_percent("-5"), "0%");
    }

    #[test]
    fn test_normalize_percent_is_idempotent() {
        for input in ["14", "14.5", "7.25%", "150", "-5", "0.5", "three", "99.999"] {
            let once = normalize_percent(input);
            assert_eq!(normalize_percent(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_non_numeric_passthrough() {
        assert_eq!(normalize_percent("TBD"), "TBD");
        assert_eq!(parse_percent(""), Canonical::Absent);
    }
}
