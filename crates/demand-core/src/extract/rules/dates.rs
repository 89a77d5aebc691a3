//! Date parsing and canonical date formatting.

use chrono::NaiveDate;

use crate::models::canonical::{Canonical, CanonicalDate};

/// Accepted textual date forms, in priority order.
pub const ACCEPTED_FORMATS: [&str; 5] = ["%b %d %Y", "%b %d, %Y", "%m %d %Y", "%m/%d/%Y", "%Y-%m-%d"];

/// Canonical output form used wherever a date is displayed.
pub const DISPLAY_FORMAT: &str = "%b %d, %Y";

/// Parse a date in any of the [`ACCEPTED_FORMATS`].
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_date_with_formats(text, &ACCEPTED_FORMATS)
}

/// Parse a date trying each format in order; the first full match wins.
///
/// When every format fails, commas are stripped and `Mon D YYYY` is tried once
/// more, which absorbs stray commas around the day.
pub fn parse_date_with_formats(text: &str, formats: &[&str]) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(&text.replace(',', ""), "%b %d %Y").ok())
}

/// Render a date as `Mon DD, YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Canonicalize a human-entered date. Unparseable text passes through.
pub fn normalize_date(text: &str) -> Canonical<CanonicalDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Canonical::Absent;
    }
    match parse_date(trimmed) {
        Some(date) => Canonical::Parsed(CanonicalDate(date)),
        None => Canonical::Unparsed(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nov_7() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 7).unwrap()
    }

    #[test]
    fn test_all_formats_agree() {
        for input in [
            "2025-11-07",
            "11/07/2025",
            "11 07 2025",
            "Nov 7, 2025",
            "Nov 07, 2025",
            "Nov 7 2025",
            "Nov 07 2025",
        ] {
            let parsed = parse_date(input);
            assert_eq!(parsed, Some(nov_7()), "input {input:?}");
            assert_eq!(format_date(parsed.unwrap()), "Nov 07, 2025");
        }
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(parse_date("  2025-11-07\n"), Some(nov_7()));
    }

    #[test]
    fn test_rejects_partial_and_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("2025-11-07 and more"), None);
        assert_eq!(parse_date("2025-13-40"), None);
    }

    #[test]
    fn test_custom_format_list() {
        assert_eq!(parse_date_with_formats("07.11.2025", &["%d.%m.%Y"]), Some(nov_7()));
        assert_eq!(parse_date_with_formats("2025-11-07", &["%d.%m.%Y"]), None);
    }

    #[test]
    fn test_normalize_date_passthrough() {
        assert_eq!(normalize_date("   "), Canonical::Absent);
        assert_eq!(normalize_date("11/07/2025").display(), "Nov 07, 2025");
        assert_eq!(
            normalize_date(" the first Monday "),
            Canonical::Unparsed("the first Monday".to_string())
        );
    }
}
