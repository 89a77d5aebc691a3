//! Dollar amount parsing and formatting.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::MONEY_LITERAL;
use crate::models::canonical::{Canonical, Money};

/// Parse a free-form dollar amount such as `$12,345.67` or ` 12345.67 USD`.
///
/// Every character other than digits, `.` and `-` is dropped before parsing.
/// Empty input is `Absent`; input whose residue is not a number is kept as
/// `Unparsed` so a human-entered value can be shown verbatim.
pub fn parse_money(text: &str) -> Canonical<Money> {
    if text.is_empty() {
        return Canonical::Absent;
    }

    match parse_amount(text) {
        Some(amount) => Canonical::Parsed(Money::new(amount)),
        None => Canonical::Unparsed(text.to_string()),
    }
}

/// Numeric value of a money string after stripping non `[0-9.-]` characters.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if !MONEY_LITERAL.is_match(&cleaned) {
        return None;
    }

    let (sign, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cleaned.as_str()),
    };
    let digits = digits.strip_suffix('.').unwrap_or(digits);
    let normalized = if digits.starts_with('.') {
        format!("{sign}0{digits}")
    } else {
        format!("{sign}{digits}")
    };

    Decimal::from_str(&normalized).ok()
}

/// Format an amount with thousands separators and two decimals (`12,345.67`).
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let s = format!("{:.2}", rounded);
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let Some((integer_part, decimal_part)) = unsigned.split_once('.') else {
        return s;
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::with_capacity(chars.len() + chars.len() / 3);

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}{}.{}", sign, formatted, decimal_part)
}
