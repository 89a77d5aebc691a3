//! Canonical value types shared by extraction, aggregation and letters.
//!
//! Every date, amount and rate that leaves the core is one of these types, so
//! all outputs agree on a single display form:
//! - dates: `Nov 07, 2025`
//! - money: `$12,345.67`
//! - percentages: `14%` / `14.5%`

use std::fmt;
use std::ops::Mul;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use crate::extract::rules::dates::format_date;
use crate::extract::rules::money::format_usd;

/// Outcome of canonicalizing a free-form input value.
///
/// `Unparsed` keeps text a human typed that could not be understood, so it can
/// be shown verbatim instead of silently blanked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Canonical<T> {
    /// Nothing was supplied.
    #[default]
    Absent,
    /// Parsed into its canonical form.
    Parsed(T),
    /// Supplied, but not understood. Holds the original text.
    Unparsed(String),
}

impl<T> Canonical<T> {
    /// The parsed value, if any.
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Canonical::Parsed(value) => Some(value),
            _ => None,
        }
    }

    /// Consume and return the parsed value, dropping pass-through text.
    pub fn into_parsed(self) -> Option<T> {
        match self {
            Canonical::Parsed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Canonical::Absent)
    }
}

impl<T: fmt::Display> Canonical<T> {
    /// Display string: canonical form, the original text, or empty.
    pub fn display(&self) -> String {
        match self {
            Canonical::Absent => String::new(),
            Canonical::Parsed(value) => value.to_string(),
            Canonical::Unparsed(raw) => raw.clone(),
        }
    }

    /// Display string, with `None` for absent input.
    pub fn display_opt(&self) -> Option<String> {
        match self {
            Canonical::Absent => None,
            other => Some(other.display()),
        }
    }
}

impl<T: fmt::Display> Serialize for Canonical<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Canonical::Absent => serializer.serialize_none(),
            other => serializer.serialize_str(&other.display()),
        }
    }
}

/// A calendar date rendered as `MMM DD, YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(pub NaiveDate);

impl CanonicalDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CanonicalDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_date(self.0))
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// A signed dollar amount rendered as `$12,345.67`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Raw numeric value.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Sum, or `None` when it falls outside the representable range.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Difference, or `None` when it falls outside the representable range.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Zero-floored difference, used for shortfalls. `None` on overflow.
    pub fn shortfall_after(self, paid: Money) -> Option<Money> {
        self.checked_sub(paid).map(|owed| owed.max(Money::ZERO))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", format_usd(self.0))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl Mul<Percent> for Money {
    type Output = Money;

    fn mul(self, rate: Percent) -> Money {
        Money(self.0 * rate.fraction())
    }
}

/// A percentage clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(Decimal);

impl Percent {
    /// Build a percentage, clamping out-of-range values.
    pub fn new(value: Decimal) -> Self {
        Self(value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Value in percent units (14 for 14%).
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Value as a fraction (0.14 for 14%).
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        write!(f, "{}%", rounded)
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(dec("12345.67")).to_string(), "$12,345.67");
        assert_eq!(Money::new(dec("0")).to_string(), "$0.00");
        assert_eq!(Money::new(dec("1234567.5")).to_string(), "$1,234,567.50");
    }

    #[test]
    fn test_money_shortfall_after() {
        let due = Money::new(dec("70"));
        let paid = Money::new(dec("140"));
        assert_eq!(due.shortfall_after(paid), Some(Money::ZERO));
        assert_eq!(paid.shortfall_after(due), Some(Money::new(dec("70"))));
    }

    #[test]
    fn test_money_overflow_is_none() {
        let max = Money::new(Decimal::MAX);
        let min = Money::new(Decimal::MIN);
        let one = Money::new(dec("1"));

        assert_eq!(max.checked_add(one), None);
        assert_eq!(min.checked_sub(one), None);
        assert_eq!(max.shortfall_after(min), None);
        assert_eq!(max.checked_add(min), Some(Money::ZERO));
    }

    #[test]
    fn test_money_times_percent() {
        let revenue = Money::new(dec("1500"));
        let rate = Percent::new(dec("14"));
        assert_eq!((revenue * rate).to_string(), "$210.00");
    }

    #[test]
    fn test_percent_clamps_and_trims() {
        assert_eq!(Percent::new(dec("150")).to_string(), "100%");
        assert_eq!(Percent::new(dec("-5")).to_string(), "0%");
        assert_eq!(Percent::new(dec("14.50")).to_string(), "14.5%");
        assert_eq!(Percent::new(dec("14.00")).to_string(), "14%");
        assert_eq!(Percent::new(dec("12.345")).to_string(), "12.35%");
    }

    #[test]
    fn test_canonical_serializes_display_or_null() {
        let parsed: Canonical<Money> = Canonical::Parsed(Money::new(dec("10")));
        let raw: Canonical<Money> = Canonical::Unparsed("ten dollars".to_string());
        let absent: Canonical<Money> = Canonical::Absent;

        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"$10.00\"");
        assert_eq!(serde_json::to_string(&raw).unwrap(), "\"ten dollars\"");
        assert_eq!(serde_json::to_string(&absent).unwrap(), "null");
    }

    #[test]
    fn test_canonical_date_display() {
        let date = CanonicalDate(NaiveDate::from_ymd_opt(2025, 11, 7).unwrap());
        assert_eq!(date.to_string(), "Nov 07, 2025");
    }
}
