//! Common regex patterns for agreement and statement extraction.
//!
//! Fixed patterns live in `lazy_static!`. Patterns whose search window or
//! footer text comes from configuration are built by the functions below.

use lazy_static::lazy_static;
use regex::Regex;

/// Dollar figure following a label: `$10,000` or `$10,000.00`.
const DOLLAR_FIGURE: &str = r"\$([\d,]+(?:\.\d{2})?)";

lazy_static! {
    // Business name
    pub static ref MERCHANT_LINE: Regex = Regex::new(
        r"(?i)(?:^|\n)\s*Merchant\s+([^\n]+)"
    ).unwrap();

    pub static ref BUSINESS_NAME_LINE: Regex = Regex::new(
        r"(?i)(?:^|\n)\s*Business\s*Name\s*[:\-–]\s*([^\n]+)"
    ).unwrap();

    // Effective date: only date-shaped values are captured
    pub static ref EFFECTIVE_DATE_LINE: Regex = Regex::new(
        r"(?i)(?:^|\n)\s*Effective\s*Date\s*[:\-–]?\s*([A-Za-z]{3,9}\s+\d{1,2},?\s+\d{4}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{4}-\d{2}-\d{2})"
    ).unwrap();

    pub static ref AGREEMENT_DATE_LINE: Regex = Regex::new(
        r"(?i)(?:^|\n)\s*Agreement\s*Date\s*[:\-–]?\s*([^\n]+)"
    ).unwrap();

    // Partner / processor: the name sits on the line after the label
    pub static ref PARTNER_BLOCK: Regex = Regex::new(
        r"(?i)(?:^|\n)\s*Partner\s*[^\n]*\n([A-Za-z0-9 &'.\-]+)"
    ).unwrap();

    pub static ref PRODUCT_LINE: Regex = Regex::new(
        r"(?i)(?:^|\n)\s*Product\b\s*[:\-–]?\s*([^\n]+)"
    ).unwrap();

    // First signed decimal number in free text
    pub static ref DECIMAL_NUMBER: Regex = Regex::new(
        r"-?\d+(?:\.\d+)?"
    ).unwrap();

    // What remains of a money string after stripping must look like this
    pub static ref MONEY_LITERAL: Regex = Regex::new(
        r"^-?(?:\d+\.?\d*|\.\d+)$"
    ).unwrap();

    // Runs of characters that separate words in a CSV header
    pub static ref HEADER_SEPARATORS: Regex = Regex::new(
        r"[^a-z0-9]+"
    ).unwrap();
}

/// Summary panel: `Pipe Agreement` / `Summary` heading up to the next
/// `Payment Method` heading, a `<page> <footer_domain>` footer line, or the end.
pub fn summary_panel(footer_domain: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?is)(?:^|\n)\s*Pipe\s+Agreement\s*[\r\n]+Summary(.*?)(?:\nPayment\s*Method|\n\d+\s+{}|$)",
        regex::escape(footer_domain)
    ))
}

/// `Advance Amount`, then up to `window` characters, then a dollar figure.
pub fn advance_amount(window: usize) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)Advance\s*Amount[\s\S]{{0,{window}}}?{DOLLAR_FIGURE}"
    ))
}

/// A line starting with `Fee`, then up to `window` characters, then a dollar figure.
pub fn fee(window: usize) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:^|\n)\s*Fee\b[\s\S]{{0,{window}}}?{DOLLAR_FIGURE}"
    ))
}

/// `Total Payment Amount` (or, when `broad`, the other total wordings seen in
/// agreement bodies) followed by a dollar figure.
pub fn total_amount(window: usize, broad: bool) -> Result<Regex, regex::Error> {
    let label = if broad {
        r"Total\s*(?:Payment|Advance|Purchase|Obligation)\s*Amount"
    } else {
        r"Total\s*Payment\s*Amount"
    };
    Regex::new(&format!(
        r"(?i){label}[\s\S]{{0,{window}}}?{DOLLAR_FIGURE}"
    ))
}

/// Revenue-share rate label followed by a percentage-like number.
pub fn revenue_share_rate(window: usize) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:Payment|Remittance|Withholding|Revenue\s*Share|RR%?)\s*Rate[\s\S]{{0,{window}}}?(\d{{1,2}}(?:\.\d+)?%?)"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_panel_stops_at_payment_method() {
        let re = summary_panel("pipe.com").unwrap();
        let text = "Pipe Agreement\nSummary\nMerchant ACME\nPayment Method\nACH";
        let caps = re.captures(text).unwrap();
        assert_eq!(&caps[1], "\nMerchant ACME");
    }

    #[test]
    fn test_summary_panel_stops_at_footer() {
        let re = summary_panel("pipe.com").unwrap();
        let text = "Pipe Agreement\n\nSummary\nFee $5\n1 pipe.com\nMore text";
        let caps = re.captures(text).unwrap();
        assert_eq!(&caps[1], "\nFee $5");
    }

    #[test]
    fn test_advance_amount_window() {
        let re = advance_amount(20).unwrap();
        assert!(re.is_match("Advance Amount (cash) $1,000.00"));
        assert!(!re.is_match(&format!("Advance Amount {} $1,000.00", "x".repeat(40))));
    }

    #[test]
    fn test_fee_requires_line_start() {
        let re = fee(160).unwrap();
        assert!(re.is_match("Terms\nFee  $500.00"));
        assert!(!re.is_match("The Fee is $500.00"));
    }

    #[test]
    fn test_broad_total_label() {
        assert!(total_amount(240, true).unwrap().is_match("Total Purchase Amount: $9,000"));
        assert!(!total_amount(200, false).unwrap().is_match("Total Purchase Amount: $9,000"));
    }
}
