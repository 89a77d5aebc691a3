//! Label/value extraction: a label pattern whose first capture group is the value.

use regex::Regex;

use super::{ExtractionMatch, FieldExtractor};

/// Extracts the first capture group of a labeled pattern, trimmed.
#[derive(Debug, Clone)]
pub struct LabelExtractor {
    pattern: Regex,
}

impl LabelExtractor {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl From<&Regex> for LabelExtractor {
    fn from(pattern: &Regex) -> Self {
        Self::new(pattern.clone())
    }
}

impl FieldExtractor for LabelExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let value = caps.get(1)?;
                let trimmed = value.as_str().trim();
                if trimmed.is_empty() {
                    return None;
                }
                Some(
                    ExtractionMatch::new(trimmed.to_string(), value.as_str())
                        .with_position(value.start(), value.end()),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::rules::patterns::{BUSINESS_NAME_LINE, MERCHANT_LINE, PARTNER_BLOCK};

    #[test]
    fn test_merchant_line() {
        let extractor = LabelExtractor::from(&*MERCHANT_LINE);
        let found = extractor.extract("Summary\nMerchant   ACME Corp  \nFee $1").unwrap();
        assert_eq!(found.value, "ACME Corp");
        assert!(found.position.is_some());
    }

    #[test]
    fn test_business_name_line() {
        let extractor = LabelExtractor::from(&*BUSINESS_NAME_LINE);
        assert_eq!(
            extractor.extract("Business Name: Blue Fern LLC\n").map(|m| m.value),
            Some("Blue Fern LLC".to_string())
        );
        assert!(extractor.extract("Business Name Blue Fern LLC").is_none());
    }

    #[test]
    fn test_partner_on_next_line() {
        let extractor = LabelExtractor::from(&*PARTNER_BLOCK);
        let found = extractor.extract("Partner / Processor\nStripe Inc.\nOther").unwrap();
        assert_eq!(found.value, "Stripe Inc.");
    }

    #[test]
    fn test_extract_all_in_order() {
        let extractor = LabelExtractor::from(&*MERCHANT_LINE);
        let all: Vec<String> = extractor
            .extract_all("Merchant One\nMerchant Two\n")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(all, vec!["One".to_string(), "Two".to_string()]);
    }
}
