//! Demand letter inputs and resolved letter fields.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::agreement::ExtractedAgreementFields;
use super::statement::StatementAggregate;

/// A value that can appear in a demand letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterField {
    BusinessName,
    BusinessAddress,
    ContactName,
    Today,
    EffectiveDate,
    DefaultDate,
    LastPaymentDate,
    TotalAdvancePlusFee,
    AdvanceAmount,
    Fee,
    TotalRevenue,
    RrPercent,
    RrAmount,
    SuccessfulPayments,
    PercentOrAmountDue,
    Shortfall,
}

impl LetterField {
    pub const ALL: [LetterField; 16] = [
        LetterField::BusinessName,
        LetterField::BusinessAddress,
        LetterField::ContactName,
        LetterField::Today,
        LetterField::EffectiveDate,
        LetterField::DefaultDate,
        LetterField::LastPaymentDate,
        LetterField::TotalAdvancePlusFee,
        LetterField::AdvanceAmount,
        LetterField::Fee,
        LetterField::TotalRevenue,
        LetterField::RrPercent,
        LetterField::RrAmount,
        LetterField::SuccessfulPayments,
        LetterField::PercentOrAmountDue,
        LetterField::Shortfall,
    ];

    /// Short input key.
    pub fn key(&self) -> &'static str {
        match self {
            LetterField::BusinessName => "business_name",
            LetterField::BusinessAddress => "business_address",
            LetterField::ContactName => "contact_name",
            LetterField::Today => "today",
            LetterField::EffectiveDate => "effective_date",
            LetterField::DefaultDate => "default_date",
            LetterField::LastPaymentDate => "last_payment_date",
            LetterField::TotalAdvancePlusFee => "total_advance_plus_fee",
            LetterField::AdvanceAmount => "advance_amount",
            LetterField::Fee => "fee",
            LetterField::TotalRevenue => "total_revenue",
            LetterField::RrPercent => "rr_percent",
            LetterField::RrAmount => "rr_amount",
            LetterField::SuccessfulPayments => "successful_payments",
            LetterField::PercentOrAmountDue => "percent_or_amount_due",
            LetterField::Shortfall => "shortfall",
        }
    }

    /// Long human label, as used by spreadsheet forms.
    pub fn label(&self) -> &'static str {
        match self {
            LetterField::BusinessName => "Business Name",
            LetterField::BusinessAddress => "Business Address",
            LetterField::ContactName => "Contact Name",
            LetterField::Today => "Today",
            LetterField::EffectiveDate => "Effective Date",
            LetterField::DefaultDate => "Date of Default Event",
            LetterField::LastPaymentDate => "Date of Last Payment",
            LetterField::TotalAdvancePlusFee => "Total Advance + Fee",
            LetterField::AdvanceAmount => "Advance Amount",
            LetterField::Fee => "Fee",
            LetterField::TotalRevenue => "Total Revenue Since Agreement to Today",
            LetterField::RrPercent => "Revenue Share Percentage (RR%)",
            LetterField::RrAmount => "Calculated % of Revenue Payable to Pipe ($)",
            LetterField::SuccessfulPayments => "Amount of Successful Payments",
            LetterField::PercentOrAmountDue => {
                "Payment Percentage or Amount Due ($% of Revenue Amount)"
            }
            LetterField::Shortfall => "Shortfall",
        }
    }

    /// Field for an input key, accepting either spelling.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.key() == key || f.label() == key)
    }
}

/// Raw, human-entered letter values keyed by field.
///
/// Blank values are never stored, so "present" always means non-blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemandLetterInput {
    values: BTreeMap<LetterField, String>,
}

impl DemandLetterInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a flat JSON object. For each field the short key is read
    /// first, then the long label. Strings and numbers are accepted; other
    /// values and unknown keys are ignored.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let mut input = Self::new();
        for field in LetterField::ALL {
            let value = [field.key(), field.label()]
                .into_iter()
                .filter_map(|key| map.get(key))
                .find_map(json_text);
            if let Some(value) = value {
                input.set(field, value);
            }
        }
        input
    }

    /// Parse a JSON object body.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self::from_json_map(&map))
    }

    pub fn get(&self, field: LetterField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Set a value; blank text clears the field.
    pub fn set(&mut self, field: LetterField, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    pub fn with(mut self, field: LetterField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_blank(&self, field: LetterField) -> bool {
        !self.values.contains_key(&field)
    }

    /// Set a value only when the field is still blank. Returns whether it was set.
    pub fn fill(&mut self, field: LetterField, value: Option<String>) -> bool {
        match value {
            Some(value) if self.is_blank(field) && !value.trim().is_empty() => {
                self.values.insert(field, value);
                true
            }
            _ => false,
        }
    }

    /// Fill blanks from extracted agreement fields.
    pub fn merge_agreement(&mut self, fields: &ExtractedAgreementFields) -> usize {
        [
            (LetterField::BusinessName, fields.business_name.clone()),
            (LetterField::EffectiveDate, fields.effective_date.map(|d| d.to_string())),
            (LetterField::AdvanceAmount, fields.advance_amount.map(|m| m.to_string())),
            (LetterField::Fee, fields.fee.map(|m| m.to_string())),
            (
                LetterField::TotalAdvancePlusFee,
                fields.total_advance_plus_fee.map(|m| m.to_string()),
            ),
            (LetterField::RrPercent, fields.rr_percent.map(|p| p.to_string())),
        ]
        .into_iter()
        .filter(|(field, value)| self.fill(*field, value.clone()))
        .count()
    }

    /// Fill blanks from statement totals.
    pub fn merge_statement(&mut self, aggregate: &StatementAggregate) -> usize {
        [
            (LetterField::TotalRevenue, Some(aggregate.total_revenue.to_string())),
            (LetterField::SuccessfulPayments, Some(aggregate.total_collected.to_string())),
            (LetterField::RrPercent, aggregate.rr_percent.display_opt()),
            (LetterField::RrAmount, aggregate.rr_amount.map(|m| m.to_string())),
            (LetterField::Shortfall, aggregate.shortfall.map(|m| m.to_string())),
            (
                LetterField::LastPaymentDate,
                aggregate.last_collection_date.map(|d| d.to_string()),
            ),
            (
                LetterField::EffectiveDate,
                aggregate.effective_date_applied.map(|d| d.to_string()),
            ),
        ]
        .into_iter()
        .filter(|(field, value)| self.fill(*field, value.clone()))
        .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LetterField, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Every letter value resolved to its display text.
///
/// Canonical where the input parsed, verbatim where it did not, empty where
/// nothing was supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemandLetter {
    pub business_name: String,
    pub business_address: String,
    pub contact_name: String,
    pub today: String,
    pub effective_date: String,
    pub default_date: String,
    pub last_payment_date: String,
    pub total_advance_plus_fee: String,
    pub advance_amount: String,
    pub fee: String,
    pub total_revenue: String,
    pub rr_percent: String,
    pub rr_amount: String,
    pub successful_payments: String,
    pub percent_or_amount_due: String,
    pub shortfall: String,
}

impl DemandLetter {
    pub fn get(&self, field: LetterField) -> &str {
        match field {
            LetterField::BusinessName => &self.business_name,
            LetterField::BusinessAddress => &self.business_address,
            LetterField::ContactName => &self.contact_name,
            LetterField::Today => &self.today,
            LetterField::EffectiveDate => &self.effective_date,
            LetterField::DefaultDate => &self.default_date,
            LetterField::LastPaymentDate => &self.last_payment_date,
            LetterField::TotalAdvancePlusFee => &self.total_advance_plus_fee,
            LetterField::AdvanceAmount => &self.advance_amount,
            LetterField::Fee => &self.fee,
            LetterField::TotalRevenue => &self.total_revenue,
            LetterField::RrPercent => &self.rr_percent,
            LetterField::RrAmount => &self.rr_amount,
            LetterField::SuccessfulPayments => &self.successful_payments,
            LetterField::PercentOrAmountDue => &self.percent_or_amount_due,
            LetterField::Shortfall => &self.shortfall,
        }
    }

    /// Fields that will print as blanks.
    pub fn blank_fields(&self) -> Vec<LetterField> {
        LetterField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }

    /// `Demand_Letter_<business name>.<extension>` with whitespace runs as `_`.
    pub fn file_name(&self, extension: &str) -> String {
        let safe_name = self.business_name.split_whitespace().collect::<Vec<_>>().join("_");
        format!("Demand_Letter_{}.{}", safe_name, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::canonical::{Money, Percent};
    use rust_decimal::Decimal;

    #[test]
    fn test_keys_and_labels_resolve() {
        for field in LetterField::ALL {
            assert_eq!(LetterField::from_key(field.key()), Some(field));
            assert_eq!(LetterField::from_key(field.label()), Some(field));
        }
        assert_eq!(LetterField::from_key("nonsense"), None);
    }

    #[test]
    fn test_from_json_accepts_both_spellings() {
        let input = DemandLetterInput::from_json(
            r#"{
                "business_name": "ACME Corp",
                "Revenue Share Percentage (RR%)": "14",
                "total_revenue": 1500,
                "Fee": "",
                "fee": null,
                "shortfall": true,
                "unrelated": "x"
            }"#,
        )
        .unwrap();

        assert_eq!(input.get(LetterField::BusinessName), Some("ACME Corp"));
        assert_eq!(input.get(LetterField::RrPercent), Some("14"));
        assert_eq!(input.get(LetterField::TotalRevenue), Some("1500"));
        assert!(input.is_blank(LetterField::Fee));
        assert!(input.is_blank(LetterField::Shortfall));
        assert_eq!(input.iter().count(), 3);
    }

    #[test]
    fn test_short_key_wins_over_label() {
        let input =
            DemandLetterInput::from_json(r#"{"Business Name": "Label Co", "business_name": "Key Co"}"#)
                .unwrap();
        assert_eq!(input.get(LetterField::BusinessName), Some("Key Co"));
    }

    #[test]
    fn test_merge_only_fills_blanks() {
        let mut input = DemandLetterInput::new().with(LetterField::Fee, "$450 (waived in part)");
        let fields = ExtractedAgreementFields {
            business_name: Some("ACME Corp".to_string()),
            fee: Some(Money::new(Decimal::new(500, 0))),
            rr_percent: Some(Percent::new(Decimal::new(14, 0))),
            ..Default::default()
        };

        assert_eq!(input.merge_agreement(&fields), 2);
        assert_eq!(input.get(LetterField::Fee), Some("$450 (waived in part)"));
        assert_eq!(input.get(LetterField::BusinessName), Some("ACME Corp"));
        assert_eq!(input.get(LetterField::RrPercent), Some("14%"));
    }

    #[test]
    fn test_file_name() {
        let letter = DemandLetter {
            business_name: "ACME  Corp\tInc".to_string(),
            ..Default::default()
        };
        assert_eq!(letter.file_name("txt"), "Demand_Letter_ACME_Corp_Inc.txt");
    }
}
