//! Fields extracted from a merchant cash advance agreement.

use serde::Serialize;

use super::canonical::{CanonicalDate, Money, Percent};

/// The fields the agreement extractor looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementField {
    BusinessName,
    EffectiveDate,
    AdvanceAmount,
    Fee,
    TotalAdvancePlusFee,
    RrPercent,
    Partner,
    Product,
}

impl AgreementField {
    pub const ALL: [AgreementField; 8] = [
        AgreementField::BusinessName,
        AgreementField::EffectiveDate,
        AgreementField::AdvanceAmount,
        AgreementField::Fee,
        AgreementField::TotalAdvancePlusFee,
        AgreementField::RrPercent,
        AgreementField::Partner,
        AgreementField::Product,
    ];

    /// Output key, as used in JSON and CSV summaries.
    pub fn key(&self) -> &'static str {
        match self {
            AgreementField::BusinessName => "business_name",
            AgreementField::EffectiveDate => "effective_date",
            AgreementField::AdvanceAmount => "advance_amount",
            AgreementField::Fee => "fee",
            AgreementField::TotalAdvancePlusFee => "total_advance_plus_fee",
            AgreementField::RrPercent => "rr_percent",
            AgreementField::Partner => "partner",
            AgreementField::Product => "product",
        }
    }

    /// Whether a demand letter can be written without this field.
    pub fn is_optional(&self) -> bool {
        matches!(self, AgreementField::Partner | AgreementField::Product)
    }
}

/// Canonical agreement fields. Every value is canonical or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedAgreementFields {
    pub business_name: Option<String>,
    pub effective_date: Option<CanonicalDate>,
    pub advance_amount: Option<Money>,
    pub fee: Option<Money>,
    pub total_advance_plus_fee: Option<Money>,
    pub rr_percent: Option<Percent>,
    pub partner: Option<String>,
    pub product: Option<String>,
}

impl ExtractedAgreementFields {
    /// Display value of a field, if present.
    pub fn display(&self, field: AgreementField) -> Option<String> {
        match field {
            AgreementField::BusinessName => self.business_name.clone(),
            AgreementField::EffectiveDate => self.effective_date.map(|d| d.to_string()),
            AgreementField::AdvanceAmount => self.advance_amount.map(|m| m.to_string()),
            AgreementField::Fee => self.fee.map(|m| m.to_string()),
            AgreementField::TotalAdvancePlusFee => {
                self.total_advance_plus_fee.map(|m| m.to_string())
            }
            AgreementField::RrPercent => self.rr_percent.map(|p| p.to_string()),
            AgreementField::Partner => self.partner.clone(),
            AgreementField::Product => self.product.clone(),
        }
    }

    pub fn is_present(&self, field: AgreementField) -> bool {
        match field {
            AgreementField::BusinessName => self.business_name.is_some(),
            AgreementField::EffectiveDate => self.effective_date.is_some(),
            AgreementField::AdvanceAmount => self.advance_amount.is_some(),
            AgreementField::Fee => self.fee.is_some(),
            AgreementField::TotalAdvancePlusFee => self.total_advance_plus_fee.is_some(),
            AgreementField::RrPercent => self.rr_percent.is_some(),
            AgreementField::Partner => self.partner.is_some(),
            AgreementField::Product => self.product.is_some(),
        }
    }

    /// Required fields that were not found.
    pub fn missing_required(&self) -> Vec<AgreementField> {
        AgreementField::ALL
            .into_iter()
            .filter(|f| !f.is_optional() && !self.is_present(*f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_missing_required_skips_optional() {
        let fields = ExtractedAgreementFields {
            business_name: Some("ACME Corp".to_string()),
            fee: Some(Money::new(Decimal::new(500, 0))),
            ..Default::default()
        };

        assert_eq!(
            fields.missing_required(),
            vec![
                AgreementField::EffectiveDate,
                AgreementField::AdvanceAmount,
                AgreementField::TotalAdvancePlusFee,
                AgreementField::RrPercent,
            ]
        );
    }

    #[test]
    fn test_serializes_canonical_strings() {
        let fields = ExtractedAgreementFields {
            advance_amount: Some(Money::new(Decimal::new(1_000_000, 2))),
            rr_percent: Some(Percent::new(Decimal::new(14, 0))),
            ..Default::default()
        };
        let json = serde_json::to_value(&fields).unwrap();

        assert_eq!(json["advance_amount"], "$10,000.00");
        assert_eq!(json["rr_percent"], "14%");
        assert!(json["business_name"].is_null());
    }
}
