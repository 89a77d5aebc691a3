//! Agreement field extraction: summary panel first, whole document second.

use std::collections::BTreeMap;
use std::time::Instant;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::rules::patterns::{
    self, AGREEMENT_DATE_LINE, BUSINESS_NAME_LINE, EFFECTIVE_DATE_LINE, MERCHANT_LINE,
    PARTNER_BLOCK, PRODUCT_LINE,
};
use super::rules::{
    parse_date, parse_money, parse_percent, FieldExtractor, LabelExtractor, SearchScope,
};
use crate::document::{DocumentKind, DocumentReader};
use crate::error::{DemandError, Result};
use crate::models::agreement::{AgreementField, ExtractedAgreementFields};
use crate::models::canonical::{Canonical, CanonicalDate};
use crate::models::config::ExtractionConfig;

/// Outcome of extracting one agreement.
#[derive(Debug, Clone, Serialize)]
pub struct AgreementExtraction {
    /// Canonical fields; anything not found is absent.
    pub fields: ExtractedAgreementFields,
    /// Where each present field was found.
    pub sources: BTreeMap<AgreementField, SearchScope>,
    /// Whether the summary panel heading was located.
    pub panel_found: bool,
    /// Values that matched a label but could not be canonicalized.
    pub warnings: Vec<String>,
    /// Strategy that produced the text, when extracted from a document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_strategy: Option<&'static str>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl AgreementExtraction {
    /// Required fields that were not found.
    pub fn missing_required(&self) -> Vec<AgreementField> {
        self.fields.missing_required()
    }
}

/// One ranked attempt at a field.
#[derive(Debug, Clone)]
struct FieldRule {
    field: AgreementField,
    extractor: LabelExtractor,
}

impl FieldRule {
    fn new(field: AgreementField, pattern: Regex) -> Self {
        Self {
            field,
            extractor: LabelExtractor::new(pattern),
        }
    }

    fn fixed(field: AgreementField, pattern: &Regex) -> Self {
        Self {
            field,
            extractor: LabelExtractor::from(pattern),
        }
    }
}

/// Windows used to build the rule list for one search scope.
struct ScopeWindows {
    money: usize,
    total: usize,
    rate: usize,
    broad_total: bool,
}

fn build_rules(windows: &ScopeWindows) -> std::result::Result<Vec<FieldRule>, regex::Error> {
    use AgreementField::*;

    Ok(vec![
        FieldRule::fixed(BusinessName, &MERCHANT_LINE),
        FieldRule::fixed(BusinessName, &BUSINESS_NAME_LINE),
        FieldRule::fixed(EffectiveDate, &EFFECTIVE_DATE_LINE),
        FieldRule::fixed(EffectiveDate, &AGREEMENT_DATE_LINE),
        FieldRule::new(AdvanceAmount, patterns::advance_amount(windows.money)?),
        FieldRule::new(Fee, patterns::fee(windows.money)?),
        FieldRule::new(
            TotalAdvancePlusFee,
            patterns::total_amount(windows.total, windows.broad_total)?,
        ),
        FieldRule::new(RrPercent, patterns::revenue_share_rate(windows.rate)?),
        FieldRule::fixed(Partner, &PARTNER_BLOCK),
        FieldRule::fixed(Product, &PRODUCT_LINE),
    ])
}

/// Extracts canonical agreement fields from document text.
///
/// Each field has an ordered list of label rules. The narrow rules run against
/// the summary panel when one is found, otherwise against the whole text. The
/// wide rules (longer windows, broader total labels) then run against the
/// whole document for every field still absent. A value that matches a rule
/// but does not canonicalize is reported as a warning and the search goes on.
#[derive(Debug, Clone)]
pub struct AgreementExtractor {
    panel: Regex,
    panel_rules: Vec<FieldRule>,
    document_rules: Vec<FieldRule>,
    reader: DocumentReader,
}

impl AgreementExtractor {
    /// Build the rule lists for a configuration.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let invalid =
            |e: regex::Error| DemandError::Config(format!("invalid extraction pattern: {}", e));

        let panel = patterns::summary_panel(&config.footer_domain).map_err(invalid)?;
        let panel_rules = build_rules(&ScopeWindows {
            money: config.panel_money_window,
            total: config.panel_total_window,
            rate: config.panel_rate_window,
            broad_total: false,
        })
        .map_err(invalid)?;
        let document_rules = build_rules(&ScopeWindows {
            money: config.document_money_window,
            total: config.document_total_window,
            rate: config.document_rate_window,
            broad_total: true,
        })
        .map_err(invalid)?;

        Ok(Self {
            panel,
            panel_rules,
            document_rules,
            reader: DocumentReader::new(),
        })
    }

    /// Text of the summary panel, if the heading is present.
    pub fn find_panel<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.panel
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Extract fields from already-extracted document text. Never fails;
    /// missing fields are absent.
    pub fn extract(&self, text: &str) -> AgreementExtraction {
        let start = Instant::now();
        info!("Extracting agreement fields from {} chars", text.len());

        let mut state = ExtractionState::default();

        // Without a panel the narrow rules still go first, over the whole text.
        let panel = self.find_panel(text);
        match panel {
            Some(panel) => {
                debug!("Summary panel found ({} chars)", panel.len());
                state.apply(&self.panel_rules, panel, SearchScope::Panel);
            }
            None => {
                debug!("No summary panel; searching the whole document");
                state.apply(&self.panel_rules, text, SearchScope::Document);
            }
        }

        let missing = AgreementField::ALL
            .into_iter()
            .filter(|f| !state.fields.is_present(*f))
            .count();
        if missing > 0 {
            debug!("{} fields absent after panel search", missing);
            state.apply(&self.document_rules, text, SearchScope::Document);
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        let found = state.sources.len();
        info!(
            "Agreement extraction found {}/{} fields in {}ms",
            found,
            AgreementField::ALL.len(),
            processing_time_ms
        );

        AgreementExtraction {
            fields: state.fields,
            sources: state.sources,
            panel_found: panel.is_some(),
            warnings: state.warnings,
            text_strategy: None,
            processing_time_ms,
        }
    }

    /// Extract fields from document bytes. Fails with
    /// [`DocumentError::Unreadable`](crate::error::DocumentError::Unreadable)
    /// when no text can be recovered.
    pub fn extract_document(&self, data: &[u8], filename: &str) -> Result<AgreementExtraction> {
        let extracted = self.reader.read(data, DocumentKind::from_filename(filename))?;
        let mut extraction = self.extract(&extracted.text);
        extraction.text_strategy = Some(extracted.strategy);
        Ok(extraction)
    }
}

/// Fields found so far, with provenance.
#[derive(Debug, Default)]
struct ExtractionState {
    fields: ExtractedAgreementFields,
    sources: BTreeMap<AgreementField, SearchScope>,
    warnings: Vec<String>,
}

impl ExtractionState {
    fn apply(&mut self, rules: &[FieldRule], text: &str, scope: SearchScope) {
        for rule in rules {
            if self.fields.is_present(rule.field) {
                continue;
            }
            let Some(found) = rule.extractor.extract(text) else {
                continue;
            };

            match store(&mut self.fields, rule.field, &found.value) {
                Ok(()) => {
                    debug!("{} = {:?} ({:?})", rule.field.key(), found.value, scope);
                    self.sources.insert(rule.field, scope);
                }
                Err(reason) => {
                    let warning = format!("{}: {}", rule.field.key(), reason);
                    if !self.warnings.contains(&warning) {
                        warn!("{}", warning);
                        self.warnings.push(warning);
                    }
                }
            }
        }
    }
}

/// Canonicalize a raw match into its field.
fn store(
    fields: &mut ExtractedAgreementFields,
    field: AgreementField,
    raw: &str,
) -> std::result::Result<(), String> {
    let unparsed = || format!("could not interpret {:?}", raw);

    match field {
        AgreementField::BusinessName => fields.business_name = Some(raw.to_string()),
        AgreementField::Partner => fields.partner = Some(raw.to_string()),
        AgreementField::Product => fields.product = Some(raw.to_string()),
        AgreementField::EffectiveDate => {
            let date = parse_date(raw).ok_or_else(unparsed)?;
            fields.effective_date = Some(CanonicalDate(date));
        }
        AgreementField::AdvanceAmount | AgreementField::Fee | AgreementField::TotalAdvancePlusFee => {
            let Canonical::Parsed(money) = parse_money(raw) else {
                return Err(unparsed());
            };
            match field {
                AgreementField::AdvanceAmount => fields.advance_amount = Some(money),
                AgreementField::Fee => fields.fee = Some(money),
                _ => fields.total_advance_plus_fee = Some(money),
            }
        }
        AgreementField::RrPercent => {
            let rate = parse_percent(raw).into_parsed().ok_or_else(unparsed)?;
            fields.rr_percent = Some(rate);
        }
    }
    Ok(())
}

/// Extract agreement fields with the default configuration.
pub fn extract_agreement_fields(text: &str) -> Result<ExtractedAgreementFields> {
    Ok(AgreementExtractor::new(&ExtractionConfig::default())?.extract(text).fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use pretty_assertions::assert_eq;

    const SCENARIO_A: &str = "Merchant ACME Corp\n\
                              Effective Date: Jan 5, 2024\n\
                              Advance Amount ... $10,000.00\n\
                              Fee ... $500.00\n\
                              Revenue Share Rate 14%";

    fn extractor() -> AgreementExtractor {
        AgreementExtractor::new(&ExtractionConfig::default()).unwrap()
    }

    fn display(extraction: &AgreementExtraction, field: AgreementField) -> Option<String> {
        extraction.fields.display(field)
    }

    #[test]
    fn test_plain_agreement_text() {
        let extraction = extractor().extract(SCENARIO_A);

        assert_eq!(display(&extraction, AgreementField::BusinessName), Some("ACME Corp".into()));
        assert_eq!(display(&extraction, AgreementField::EffectiveDate), Some("Jan 05, 2024".into()));
        assert_eq!(display(&extraction, AgreementField::AdvanceAmount), Some("$10,000.00".into()));
        assert_eq!(display(&extraction, AgreementField::Fee), Some("$500.00".into()));
        assert_eq!(display(&extraction, AgreementField::RrPercent), Some("14%".into()));
        assert_eq!(display(&extraction, AgreementField::TotalAdvancePlusFee), None);
        assert!(!extraction.panel_found);
        assert_eq!(extraction.sources.get(&AgreementField::Fee), Some(&SearchScope::Document));
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn test_without_panel_payment_total_wins_over_broad_labels() {
        let extraction =
            extractor().extract("Total Advance Amount $10,000.00\nTotal Payment Amount $11,500.00\n");

        assert!(!extraction.panel_found);
        assert_eq!(
            display(&extraction, AgreementField::TotalAdvancePlusFee),
            Some("$11,500.00".into())
        );
        assert_eq!(display(&extraction, AgreementField::AdvanceAmount), Some("$10,000.00".into()));
        assert_eq!(
            extraction.sources.get(&AgreementField::TotalAdvancePlusFee),
            Some(&SearchScope::Document)
        );
    }

    #[test]
    fn test_without_panel_narrow_rate_window_goes_first() {
        // 70 characters separate the first label from its value: past the
        // 60-character window, inside the 80-character one.
        let text = format!(
            "Payment Rate {}12%\nRemittance Rate 9%\nTotal Purchase Amount: $9,000",
            "x".repeat(70)
        );
        let extraction = extractor().extract(&text);

        assert_eq!(display(&extraction, AgreementField::RrPercent), Some("9%".into()));
        assert_eq!(
            display(&extraction, AgreementField::TotalAdvancePlusFee),
            Some("$9,000.00".into())
        );
    }

    #[test]
    fn test_summary_panel_takes_precedence() {
        let text = "Pipe Agreement\n\
                    Summary\n\
                    Merchant Panel Co\n\
                    Advance Amount\nThe amount advanced to you\n$25,000.00\n\
                    Fee\n$2,500.00\n\
                    Total Payment Amount\n$27,500.00\n\
                    Payment Rate\n12.5%\n\
                    Partner\nShopify Inc.\n\
                    Payment Method\n\
                    Merchant Body Co\n\
                    Advance Amount $1.00\n";
        let extraction = extractor().extract(text);

        assert!(extraction.panel_found);
        assert_eq!(extraction.fields.business_name.as_deref(), Some("Panel Co"));
        assert_eq!(display(&extraction, AgreementField::AdvanceAmount), Some("$25,000.00".into()));
        assert_eq!(display(&extraction, AgreementField::Fee), Some("$2,500.00".into()));
        assert_eq!(
            display(&extraction, AgreementField::TotalAdvancePlusFee),
            Some("$27,500.00".into())
        );
        assert_eq!(display(&extraction, AgreementField::RrPercent), Some("12.5%".into()));
        assert_eq!(extraction.fields.partner.as_deref(), Some("Shopify Inc."));
        assert_eq!(
            extraction.sources.get(&AgreementField::BusinessName),
            Some(&SearchScope::Panel)
        );
    }

    #[test]
    fn test_whole_document_fallback_for_missing_fields() {
        let text = "Pipe Agreement\n\
                    Summary\n\
                    Merchant Panel Co\n\
                    1 pipe.com\n\
                    Effective Date: 03/15/2024\n\
                    Total Purchase Amount: $9,000\n\
                    Withholding Rate is set at 9%";
        let extraction = extractor().extract(text);

        assert!(extraction.panel_found);
        assert_eq!(
            extraction.sources.get(&AgreementField::BusinessName),
            Some(&SearchScope::Panel)
        );
        assert_eq!(display(&extraction, AgreementField::EffectiveDate), Some("Mar 15, 2024".into()));
        assert_eq!(
            display(&extraction, AgreementField::TotalAdvancePlusFee),
            Some("$9,000.00".into())
        );
        assert_eq!(display(&extraction, AgreementField::RrPercent), Some("9%".into()));
        assert_eq!(
            extraction.sources.get(&AgreementField::EffectiveDate),
            Some(&SearchScope::Document)
        );
    }

    #[test]
    fn test_business_name_alternative_label() {
        let fields = extract_agreement_fields("Business Name: Widgets LLC\nFee $10").unwrap();
        assert_eq!(fields.business_name.as_deref(), Some("Widgets LLC"));
    }

    #[test]
    fn test_agreement_date_and_product() {
        let fields =
            extract_agreement_fields("Agreement Date: 2024-07-01\nProduct: Pipe Merchant Cash Advance\n")
                .unwrap();
        assert_eq!(fields.effective_date.map(|d| d.to_string()), Some("Jul 01, 2024".into()));
        assert_eq!(fields.product.as_deref(), Some("Pipe Merchant Cash Advance"));
    }

    #[test]
    fn test_unparseable_date_is_warning_not_value() {
        let extraction = extractor().extract("Agreement Date: upon signature\n");

        assert_eq!(extraction.fields.effective_date, None);
        assert_eq!(extraction.warnings.len(), 1);
        assert!(extraction.warnings[0].starts_with("effective_date"));
    }

    #[test]
    fn test_nothing_found_is_not_an_error() {
        let extraction = extractor().extract("Lorem ipsum dolor sit amet.");
        assert_eq!(extraction.fields, ExtractedAgreementFields::default());
        assert_eq!(extraction.missing_required().len(), 6);
    }

    #[test]
    fn test_custom_footer_domain() {
        let config = ExtractionConfig {
            footer_domain: "example.com".to_string(),
            ..Default::default()
        };
        let extractor = AgreementExtractor::new(&config).unwrap();
        let text = "Pipe Agreement\nSummary\nFee $5.00\n2 example.com\nMerchant Outside Co";

        assert_eq!(extractor.find_panel(text), Some("\nFee $5.00"));
    }

    #[test]
    fn test_document_extraction_from_docx() {
        let body: String = SCENARIO_A
            .lines()
            .map(|line| format!("<w:p><w:r><w:t>{line}</w:t></w:r></w:p>"))
            .collect();
        let data = crate::document::fixtures::build_docx(&body);

        let extraction = extractor()
            .extract_document(&data, "agreement.docx")
            .unwrap();
        assert_eq!(extraction.text_strategy, Some("docx"));
        assert_eq!(extraction.fields.business_name.as_deref(), Some("ACME Corp"));
    }

    #[test]
    fn test_unreadable_document_is_an_error() {
        let err = extractor()
            .extract_document(b"\x89PNG not text", "scan.pdf")
            .unwrap_err();

        assert!(matches!(err, DemandError::Document(DocumentError::Unreadable)));
        assert_eq!(err.exit_code(), 22);
    }
}
