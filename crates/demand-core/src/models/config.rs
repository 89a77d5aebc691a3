//! Configuration structures for extraction, aggregation and letters.

use serde::{Deserialize, Serialize};

/// Main configuration for the demand pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandConfig {
    /// Agreement extraction configuration.
    pub extraction: ExtractionConfig,

    /// Statement aggregation configuration.
    pub statement: StatementConfig,

    /// Demand letter configuration.
    pub letter: LetterConfig,
}

/// Agreement extraction configuration.
///
/// Windows are the number of characters allowed between a label and its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Advance amount and fee window inside the summary panel.
    pub panel_money_window: usize,

    /// Total payment amount window inside the summary panel.
    pub panel_total_window: usize,

    /// Advance amount and fee window over the whole document.
    pub document_money_window: usize,

    /// Total amount window over the whole document.
    pub document_total_window: usize,

    /// Revenue-share rate window inside the summary panel.
    pub panel_rate_window: usize,

    /// Revenue-share rate window over the whole document.
    pub document_rate_window: usize,

    /// Domain printed in page footers (`1 pipe.com`); closes the summary panel.
    pub footer_domain: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            panel_money_window: 160,
            panel_total_window: 200,
            document_money_window: 200,
            document_total_window: 240,
            panel_rate_window: 60,
            document_rate_window: 80,
            footer_domain: "pipe.com".to_string(),
        }
    }
}

/// Statement aggregation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    /// Status values (letters only, any case) that count as a successful collection.
    pub success_statuses: Vec<String>,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            success_statuses: [
                "succeeded",
                "paid",
                "completed",
                "posted",
                "captured",
                "success",
                "settled",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Demand letter wording and placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterConfig {
    /// Legal name of the funder.
    pub company_name: String,

    /// Short name used in the body ("payable to Pipe").
    pub company_short_name: String,

    /// Product named in the subject line.
    pub product: String,

    /// Country line under the business address.
    pub country: String,

    /// Contact paragraph closing the letter.
    pub contact_line: String,

    /// Team named in the signature.
    pub signature_team: String,

    /// Business days given to pay.
    pub cure_days: u32,

    /// Placeholder when no business name is known.
    pub default_business_name: String,

    /// Placeholder when no business address is known.
    pub default_business_address: String,

    /// Salutation name when no contact is known.
    pub default_contact_name: String,
}

impl Default for LetterConfig {
    fn default() -> Self {
        Self {
            company_name: "Pipe Advance LLC".to_string(),
            company_short_name: "Pipe".to_string(),
            product: "Pipe Merchant Cash Advance".to_string(),
            country: "United States of America".to_string(),
            contact_line: "Please contact our Servicing and Collections Manager, William, at \
                           william@pipe.com immediately within the next 3 business days."
                .to_string(),
            signature_team: "Servicing and Collections".to_string(),
            cure_days: 3,
            default_business_name: "BUSINESS NAME".to_string(),
            default_business_address: "Business address".to_string(),
            default_contact_name: "Client".to_string(),
        }
    }
}

impl DemandConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DemandConfig =
            serde_json::from_str(r#"{"extraction": {"footer_domain": "example.com"}}"#).unwrap();

        assert_eq!(config.extraction.footer_domain, "example.com");
        assert_eq!(config.extraction.panel_money_window, 160);
        assert_eq!(config.statement.success_statuses.len(), 7);
        assert_eq!(config.letter.company_name, "Pipe Advance LLC");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DemandConfig::default();
        config.letter.cure_days = 5;
        config.save(&path).unwrap();

        let loaded = DemandConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
