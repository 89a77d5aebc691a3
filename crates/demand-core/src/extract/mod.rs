//! Agreement field extraction module.

mod agreement;
pub mod rules;

pub use agreement::{extract_agreement_fields, AgreementExtraction, AgreementExtractor};
pub use rules::{normalize_percent, parse_date, parse_money, SearchScope};
