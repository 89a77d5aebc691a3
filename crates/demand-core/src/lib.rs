//! Core library for merchant cash advance demand letters.
//!
//! This crate provides:
//! - Canonical date, money and percentage handling
//! - Document text extraction (DOCX structure, PDF text layer, PDF layout pass)
//! - Agreement field extraction (summary panel first, whole document second)
//! - CSV statement aggregation into revenue, collections and shortfall
//! - Demand letter field resolution and plain-text rendering

pub mod document;
pub mod error;
pub mod extract;
pub mod letter;
pub mod models;
pub mod statement;

pub use document::{extract_text, DocumentKind, DocumentReader, ExtractedText};
pub use error::{DemandError, DocumentError, Result, StatementError};
pub use extract::{extract_agreement_fields, AgreementExtraction, AgreementExtractor};
pub use letter::DemandLetterBuilder;
pub use models::agreement::{AgreementField, ExtractedAgreementFields};
pub use models::canonical::{Canonical, CanonicalDate, Money, Percent};
pub use models::config::{DemandConfig, ExtractionConfig, LetterConfig, StatementConfig};
pub use models::letter::{DemandLetter, DemandLetterInput, LetterField};
pub use models::statement::{ColumnRole, StatementAggregate, StatementReport};
pub use statement::{aggregate_statement, StatementAggregator, StatementOptions};
