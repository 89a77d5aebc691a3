//! Error types for the demand-core library.

use thiserror::Error;

use crate::models::statement::ColumnRole;

/// Main error type for the demand library.
#[derive(Error, Debug)]
pub enum DemandError {
    /// Document text extraction error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Statement (CSV ledger) error.
    #[error("statement error: {0}")]
    Statement(#[from] StatementError),

    /// JSON input or output error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading text out of uploaded documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// A text extraction pass failed.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The DOCX archive or its document part could not be read.
    #[error("failed to read DOCX: {0}")]
    Docx(String),

    /// Every extraction strategy came back empty.
    #[error("unable to read text (scanned PDF?)")]
    Unreadable,
}

/// Errors that stop a statement from being aggregated at all.
#[derive(Error, Debug)]
pub enum StatementError {
    /// The CSV has no header row.
    #[error("CSV missing header row")]
    MissingHeader,

    /// No header matched the aliases of a required column.
    #[error("CSV must include a '{}' column", .0.label())]
    MissingColumn(ColumnRole),

    /// The CSV reader failed before any row could be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DemandError {
    /// Process exit code for the error. Unreadable documents and malformed
    /// statements are caller input problems and get their own codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            DemandError::Document(DocumentError::Unreadable) => 22,
            DemandError::Statement(_) => 2,
            _ => 1,
        }
    }
}

/// Result type for the demand library.
pub type Result<T> = std::result::Result<T, DemandError>;
