//! Rule-based extractors and canonicalization primitives.

pub mod dates;
pub mod labels;
pub mod money;
pub mod patterns;
pub mod percent;

pub use dates::{format_date, normalize_date, parse_date, parse_date_with_formats, ACCEPTED_FORMATS};
pub use labels::LabelExtractor;
pub use money::{format_usd, parse_amount, parse_money};
pub use percent::{normalize_percent, parse_percent};

use serde::Serialize;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Which part of a document a match came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// The summary panel near the top of the agreement.
    Panel,
    /// The whole document text.
    Document,
}

/// A value found in text, with where it was found.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
