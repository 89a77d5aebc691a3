//! Document text extraction with ordered fallbacks.

mod docx;
mod pdf;

pub use docx::DocxExtractor;
pub use pdf::{PdfExtractor, PdfLayoutText, PdfProcessor, PdfTextLayer};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::DocumentError;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Kind of uploaded document, as hinted by its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Word document; structural paragraph extraction is tried first.
    Docx,
    /// PDF.
    Pdf,
    /// No usable hint; treated as a PDF.
    Unknown,
}

impl DocumentKind {
    /// Kind from a filename's extension, case-insensitively.
    pub fn from_filename(name: &str) -> Self {
        Self::from_path(Path::new(name))
    }

    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("docx") => DocumentKind::Docx,
            Some("pdf") => DocumentKind::Pdf,
            _ => DocumentKind::Unknown,
        }
    }
}

/// One way of pulling text out of document bytes.
pub trait TextStrategy: Send + Sync {
    /// Short name, reported alongside the extracted text.
    fn name(&self) -> &'static str;

    /// Extract text. Empty output is not an error here.
    fn extract(&self, data: &[u8]) -> Result<String>;
}

/// Text pulled from a document and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub strategy: &'static str,
}

/// Runs the strategies for a document kind in order until one yields text.
///
/// DOCX structure (when hinted), then the PDF text layer, then the
/// layout-aware PDF pass. A failing strategy is logged and skipped.
#[derive(Clone, Default)]
pub struct DocumentReader {
    custom: Option<Vec<Arc<dyn TextStrategy>>>,
}

impl DocumentReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader that tries exactly these strategies, in order, whatever the kind.
    pub fn with_strategies(strategies: Vec<Box<dyn TextStrategy>>) -> Self {
        Self {
            custom: Some(strategies.into_iter().map(Arc::from).collect()),
        }
    }

    /// Strategies tried for a document kind, in order.
    pub fn strategies(&self, kind: DocumentKind) -> Vec<Arc<dyn TextStrategy>> {
        if let Some(custom) = &self.custom {
            return custom.clone();
        }

        let mut strategies: Vec<Arc<dyn TextStrategy>> = Vec::with_capacity(3);
        if kind == DocumentKind::Docx {
            strategies.push(Arc::new(DocxExtractor));
        }
        strategies.push(Arc::new(PdfTextLayer));
        strategies.push(Arc::new(PdfLayoutText));
        strategies
    }

    /// Extract text, or [`DocumentError::Unreadable`] when every strategy
    /// fails or yields only whitespace.
    pub fn read(&self, data: &[u8], kind: DocumentKind) -> Result<ExtractedText> {
        info!("Extracting text from {:?} document ({} bytes)", kind, data.len());

        for strategy in self.strategies(kind) {
            match strategy.extract(data) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("{}: {} chars", strategy.name(), text.len());
                    return Ok(ExtractedText {
                        text,
                        strategy: strategy.name(),
                    });
                }
                Ok(_) => debug!("{}: no text", strategy.name()),
                Err(e) => warn!("{} failed: {}", strategy.name(), e),
            }
        }

        Err(DocumentError::Unreadable)
    }
}

impl fmt::Debug for DocumentReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .custom
            .as_ref()
            .map(|strategies| strategies.iter().map(|s| s.name()).collect::<Vec<_>>());
        f.debug_struct("DocumentReader").field("custom", &names).finish()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub(crate) use super::docx::tests::{build_docx, paragraph};
    pub(crate) use super::pdf::tests::build_pdf;
}

/// Text of a document, or `None` when it has no recoverable text.
pub fn extract_text(data: &[u8], kind: DocumentKind) -> Option<String> {
    DocumentReader::new().read(data, kind).ok().map(|t| t.text)
}
