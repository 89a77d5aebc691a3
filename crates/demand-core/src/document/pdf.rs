//! PDF text extraction using lopdf and pdf-extract.

use std::panic;

use lopdf::Document;
use tracing::{debug, trace};

use super::{Result, TextStrategy};
use crate::error::DocumentError;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page's text layer (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract text with the layout-aware pass.
    fn extract_layout_text(&self) -> Result<String>;

    /// Text layer of every page, joined by newlines.
    fn extract_text_layer(&self) -> Result<String> {
        let mut pages = Vec::new();
        for page in 1..=self.page_count() {
            pages.push(self.extract_page_text(page)?);
        }
        Ok(pages.join("\n"))
    }
}

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Create an extractor with a document already loaded.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| DocumentError::Parse("No document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| DocumentError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(DocumentError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        let text = doc
            .extract_text(&[page])
            .map_err(|e| DocumentError::TextExtraction(format!("page {}: {}", page, e)))?;
        trace!("Page {} text layer: {} chars", page, text.len());
        Ok(text)
    }

    fn extract_layout_text(&self) -> Result<String> {
        if self.raw_data.is_empty() {
            return Err(DocumentError::Parse("No document loaded".to_string()));
        }

        // pdf-extract panics on some malformed font programs
        let data = self.raw_data.as_slice();
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(DocumentError::TextExtraction(e.to_string())),
            Err(_) => Err(DocumentError::TextExtraction(
                "layout extraction panicked".to_string(),
            )),
        }
    }
}

/// Direct text layer of each page, via lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextLayer;

impl TextStrategy for PdfTextLayer {
    fn name(&self) -> &'static str {
        "pdf_text_layer"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        PdfExtractor::from_bytes(data)?.extract_text_layer()
    }
}

/// Layout-aware pass via pdf-extract, tolerant of complex page geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLayoutText;

impl TextStrategy for PdfLayoutText {
    fn name(&self) -> &'static str {
        "pdf_layout"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        PdfExtractor::from_bytes(data)?.extract_layout_text()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// One page per entry, each line drawn with its own `Tj`.
    pub(crate) fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
            ];
            for line in lines.iter() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_layout_text().is_err());
    }

    #[test]
    fn test_load_counts_pages() {
        let data = build_pdf(&[&["Page one"], &["Page two"]]);
        let extractor = PdfExtractor::from_bytes(&data).unwrap();
        assert_eq!(extractor.page_count(), 2);
    }

    #[test]
    fn test_text_layer_reads_pages_in_order() {
        let data = build_pdf(&[&["Merchant ACME Corp"], &["Fee $500.00"]]);
        let text = PdfTextLayer.extract(&data).unwrap();

        let merchant = text.find("ACME").unwrap();
        let fee = text.find("500").unwrap();
        assert!(merchant < fee);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = PdfTextLayer.extract(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }
}
