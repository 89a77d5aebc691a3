//! DOCX paragraph text via zip + quick-xml.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::trace;
use zip::ZipArchive;

use super::{Result, TextStrategy};
use crate::error::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the main document part of a Word archive.
///
/// Every `w:p` is one line of output, in document order, including paragraphs
/// inside table cells. `w:tab` becomes a tab and `w:br` a line break.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    /// Paragraph texts in document order.
    pub fn paragraphs(&self, data: &[u8]) -> Result<Vec<String>> {
        let mut archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| DocumentError::Docx(e.to_string()))?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| DocumentError::Docx(format!("{}: {}", DOCUMENT_PART, e)))?
            .read_to_string(&mut xml)
            .map_err(|e| DocumentError::Docx(e.to_string()))?;

        parse_paragraphs(&xml)
    }
}

impl TextStrategy for DocxExtractor {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn extract(&self, data: &[u8]) -> Result<String> {
        Ok(self.paragraphs(data)?.join("\n"))
    }
}

fn parse_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => current = Some(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => push(&mut current, "\t"),
                b"w:br" | b"w:cr" => push(&mut current, "\n"),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| DocumentError::Docx(e.to_string()))?;
                push(&mut current, &text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::Docx(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    trace!("DOCX: {} paragraphs", paragraphs.len());
    Ok(paragraphs)
}

fn push(current: &mut Option<String>, text: &str) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(text);
    }
}
