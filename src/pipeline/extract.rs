//! Text extraction: pull plain text out of a structured document.
//!
//! [`TextExtractor`] is the narrow contract the converters depend on:
//! bytes in, text out, one error kind on malformed input. Two backends ship
//! with the crate:
//!
//! * [`PdfTextExtractor`]  — `pdf-extract`, content-stream text in reading order
//! * [`DocxTextExtractor`] — `docx-rs`, body paragraphs joined by blank lines
//!
//! Both are synchronous and CPU-bound; callers run them on the blocking pool.

use crate::error::BackendError;
use docx_rs::{DocumentChild, InsertChild, ParagraphChild, Run, RunChild};
use tracing::debug;

/// Extract plain text from a document held in memory.
pub trait TextExtractor: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Extract all textual content, discarding layout, styling and images.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError>;
}

/// PDF text extraction backed by the `pdf-extract` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError> {
        if !is_pdf(bytes) {
            let head: Vec<u8> = bytes.iter().copied().take(4).collect();
            return Err(BackendError::new(
                self.name(),
                format!("not a PDF (first bytes: {:?})", head),
            ));
        }
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| BackendError::new(self.name(), e.to_string()))?;
        debug!("pdf-extract produced {} chars", text.len());
        Ok(text)
    }
}

/// DOCX text extraction backed by the `docx-rs` reader.
///
/// Mirrors a "raw text" extraction: each body paragraph becomes one block,
/// blocks are separated by a blank line, tabs become `\t` and breaks become
/// `\n`. Tables, images and section properties are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxTextExtractor;

impl TextExtractor for DocxTextExtractor {
    fn name(&self) -> &'static str {
        "docx-rs"
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String, BackendError> {
        let docx =
            docx_rs::read_docx(bytes).map_err(|e| BackendError::new(self.name(), e.to_string()))?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some(paragraph_text(&p.children)),
                _ => None,
            })
            .collect();

        debug!("docx-rs read {} body paragraphs", paragraphs.len());
        Ok(paragraphs.join("\n\n"))
    }
}

/// Flatten the runs of one paragraph into text.
///
/// Hyperlink text and tracked insertions count as body text; deletions do not.
fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut out = String::new();
    push_children(children, &mut out);
    out
}

fn push_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Hyperlink(link) => push_children(&link.children, out),
            ParagraphChild::Insert(insert) => {
                for ic in &insert.children {
                    if let InsertChild::Run(run) = ic {
                        push_run(run, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &Run, out: &mut String) {
    for rc in &run.children {
        match rc {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// Check the `%PDF` magic bytes.
pub fn is_pdf(head: &[u8]) -> bool {
    head.starts_with(b"%PDF")
}
