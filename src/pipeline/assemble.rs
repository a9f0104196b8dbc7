//! Document assembly: build a word-processor document from a paragraph list.
//!
//! [`DocumentAssembler`] takes the ordered paragraph sequence and returns the
//! serialised document bytes. [`DocxAssembler`] emits one default-styled
//! paragraph per entry (no heading detection, no font or size carried over)
//! using `docx-rs`.

use crate::error::BackendError;
use docx_rs::{Docx, Paragraph, Run};
use std::io::Cursor;
use tracing::debug;

/// Build a document from ordered paragraphs.
pub trait DocumentAssembler: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Serialise `paragraphs` into the target format, preserving order.
    fn assemble(&self, paragraphs: &[String]) -> Result<Vec<u8>, BackendError>;
}

/// DOCX assembly backed by `docx-rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxAssembler;

impl DocumentAssembler for DocxAssembler {
    fn name(&self) -> &'static str {
        "docx-rs"
    }

    fn assemble(&self, paragraphs: &[String]) -> Result<Vec<u8>, BackendError> {
        let docx = paragraphs.iter().fold(Docx::new(), |doc, text| {
            doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(text.as_str())))
        });

        let mut buf = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buf)
            .map_err(|e| BackendError::new(self.name(), e.to_string()))?;

        let bytes = buf.into_inner();
        debug!(
            "Assembled DOCX: {} paragraphs, {} bytes",
            paragraphs.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}
