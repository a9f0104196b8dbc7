//! Pipeline stages for document conversion.
//!
//! Each submodule implements exactly one transformation step behind a narrow
//! trait, so the converters in [`crate::convert`] never name a concrete
//! document library.
//!
//! ## Data Flow
//!
//! ```text
//! PDF → DOCX:   extract ──▶ paragraphs ──▶ assemble
//!               (pdf-extract)  (split)      (docx-rs)
//!
//! DOCX → PDF:   extract ──▶ render
//!               (docx-rs)   (printpdf)
//! ```
//!
//! 1. [`extract`]    — bytes → plain text ([`extract::TextExtractor`])
//! 2. [`paragraphs`] — text → ordered non-blank lines
//! 3. [`assemble`]   — paragraphs → DOCX bytes ([`assemble::DocumentAssembler`])
//! 4. [`render`]     — text → PDF bytes ([`render::PdfWriter`])
//!
//! All backends are synchronous; [`crate::convert`] runs them on tokio's
//! blocking pool.

pub mod assemble;
pub mod extract;
pub mod paragraphs;
pub mod render;
