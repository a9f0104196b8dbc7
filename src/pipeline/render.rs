//! PDF rendering: lay plain text out onto PDF pages.
//!
//! [`PdfWriter`] is the capability the DOCX→PDF converter depends on.
//! [`PrintPdfWriter`] draws left-aligned body text with a builtin Helvetica
//! face through `printpdf`, wrapping at word boundaries and starting a new
//! page whenever the cursor passes the bottom margin.
//!
//! `printpdf` documents are `!Send`; the whole render happens inside one
//! call so the writer itself stays `Send + Sync` and can run on the
//! blocking pool.

use crate::error::BackendError;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::io::BufWriter;
use tracing::debug;

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Render plain text into a PDF document.
pub trait PdfWriter: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Lay `text` out and return the finished PDF bytes.
    ///
    /// Empty text still yields a valid single-page document.
    fn write_text(&self, text: &str) -> Result<Vec<u8>, BackendError>;
}

/// Page geometry and typography for [`PrintPdfWriter`], in PostScript points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub font_size_pt: f32,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub line_spacing: f32,
}

impl Default for PageLayout {
    /// US Letter, one-inch margins, 12 pt text.
    fn default() -> Self {
        Self {
            page_width_pt: 612.0,
            page_height_pt: 792.0,
            margin_pt: 72.0,
            font_size_pt: 12.0,
            line_spacing: 1.2,
        }
    }
}

impl PageLayout {
    fn line_height_pt(&self) -> f32 {
        self.font_size_pt * self.line_spacing
    }

    /// Approximate characters per line for Helvetica at this size.
    ///
    /// Uses an average advance of half an em.
    pub fn columns(&self) -> usize {
        let usable = (self.page_width_pt - 2.0 * self.margin_pt).max(self.font_size_pt);
        ((usable / (self.font_size_pt * 0.5) + 1e-3) as usize).max(1)
    }

    /// Number of text lines that fit between the margins.
    pub fn lines_per_page(&self) -> usize {
        let usable = (self.page_height_pt - 2.0 * self.margin_pt).max(self.line_height_pt());
        ((usable / self.line_height_pt() + 1e-3) as usize).max(1)
    }
}

/// PDF writer backed by `printpdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintPdfWriter {
    layout: PageLayout,
}

impl PrintPdfWriter {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }
}

impl PdfWriter for PrintPdfWriter {
    fn name(&self) -> &'static str {
        "printpdf"
    }

    fn write_text(&self, text: &str) -> Result<Vec<u8>, BackendError> {
        let layout = self.layout;
        let lines = layout_lines(text, layout.columns());
        let pages = paginate(&lines, layout.lines_per_page());

        let width = Mm(layout.page_width_pt / PT_PER_MM);
        let height = Mm(layout.page_height_pt / PT_PER_MM);
        let (doc, first_page, first_layer) =
            PdfDocument::new("Converted document", width, height, "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| BackendError::new(self.name(), format!("font error: {e}")))?;

        for (i, page_lines) in pages.iter().enumerate() {
            let layer = if i == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(width, height, "Layer 1");
                doc.get_page(page).get_layer(layer)
            };
            draw_lines(&layer, &font, &layout, page_lines);
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| BackendError::new(self.name(), format!("save error: {e}")))?;
        let bytes = buf
            .into_inner()
            .map_err(|e| BackendError::new(self.name(), format!("buffer error: {e}")))?;

        debug!(
            "Rendered PDF: {} lines on {} pages, {} bytes",
            lines.len(),
            pages.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Draw one page worth of lines, top to bottom.
fn draw_lines(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    layout: &PageLayout,
    lines: &[String],
) {
    let x = Mm(layout.margin_pt / PT_PER_MM);
    let mut baseline = layout.page_height_pt - layout.margin_pt - layout.font_size_pt;
    for line in lines {
        if !line.is_empty() {
            let y = Mm(baseline / PT_PER_MM);
            layer.use_text(line.as_str(), layout.font_size_pt, x, y, font);
        }
        baseline -= layout.line_height_pt();
    }
}

/// Break text into display lines no wider than `columns` characters.
///
/// Source line breaks are kept; a blank source line stays a blank display
/// line. Tabs expand to four spaces.
pub fn layout_lines(text: &str, columns: usize) -> Vec<String> {
    let mut out = Vec::new();
    for source_line in text.split('\n') {
        let source_line = source_line.trim_end_matches('\r').replace('\t', "    ");
        out.extend(wrap_text(&source_line, columns));
    }
    out
}

/// Greedy word wrap. Words longer than `max_chars` are hard-split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if current_len + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Group display lines into pages. Always returns at least one page.
fn paginate(lines: &[String], per_page: usize) -> Vec<Vec<String>> {
    let mut pages: Vec<Vec<String>> = lines
        .chunks(per_page.max(1))
        .map(|chunk| chunk.to_vec())
        .collect();
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_capacity() {
        let layout = PageLayout::default();
        // 468pt usable width at 6pt per char, 648pt usable height at 14.4pt per line
        assert_eq!(layout.columns(), 78);
        assert_eq!(layout.lines_per_page(), 45);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog";
        let lines = wrap_text(text, 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10), "{lines:?}");
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_hard_splits_long_words() {
        let lines = wrap_text("abcdefghij xy", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_wrap_counts_chars_not_bytes() {
        let lines = wrap_text("ééé ééé", 7);
        assert_eq!(lines, vec!["ééé ééé"]);
    }

    #[test]
    fn test_layout_keeps_blank_lines() {
        let lines = layout_lines("one\n\ntwo\r\n", 80);
        assert_eq!(lines, vec!["one", "", "two", ""]);
    }

    #[test]
    fn test_paginate_always_one_page() {
        assert_eq!(paginate(&[], 10).len(), 1);
        let lines: Vec<String> = (0..25).map(|i| i.to_string()).collect();
        let pages = paginate(&lines, 10);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].len(), 5);
    }

    #[test]
    fn test_empty_text_renders_valid_pdf() {
        let bytes = PrintPdfWriter::default().write_text("").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 100);
    }

    #[test]
    fn test_long_text_spans_pages() {
        let text: String = (0..200).map(|i| format!("line {i}\n")).collect();
        let writer = PrintPdfWriter::default();
        let bytes = writer.write_text(&text).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let lines = layout_lines(&text, writer.layout().columns());
        assert!(paginate(&lines, writer.layout().lines_per_page()).len() >= 5);
    }
}
