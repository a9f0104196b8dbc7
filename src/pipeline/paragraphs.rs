//! Split extracted text into the ordered paragraph list fed to the DOCX assembler.

/// Split `text` on line breaks (`\n`, `\r\n`, `\r`) and drop blank lines.
///
/// A line is blank when it is empty after trimming whitespace. Surviving
/// lines keep their original text and order.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split(['\n', '\r'])
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Whole-string check performed before splitting.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
