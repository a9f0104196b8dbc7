//! Conversion results and per-conversion statistics.

use crate::config::Conversion;
use serde::{Deserialize, Serialize};

/// The in-memory result of one conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// Serialised target document.
    pub bytes: Vec<u8>,
    pub stats: ConversionStats,
}

/// Timing and size figures for one conversion.
///
/// Logged by the server for every request and printed by `docconv convert --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub conversion: Conversion,
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// Characters returned by the extraction backend.
    pub extracted_chars: usize,
    /// Paragraphs written to the DOCX. `None` for DOCX→PDF.
    pub paragraphs: Option<usize>,
    pub extract_duration_ms: u64,
    pub assemble_duration_ms: u64,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_with_kebab_case_conversion() {
        let stats = ConversionStats {
            conversion: Conversion::PdfToDocx,
            input_bytes: 10,
            output_bytes: 20,
            extracted_chars: 5,
            paragraphs: Some(2),
            extract_duration_ms: 1,
            assemble_duration_ms: 1,
            total_duration_ms: 2,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"conversion\":\"pdf-to-docx\""), "got: {json}");
        assert!(json.contains("\"paragraphs\":2"));
    }
}
