//! Error types for the edgequake-docconv library.
//!
//! Two error types map onto the two layers of a conversion:
//!
//! * [`BackendError`] — the single error kind returned by a document
//!   capability ([`crate::pipeline::extract::TextExtractor`],
//!   [`crate::pipeline::assemble::DocumentAssembler`],
//!   [`crate::pipeline::render::PdfWriter`]). It carries the backend name
//!   and a human-readable detail, nothing else.
//!
//! * [`DocConvError`] — **Terminal**: the current conversion cannot finish.
//!   Every variant ends the request that raised it; there are no retries.
//!   The HTTP layer maps these to a generic 500 response and logs the detail.

use crate::config::DocumentFormat;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// All terminal errors returned by the edgequake-docconv library.
#[derive(Debug, Error)]
pub enum DocConvError {
    // ── Extraction errors ─────────────────────────────────────────────────
    /// The source document could not be parsed by the extraction backend.
    #[error("Failed to extract text from {format} input: {source}")]
    ExtractionFailed {
        format: DocumentFormat,
        #[source]
        source: BackendError,
    },

    /// Extraction succeeded but produced no visible text.
    #[error("Failed to extract text from PDF. The file may contain images or unsupported content.")]
    EmptyExtraction,

    /// Every extracted line was blank; nothing to assemble.
    #[error("No valid content extracted from PDF.")]
    NoContent,

    // ── Assembly errors ───────────────────────────────────────────────────
    /// The output document could not be built or serialised.
    #[error("Failed to assemble {format} output: {source}")]
    AssemblyFailed {
        format: DocumentFormat,
        #[source]
        source: BackendError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The stored upload could not be read back.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create, write or flush the converted artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A storage directory could not be created.
    #[error("Failed to prepare directory '{path}': {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server could not bind or lost its listener.
    #[error("Failed to listen on {addr}: {source}")]
    ListenFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    // ── Scheduling errors ─────────────────────────────────────────────────
    /// The conversion did not finish within the configured budget.
    #[error("Conversion timed out after {}ms", .elapsed.as_millis())]
    Timeout { elapsed: Duration },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocConvError {
    /// Stable machine-readable code for this failure.
    ///
    /// Exposed to HTTP clients in the `x-error-code` header; the message
    /// itself stays server-side.
    pub fn code(&self) -> &'static str {
        match self {
            DocConvError::ExtractionFailed { .. } | DocConvError::InputReadFailed { .. } => {
                "EXTRACTION_FAILED"
            }
            DocConvError::EmptyExtraction => "EXTRACTION_EMPTY",
            DocConvError::NoContent => "NO_CONTENT",
            DocConvError::AssemblyFailed { .. } | DocConvError::OutputWriteFailed { .. } => {
                "ASSEMBLY_FAILED"
            }
            DocConvError::Timeout { .. } => "CONVERSION_TIMEOUT",
            DocConvError::StorageUnavailable { .. }
            | DocConvError::ListenFailed { .. }
            | DocConvError::InvalidConfig(_)
            | DocConvError::Internal(_) => "INTERNAL",
        }
    }
}

/// Failure of a single document backend call.
#[derive(Debug, Clone, Error)]
#[error("{backend}: {detail}")]
pub struct BackendError {
    /// Short backend identifier, e.g. `"pdf-extract"`.
    pub backend: &'static str,
    pub detail: String,
}

impl BackendError {
    pub fn new(backend: &'static str, detail: impl Into<String>) -> Self {
        Self {
            backend,
            detail: detail.into(),
        }
    }
}
