//! # edgequake-docconv
//!
//! Convert documents between PDF and DOCX, as an HTTP service, a CLI, or a
//! library.
//!
//! Conversion is text-only: the source's visible text is extracted, split
//! into paragraphs on line breaks, and laid out again in the target format.
//! Fonts, images, tables and page geometry are not carried over.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF ──▶ extract (pdf-extract) ──▶ split lines ──▶ assemble (docx-rs) ──▶ DOCX
//! DOCX ─▶ extract (docx-rs) ──────▶ wrap + paginate ─▶ render (printpdf) ─▶ PDF
//! ```
//!
//! Every backend call is CPU-bound and runs on tokio's blocking pool, so
//! concurrent requests never stall the accept loop.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_docconv::{Conversion, Converter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::default();
//!     let stats = converter
//!         .convert_to_file(Conversion::PdfToDocx, "report.pdf", "report.docx")
//!         .await?;
//!     eprintln!("{} paragraphs in {}ms", stats.paragraphs.unwrap_or(0), stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Serving
//!
//! ```rust,no_run
//! use edgequake_docconv::{serve, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder().request_timeout_secs(60).build()?;
//!     serve(AppState::new(config)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docconv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when embedding the router in another service:
//! ```toml
//! edgequake-docconv = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Conversion, DocumentFormat, ServerConfig, ServerConfigBuilder};
pub use convert::{Converter, ConverterBuilder};
pub use error::{BackendError, DocConvError};
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::paragraphs::split_paragraphs;
pub use server::{router, serve, AppState};
pub use storage::{Artifact, ScopedFile, StoragePaths, StoredUpload, UploadId};
