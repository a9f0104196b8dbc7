//! Configuration types for the conversion service.
//!
//! Every server knob lives in [`ServerConfig`], built via its
//! [`ServerConfigBuilder`]. The config is handed to the router at
//! construction time; nothing in the crate reads ambient global state.
//!
//! The format enums ([`DocumentFormat`], [`Conversion`]) live here too because
//! both the HTTP layer and the CLI select behaviour through them.

use crate::error::DocConvError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the HTTP conversion service.
///
/// Built via [`ServerConfig::builder()`] or using [`ServerConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_docconv::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .listen_addr("127.0.0.1:8080".parse().unwrap())
///     .uploads_dir("/var/tmp/docconv/uploads")
///     .converted_dir("/var/tmp/docconv/converted")
///     .request_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.request_timeout_secs, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the server binds to. Default: `0.0.0.0:3000`.
    pub listen_addr: SocketAddr,

    /// Directory receiving raw uploads, one file per request. Default: `uploads`.
    pub uploads_dir: PathBuf,

    /// Directory receiving converted artifacts. Default: `converted`.
    pub converted_dir: PathBuf,

    /// Directory of static frontend assets served for `GET /*`. Default: `public`.
    pub static_dir: PathBuf,

    /// Maximum accepted request body in bytes. Default: 50 MiB.
    ///
    /// Larger uploads are rejected with `413 Payload Too Large` while the
    /// multipart body is still being read.
    pub max_upload_bytes: usize,

    /// Upper bound on one conversion (read, extract, assemble, write). Default: 120.
    pub request_timeout_secs: u64,

    /// Keep uploads and artifacts on disk after the response. Default: false.
    ///
    /// When false, every file a request creates is removed on all exit paths,
    /// including timeouts and client disconnects during the download.
    pub retain_files: bool,

    /// Require a `.docx` extension on the DOCX→PDF endpoint too. Default: false.
    ///
    /// By default only the PDF→DOCX endpoint checks the extension; a
    /// non-DOCX upload to the other endpoint fails later inside the reader.
    pub strict_intake: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            uploads_dir: PathBuf::from("uploads"),
            converted_dir: PathBuf::from("converted"),
            static_dir: PathBuf::from("public"),
            max_upload_bytes: 50 * 1024 * 1024,
            request_timeout_secs: 120,
            retain_files: false,
            strict_intake: false,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Per-request conversion budget as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.config.listen_addr = addr;
        self
    }

    pub fn uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.uploads_dir = dir.into();
        self
    }

    pub fn converted_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.converted_dir = dir.into();
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.static_dir = dir.into();
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n.max(1024);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn retain_files(mut self, v: bool) -> Self {
        self.config.retain_files = v;
        self
    }

    pub fn strict_intake(mut self, v: bool) -> Self {
        self.config.strict_intake = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, DocConvError> {
        let c = &self.config;
        if c.request_timeout_secs == 0 {
            return Err(DocConvError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.uploads_dir.as_os_str().is_empty() || c.converted_dir.as_os_str().is_empty() {
            return Err(DocConvError::InvalidConfig(
                "Upload and converted directories must be set".into(),
            ));
        }
        if c.uploads_dir == c.converted_dir {
            return Err(DocConvError::InvalidConfig(format!(
                "Upload and converted directories must differ, both are '{}'",
                c.uploads_dir.display()
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The two binary formats the service converts between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    /// MIME type sent with the download.
    pub fn content_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Detect the format from a filename extension, case-insensitively.
    ///
    /// Only the final extension counts: `report.pdf.docx` is DOCX.
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(DocumentFormat::Pdf)
        } else if ext.eq_ignore_ascii_case("docx") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => f.write_str("PDF"),
            DocumentFormat::Docx => f.write_str("DOCX"),
        }
    }
}

/// A conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Conversion {
    /// PDF in, word-processor document out.
    PdfToDocx,
    /// Word-processor document in, PDF out.
    DocxToPdf,
}

impl Conversion {
    pub fn source(self) -> DocumentFormat {
        match self {
            Conversion::PdfToDocx => DocumentFormat::Pdf,
            Conversion::DocxToPdf => DocumentFormat::Docx,
        }
    }

    pub fn target(self) -> DocumentFormat {
        match self {
            Conversion::PdfToDocx => DocumentFormat::Docx,
            Conversion::DocxToPdf => DocumentFormat::Pdf,
        }
    }

    /// The conversion that produces `target`.
    pub fn to(target: DocumentFormat) -> Self {
        match target {
            DocumentFormat::Docx => Conversion::PdfToDocx,
            DocumentFormat::Pdf => Conversion::DocxToPdf,
        }
    }

    /// The conversion that consumes `source`.
    pub fn from_source(source: DocumentFormat) -> Self {
        match source {
            DocumentFormat::Pdf => Conversion::PdfToDocx,
            DocumentFormat::Docx => Conversion::DocxToPdf,
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.source(), self.target())
    }
}
