//! Conversion entry points.
//!
//! [`Converter`] sequences the pipeline stages for both directions and
//! enforces the invariants that sit between them:
//!
//! ```text
//! PDF → DOCX   read ─▶ extract ─▶ non-blank? ─▶ split ─▶ non-empty? ─▶ assemble ─▶ write
//! DOCX → PDF   read ─▶ extract ─────────────────────────────────────▶ render   ─▶ write
//! ```
//!
//! Steps within one conversion are strictly sequential. Every backend call
//! runs on tokio's blocking pool, so a slow document never stalls other
//! requests and a backend panic fails only the conversion that hit it.
//!
//! Backends are trait objects injected through [`ConverterBuilder`]; the
//! defaults are `pdf-extract`, `docx-rs` and `printpdf`.

use crate::config::{Conversion, DocumentFormat};
use crate::error::{BackendError, DocConvError};
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::assemble::{DocumentAssembler, DocxAssembler};
use crate::pipeline::extract::{DocxTextExtractor, PdfTextExtractor, TextExtractor};
use crate::pipeline::paragraphs;
use crate::pipeline::render::{PdfWriter, PrintPdfWriter};
use crate::storage::{Artifact, StoragePaths, StoredUpload};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Runs conversions with a fixed set of backends.
///
/// Cheap to clone; all backends are shared behind `Arc`.
#[derive(Clone)]
pub struct Converter {
    pdf_extractor: Arc<dyn TextExtractor>,
    docx_extractor: Arc<dyn TextExtractor>,
    assembler: Arc<dyn DocumentAssembler>,
    pdf_writer: Arc<dyn PdfWriter>,
    timeout: Option<Duration>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("pdf_extractor", &self.pdf_extractor.name())
            .field("docx_extractor", &self.docx_extractor.name())
            .field("assembler", &self.assembler.name())
            .field("pdf_writer", &self.pdf_writer.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`Converter`].
pub struct ConverterBuilder {
    pdf_extractor: Arc<dyn TextExtractor>,
    docx_extractor: Arc<dyn TextExtractor>,
    assembler: Arc<dyn DocumentAssembler>,
    pdf_writer: Arc<dyn PdfWriter>,
    timeout: Option<Duration>,
}

impl ConverterBuilder {
    pub fn pdf_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.pdf_extractor = extractor;
        self
    }

    pub fn docx_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.docx_extractor = extractor;
        self
    }

    pub fn assembler(mut self, assembler: Arc<dyn DocumentAssembler>) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn pdf_writer(mut self, writer: Arc<dyn PdfWriter>) -> Self {
        self.pdf_writer = writer;
        self
    }

    /// Upper bound for [`Converter::convert`] and [`Converter::convert_stored`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Converter {
        Converter {
            pdf_extractor: self.pdf_extractor,
            docx_extractor: self.docx_extractor,
            assembler: self.assembler,
            pdf_writer: self.pdf_writer,
            timeout: self.timeout,
        }
    }
}

impl Converter {
    /// Builder preloaded with the default backends and no timeout.
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder {
            pdf_extractor: Arc::new(PdfTextExtractor),
            docx_extractor: Arc::new(DocxTextExtractor),
            assembler: Arc::new(DocxAssembler),
            pdf_writer: Arc::new(PrintPdfWriter::default()),
            timeout: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Convert an in-memory document, bounded by the configured timeout.
    pub async fn convert(
        &self,
        conversion: Conversion,
        input: Vec<u8>,
    ) -> Result<ConversionOutput, DocConvError> {
        self.bounded(self.run(conversion, input)).await
    }

    /// Convert a stored upload and write the artifact under `storage`.
    ///
    /// The timeout covers reading the upload, the conversion itself and the
    /// artifact write. The artifact is fully written, flushed and synced
    /// before this returns. On any failure the partially written artifact
    /// is removed with its handle.
    pub async fn convert_stored(
        &self,
        conversion: Conversion,
        upload: &StoredUpload,
        storage: &StoragePaths,
    ) -> Result<(Artifact, ConversionStats), DocConvError> {
        self.bounded(async {
            let input = tokio::fs::read(upload.path())
                .await
                .map_err(|e| DocConvError::InputReadFailed {
                    path: upload.path().to_path_buf(),
                    source: e,
                })?;

            let output = self.run(conversion, input).await?;

            let target = conversion.target();
            let path = storage.artifact_path(&upload.id, target);
            let (file, out) = storage.scoped(path.clone()).create().await.map_err(|e| {
                DocConvError::OutputWriteFailed {
                    path: path.clone(),
                    source: e,
                }
            })?;
            fill_flushed(out, &path, &output.bytes).await?;
            debug!("Artifact written to {}", path.display());

            let artifact = Artifact::new(upload.id.clone(), target, output.bytes.len() as u64, file);
            Ok::<_, DocConvError>((artifact, output.stats))
        })
        .await
    }

    /// Convert a local file and write the result to `output_path`.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub async fn convert_to_file(
        &self,
        conversion: Conversion,
        input_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<ConversionStats, DocConvError> {
        let input_path = input_path.as_ref();
        let path = output_path.as_ref();

        let input = tokio::fs::read(input_path)
            .await
            .map_err(|e| DocConvError::InputReadFailed {
                path: input_path.to_path_buf(),
                source: e,
            })?;
        let output = self.convert(conversion, input).await?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DocConvError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }

        let tmp_path = path.with_extension(format!("{}.tmp", conversion.target().extension()));
        write_flushed(&tmp_path, &output.bytes).await?;

        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| DocConvError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(output.stats)
    }

    /// PDF bytes → DOCX bytes, without a timeout.
    ///
    /// # Errors
    /// - [`DocConvError::ExtractionFailed`] — unparseable PDF
    /// - [`DocConvError::EmptyExtraction`] — no visible text at all
    /// - [`DocConvError::NoContent`] — every line blank after splitting
    /// - [`DocConvError::AssemblyFailed`] — DOCX serialisation failed
    pub async fn pdf_to_docx(&self, pdf: Vec<u8>) -> Result<ConversionOutput, DocConvError> {
        let total_start = Instant::now();
        let input_bytes = pdf.len() as u64;

        // ── Step 1: Extract text ─────────────────────────────────────────
        let extract_start = Instant::now();
        let extractor = Arc::clone(&self.pdf_extractor);
        let text = run_backend(extractor.name(), move || extractor.extract_text(&pdf))
            .await
            .map_err(|source| DocConvError::ExtractionFailed {
                format: DocumentFormat::Pdf,
                source,
            })?;
        let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

        // ── Step 2: Reject blank extraction ──────────────────────────────
        if paragraphs::is_blank(&text) {
            return Err(DocConvError::EmptyExtraction);
        }

        // ── Step 3: Split into paragraphs ────────────────────────────────
        let paragraphs = paragraphs::split_paragraphs(&text);
        if paragraphs.is_empty() {
            return Err(DocConvError::NoContent);
        }
        debug!("Split {} chars into {} paragraphs", text.len(), paragraphs.len());

        // ── Step 4: Assemble DOCX ────────────────────────────────────────
        let assemble_start = Instant::now();
        let paragraph_count = paragraphs.len();
        let assembler = Arc::clone(&self.assembler);
        let bytes = run_backend(assembler.name(), move || assembler.assemble(&paragraphs))
            .await
            .map_err(|source| DocConvError::AssemblyFailed {
                format: DocumentFormat::Docx,
                source,
            })?;

        Ok(ConversionOutput {
            stats: ConversionStats {
                conversion: Conversion::PdfToDocx,
                input_bytes,
                output_bytes: bytes.len() as u64,
                extracted_chars: text.chars().count(),
                paragraphs: Some(paragraph_count),
                extract_duration_ms,
                assemble_duration_ms: assemble_start.elapsed().as_millis() as u64,
                total_duration_ms: total_start.elapsed().as_millis() as u64,
            },
            bytes,
        })
    }

    /// DOCX bytes → PDF bytes, without a timeout.
    ///
    /// Empty extracted text is not an error; it produces a blank one-page PDF.
    pub async fn docx_to_pdf(&self, docx: Vec<u8>) -> Result<ConversionOutput, DocConvError> {
        let total_start = Instant::now();
        let input_bytes = docx.len() as u64;

        // ── Step 1: Extract text ─────────────────────────────────────────
        let extract_start = Instant::now();
        let extractor = Arc::clone(&self.docx_extractor);
        let text = run_backend(extractor.name(), move || extractor.extract_text(&docx))
            .await
            .map_err(|source| DocConvError::ExtractionFailed {
                format: DocumentFormat::Docx,
                source,
            })?;
        let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
        let extracted_chars = text.chars().count();
        debug!("Extracted {} chars from DOCX", extracted_chars);

        // ── Step 2: Render PDF ───────────────────────────────────────────
        let render_start = Instant::now();
        let writer = Arc::clone(&self.pdf_writer);
        let bytes = run_backend(writer.name(), move || writer.write_text(&text))
            .await
            .map_err(|source| DocConvError::AssemblyFailed {
                format: DocumentFormat::Pdf,
                source,
            })?;

        Ok(ConversionOutput {
            stats: ConversionStats {
                conversion: Conversion::DocxToPdf,
                input_bytes,
                output_bytes: bytes.len() as u64,
                extracted_chars,
                paragraphs: None,
                extract_duration_ms,
                assemble_duration_ms: render_start.elapsed().as_millis() as u64,
                total_duration_ms: total_start.elapsed().as_millis() as u64,
            },
            bytes,
        })
    }

    async fn run(
        &self,
        conversion: Conversion,
        input: Vec<u8>,
    ) -> Result<ConversionOutput, DocConvError> {
        let output = match conversion {
            Conversion::PdfToDocx => self.pdf_to_docx(input).await?,
            Conversion::DocxToPdf => self.docx_to_pdf(input).await?,
        };
        info!(
            "Converted {}: {} → {} bytes in {}ms",
            conversion,
            output.stats.input_bytes,
            output.stats.output_bytes,
            output.stats.total_duration_ms
        );
        Ok(output)
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, DocConvError>>,
    ) -> Result<T, DocConvError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| DocConvError::Timeout { elapsed: limit })?,
            None => fut.await,
        }
    }
}

/// Run a synchronous backend call on the blocking pool.
///
/// A panic inside the backend is reported as that backend's failure.
async fn run_backend<T, F>(backend: &'static str, f: F) -> Result<T, BackendError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BackendError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BackendError::new(backend, format!("backend task failed: {}", e)))?
}

/// Write `bytes` to `path` and wait until they are on disk.
async fn write_flushed(path: &Path, bytes: &[u8]) -> Result<(), DocConvError> {
    let file = tokio::fs::File::create(path)
        .await
        .map_err(|e| DocConvError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    fill_flushed(file, path, bytes).await
}

/// Write `bytes` into an open `file` and wait until they are on disk.
async fn fill_flushed(
    mut file: tokio::fs::File,
    path: &Path,
    bytes: &[u8],
) -> Result<(), DocConvError> {
    let write_err = |e| DocConvError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    file.write_all(bytes).await.map_err(write_err)?;
    file.flush().await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UploadId;
    use tempfile::TempDir;

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn extract_text(&self, _bytes: &[u8]) -> Result<String, BackendError> {
            Ok(self.0.to_string())
        }
    }

    struct Panicking;

    impl TextExtractor for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn extract_text(&self, _bytes: &[u8]) -> Result<String, BackendError> {
            panic!("malformed cross-reference table")
        }
    }

    struct Slow(Duration);

    impl TextExtractor for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn extract_text(&self, _bytes: &[u8]) -> Result<String, BackendError> {
            std::thread::sleep(self.0);
            Ok("late".into())
        }
    }

    fn with_pdf_text(text: &'static str) -> Converter {
        Converter::builder()
            .pdf_extractor(Arc::new(FixedText(text)))
            .build()
    }

    fn docx_paragraphs(bytes: &[u8]) -> Vec<String> {
        let text = DocxTextExtractor.extract_text(bytes).unwrap();
        text.split("\n\n").map(str::to_string).collect()
    }

    #[tokio::test]
    async fn pdf_to_docx_one_paragraph_per_non_blank_line() {
        let converter = with_pdf_text("Heading\n\n   \nBody line one\nBody line two\n");
        let output = converter.pdf_to_docx(b"%PDF-1.4".to_vec()).await.unwrap();

        assert_eq!(output.stats.paragraphs, Some(3));
        assert_eq!(
            docx_paragraphs(&output.bytes),
            vec!["Heading", "Body line one", "Body line two"]
        );
    }

    #[tokio::test]
    async fn pdf_to_docx_rejects_blank_extraction() {
        for text in ["", "   ", "\n \t\n"] {
            let converter = Converter::builder()
                .pdf_extractor(Arc::new(FixedText(text)))
                .build();
            let err = converter.pdf_to_docx(Vec::new()).await.unwrap_err();
            assert!(
                matches!(err, DocConvError::EmptyExtraction),
                "{text:?} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn pdf_to_docx_surfaces_parse_failure() {
        let err = Converter::default()
            .pdf_to_docx(b"definitely not a pdf".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocConvError::ExtractionFailed {
                format: DocumentFormat::Pdf,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn backend_panic_fails_only_the_conversion() {
        let converter = Converter::builder()
            .pdf_extractor(Arc::new(Panicking))
            .build();
        let err = converter.pdf_to_docx(Vec::new()).await.unwrap_err();
        assert_eq!(err.code(), "EXTRACTION_FAILED");
        assert!(err.to_string().contains("panicking"), "got: {err}");
    }

    #[tokio::test]
    async fn docx_to_pdf_accepts_empty_text() {
        let converter = Converter::builder()
            .docx_extractor(Arc::new(FixedText("")))
            .build();
        let output = converter.docx_to_pdf(Vec::new()).await.unwrap();
        assert!(output.bytes.starts_with(b"%PDF"));
        assert_eq!(output.stats.extracted_chars, 0);
        assert_eq!(output.stats.paragraphs, None);
    }

    #[tokio::test]
    async fn docx_to_pdf_reads_real_docx() {
        let docx = DocxAssembler
            .assemble(&["Quarterly report".to_string(), "All good.".to_string()])
            .unwrap();
        let output = Converter::default().docx_to_pdf(docx).await.unwrap();
        assert!(output.bytes.starts_with(b"%PDF"));
        assert_eq!(
            output.stats.extracted_chars,
            "Quarterly report\n\nAll good.".chars().count()
        );
    }

    #[tokio::test]
    async fn docx_to_pdf_rejects_non_docx() {
        let err = Converter::default()
            .docx_to_pdf(b"plain text file".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocConvError::ExtractionFailed {
                format: DocumentFormat::Docx,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn convert_times_out() {
        let converter = Converter::builder()
            .pdf_extractor(Arc::new(Slow(Duration::from_millis(300))))
            .timeout(Duration::from_millis(20))
            .build();
        let err = converter
            .convert(Conversion::PdfToDocx, Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONVERSION_TIMEOUT");
    }

    #[tokio::test]
    async fn convert_stored_writes_flushed_artifact() {
        let root = TempDir::new().unwrap();
        let storage = StoragePaths::new(root.path().join("up"), root.path().join("out"));
        storage.ensure_dirs().await.unwrap();

        let id = UploadId::new();
        let file = storage.scoped(storage.upload_path(&id));
        std::fs::write(file.path(), b"%PDF-1.4").unwrap();
        let upload = StoredUpload::new(id.clone(), "in.pdf", 8, file);

        let (artifact, stats) = with_pdf_text("one\ntwo")
            .convert_stored(Conversion::PdfToDocx, &upload, &storage)
            .await
            .unwrap();

        assert_eq!(artifact.path(), storage.artifact_path(&id, DocumentFormat::Docx));
        let on_disk = std::fs::read(artifact.path()).unwrap();
        assert_eq!(on_disk.len() as u64, artifact.len);
        assert_eq!(stats.output_bytes, artifact.len);

        let path = artifact.path().to_path_buf();
        drop(artifact);
        assert!(!path.exists(), "artifact must be removed with its handle");
    }

    #[tokio::test]
    async fn convert_stored_failure_leaves_no_artifact() {
        let root = TempDir::new().unwrap();
        let storage = StoragePaths::new(root.path().join("up"), root.path().join("out"));
        storage.ensure_dirs().await.unwrap();

        let id = UploadId::new();
        let file = storage.scoped(storage.upload_path(&id));
        std::fs::write(file.path(), b"%PDF-1.4").unwrap();
        let upload = StoredUpload::new(id, "in.pdf", 8, file);

        let result = with_pdf_text(" \n ")
            .convert_stored(Conversion::PdfToDocx, &upload, &storage)
            .await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(storage.converted_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn convert_to_file_writes_atomically() {
        let root = TempDir::new().unwrap();
        let input = root.path().join("in.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();
        let output = root.path().join("nested/out.docx");

        let stats = with_pdf_text("alpha\nbeta")
            .convert_to_file(Conversion::PdfToDocx, &input, &output)
            .await
            .unwrap();

        assert_eq!(stats.paragraphs, Some(2));
        assert!(output.exists());
        assert!(!output.with_extension("docx.tmp").exists());
    }
}
