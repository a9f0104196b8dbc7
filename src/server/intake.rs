//! Upload intake: accept one multipart `file` part and persist it.
//!
//! Validation happens before any byte is written. Accepted uploads are
//! streamed chunk by chunk to `<uploads_dir>/<id>` under a scoped handle, so
//! a failure halfway through the body leaves nothing behind.

use crate::config::{Conversion, DocumentFormat};
use crate::server::error::ApiError;
use crate::storage::{StoragePaths, StoredUpload, UploadId};
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Form field carrying the document.
pub const FILE_FIELD: &str = "file";

/// What an endpoint demands of its upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakePolicy {
    pub conversion: Conversion,
    /// Reject uploads whose filename extension is not the source format's.
    pub require_extension: bool,
}

impl IntakePolicy {
    /// PDF→DOCX always checks the extension; DOCX→PDF only when `strict`.
    pub fn for_conversion(conversion: Conversion, strict: bool) -> Self {
        let require_extension = match conversion {
            Conversion::PdfToDocx => true,
            Conversion::DocxToPdf => strict,
        };
        Self {
            conversion,
            require_extension,
        }
    }

    /// Check the client-supplied filename against this policy.
    pub fn check(&self, filename: &str) -> Result<(), ApiError> {
        let expected = self.conversion.source();
        if self.require_extension && DocumentFormat::from_filename(filename) != Some(expected) {
            return Err(ApiError::UnsupportedExtension {
                conversion: self.conversion,
                expected: expected.extension(),
                filename: filename.to_string(),
            });
        }
        Ok(())
    }
}

/// Read the multipart body and persist the first `file` part.
///
/// Parts without a filename do not count as files. Extra `file` parts and
/// unrelated fields are skipped.
pub async fn receive(
    multipart: &mut Multipart,
    storage: &StoragePaths,
    policy: IntakePolicy,
) -> Result<StoredUpload, ApiError> {
    let mut accepted: Option<StoredUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        // Browsers send `filename=""` when no file was chosen.
        let Some(filename) = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
        else {
            debug!("Skipping non-file field '{}'", name);
            continue;
        };
        if name != FILE_FIELD {
            debug!("Skipping file under unexpected field '{}'", name);
            continue;
        }
        if accepted.is_some() {
            warn!("Ignoring extra upload '{}'", filename);
            continue;
        }

        policy.check(&filename)?;
        accepted = Some(persist(field, filename, storage).await?);
    }

    accepted.ok_or(ApiError::MissingFile {
        conversion: policy.conversion,
    })
}

/// Stream one field to a fresh file under the uploads directory.
async fn persist(
    mut field: Field<'_>,
    filename: String,
    storage: &StoragePaths,
) -> Result<StoredUpload, ApiError> {
    let id = UploadId::new();
    let path = storage.upload_path(&id);
    let (file, mut out) = storage
        .scoped(path.clone())
        .create()
        .await
        .map_err(|e| ApiError::Internal(format!("create {}: {}", path.display(), e)))?;

    let mut len: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        len += chunk.len() as u64;
        out.write_all(&chunk)
            .await
            .map_err(|e| ApiError::Internal(format!("write {}: {}", file.path().display(), e)))?;
    }
    out.flush()
        .await
        .map_err(|e| ApiError::Internal(format!("flush {}: {}", file.path().display(), e)))?;

    debug!("Stored upload '{}' as {} ({} bytes)", filename, id, len);
    Ok(StoredUpload::new(id, filename, len, file))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::MalformedUpload(err.body_text())
    }
}
