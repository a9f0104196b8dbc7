//! Storage paths and scoped on-disk files.
//!
//! Every request gets a fresh [`UploadId`]. Its upload lives at
//! `<uploads_dir>/<id>` and its artifact at `<converted_dir>/<id>.<ext>`,
//! so concurrent requests never touch the same file and no locking is needed.
//!
//! Files are held through [`ScopedFile`], which deletes the file when the
//! handle is dropped. Dropping happens on every exit path of a request:
//! success, error, timeout, or the client hanging up mid-download (the
//! artifact handle rides inside the response body stream). Setting
//! `retain_files` turns the handles into plain paths and leaves the files
//! on disk.

use crate::config::{DocumentFormat, ServerConfig};
use crate::error::DocConvError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::debug;
use uuid::Uuid;

/// Unique per-request identifier: 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadId(String);

impl UploadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two directories shared by all requests.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    uploads_dir: PathBuf,
    converted_dir: PathBuf,
    retain_files: bool,
}

impl StoragePaths {
    pub fn new(uploads_dir: impl Into<PathBuf>, converted_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            converted_dir: converted_dir.into(),
            retain_files: false,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.uploads_dir, &config.converted_dir).retain_files(config.retain_files)
    }

    /// Keep files on disk after their handles drop.
    pub fn retain_files(mut self, v: bool) -> Self {
        self.retain_files = v;
        self
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn converted_dir(&self) -> &Path {
        &self.converted_dir
    }

    /// Create both directories if they do not exist yet.
    pub async fn ensure_dirs(&self) -> Result<(), DocConvError> {
        for dir in [&self.uploads_dir, &self.converted_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| DocConvError::StorageUnavailable {
                    path: dir.clone(),
                    source: e,
                })?;
        }
        debug!(
            "Storage ready: uploads={} converted={}",
            self.uploads_dir.display(),
            self.converted_dir.display()
        );
        Ok(())
    }

    pub fn upload_path(&self, id: &UploadId) -> PathBuf {
        self.uploads_dir.join(id.as_str())
    }

    pub fn artifact_path(&self, id: &UploadId, format: DocumentFormat) -> PathBuf {
        self.converted_dir
            .join(format!("{}.{}", id, format.extension()))
    }

    /// Take ownership of `path` under this store's retention policy.
    ///
    /// The file does not need to exist yet.
    pub fn scoped(&self, path: PathBuf) -> ScopedFile {
        ScopedFile::new(path, self.retain_files)
    }
}

/// A file removed from disk when this handle is dropped, unless retained.
pub struct ScopedFile {
    path: PathBuf,
    guard: Option<TempPath>,
}

impl ScopedFile {
    pub fn new(path: PathBuf, retain: bool) -> Self {
        let guard = (!retain).then(|| TempPath::from_path(path.clone()));
        Self { path, guard }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_retained(&self) -> bool {
        self.guard.is_none()
    }

    /// Create (or truncate) the file and open it for writing.
    ///
    /// The create runs on the blocking pool with this handle moved into the
    /// same call. If the caller is cancelled mid-create, the handle drops
    /// once the create returns, so no orphaned file is left behind.
    pub async fn create(self) -> io::Result<(ScopedFile, tokio::fs::File)> {
        let (handle, file) = tokio::task::spawn_blocking(move || {
            let file = std::fs::File::create(&self.path)?;
            Ok::<_, io::Error>((self, file))
        })
        .await
        .map_err(io::Error::other)??;
        Ok((handle, tokio::fs::File::from_std(file)))
    }
}

impl fmt::Debug for ScopedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedFile")
            .field("path", &self.path)
            .field("retained", &self.is_retained())
            .finish()
    }
}

/// An accepted upload persisted under the uploads directory.
#[derive(Debug)]
pub struct StoredUpload {
    pub id: UploadId,
    /// Client-supplied filename. Used for the extension check and logs only.
    pub original_name: String,
    /// Format detected from `original_name`, if any.
    pub detected_format: Option<DocumentFormat>,
    pub len: u64,
    file: ScopedFile,
}

impl StoredUpload {
    pub fn new(id: UploadId, original_name: impl Into<String>, len: u64, file: ScopedFile) -> Self {
        let original_name = original_name.into();
        let detected_format = DocumentFormat::from_filename(&original_name);
        Self {
            id,
            original_name,
            detected_format,
            len,
            file,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// A converted output file under the converted directory.
#[derive(Debug)]
pub struct Artifact {
    pub id: UploadId,
    pub format: DocumentFormat,
    pub len: u64,
    file: ScopedFile,
}

impl Artifact {
    pub fn new(id: UploadId, format: DocumentFormat, len: u64, file: ScopedFile) -> Self {
        Self {
            id,
            format,
            len,
            file,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Filename offered to the client: `<id>.<ext>`.
    pub fn download_name(&self) -> String {
        format!("{}.{}", self.id, self.format.extension())
    }

    /// Release the underlying handle, e.g. to move it into a response body.
    pub fn into_file(self) -> ScopedFile {
        self.file
    }
}
