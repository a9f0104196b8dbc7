//! Response dispatcher: stream a finished artifact back as a download.

use crate::server::error::ApiError;
use crate::storage::Artifact;
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::info;

/// Stream `artifact` to the client as an attachment named `<id>.<ext>`.
///
/// The artifact's scoped handle moves into the body stream, so the file is
/// removed once the body is dropped, whether it was fully sent or the
/// client went away.
pub async fn download(artifact: Artifact) -> Result<Response, ApiError> {
    let unavailable = |e: std::io::Error| {
        ApiError::ArtifactUnavailable(format!("{}: {}", artifact.path().display(), e))
    };

    let file = tokio::fs::File::open(artifact.path())
        .await
        .map_err(unavailable)?;
    let len = file.metadata().await.map_err(unavailable)?.len();

    let content_type = artifact.format.content_type();
    let disposition = format!("attachment; filename=\"{}\"", artifact.download_name());
    info!("Sending {} ({} bytes)", artifact.download_name(), len);

    let handle = artifact.into_file();
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _held = &handle;
        chunk
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("build response: {}", e)))
}
