//! Axum handlers for the two conversion endpoints.

use crate::config::Conversion;
use crate::server::error::ApiError;
use crate::server::intake::{self, IntakePolicy};
use crate::server::{dispatch, AppState};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Response;
use tracing::{debug, info, info_span, Instrument};

/// `POST /convert-pdf-to-word`
pub async fn pdf_to_word(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    handle_conversion(state, multipart, Conversion::PdfToDocx).await
}

/// `POST /convert-word-to-pdf`
pub async fn word_to_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    handle_conversion(state, multipart, Conversion::DocxToPdf).await
}

/// intake → converter → dispatcher, strictly in that order.
async fn handle_conversion(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
    conversion: Conversion,
) -> Result<Response, ApiError> {
    // A request that is not multipart at all carries no file.
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Multipart rejected: {}", rejection.body_text());
        ApiError::MissingFile { conversion }
    })?;

    let policy = IntakePolicy::for_conversion(conversion, state.config.strict_intake);
    let upload = intake::receive(&mut multipart, &state.storage, policy).await?;

    let span = info_span!("convert", id = %upload.id, %conversion);
    async move {
        info!(
            filename = %upload.original_name,
            bytes = upload.len,
            "Upload accepted"
        );

        let (artifact, stats) = state
            .converter
            .convert_stored(conversion, &upload, &state.storage)
            .await
            .map_err(|source| ApiError::Conversion { conversion, source })?;

        debug!(
            extracted_chars = stats.extracted_chars,
            paragraphs = ?stats.paragraphs,
            extract_ms = stats.extract_duration_ms,
            assemble_ms = stats.assemble_duration_ms,
            "Conversion stats"
        );

        // `upload` drops when this block ends; the artifact lives on in the body.
        dispatch::download(artifact).await
    }
    .instrument(span)
    .await
}
