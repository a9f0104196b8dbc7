//! Route table for the conversion service.

use crate::server::{handlers, AppState};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

/// Build the service router.
///
/// | Route | Handler |
/// |---|---|
/// | `POST /convert-pdf-to-word` | [`handlers::pdf_to_word`] |
/// | `POST /convert-word-to-pdf` | [`handlers::word_to_pdf`] |
/// | `GET /health` | liveness probe |
/// | anything else | static files from `static_dir`, 404 when absent |
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/convert-pdf-to-word", post(handlers::pdf_to_word))
        .route("/convert-word-to-pdf", post(handlers::word_to_pdf))
        .route("/health", get(|| async { "ok" }))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
