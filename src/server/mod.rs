//! HTTP service: upload intake, conversion and download over axum.
//!
//! ```text
//! client ──▶ intake ──▶ Converter ──▶ dispatch ──▶ client
//!            (multipart) (blocking pool) (streamed body)
//! ```
//!
//! * [`intake`]   — validate and persist the single `file` part
//! * [`handlers`] — sequence one request, inside a per-request tracing span
//! * [`dispatch`] — stream the artifact as an attachment
//! * [`error`]    — HTTP status mapping, plain-text bodies, `x-error-code`
//! * [`router`]   — route table, body limit, static frontend

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod intake;
pub mod router;

pub use router::router;

use crate::config::ServerConfig;
use crate::convert::Converter;
use crate::error::DocConvError;
use crate::storage::StoragePaths;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub converter: Converter,
    pub storage: Arc<StoragePaths>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// State with the default backends, bounded by `config.request_timeout_secs`.
    pub fn new(config: ServerConfig) -> Self {
        let converter = Converter::builder()
            .timeout(config.request_timeout())
            .build();
        Self::with_converter(config, converter)
    }

    /// State with a caller-supplied converter (custom backends or timeout).
    pub fn with_converter(config: ServerConfig, converter: Converter) -> Self {
        Self {
            converter,
            storage: Arc::new(StoragePaths::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

/// Create the storage directories, bind, and serve until Ctrl-C.
pub async fn serve(state: AppState) -> Result<(), DocConvError> {
    state.storage.ensure_dirs().await?;

    let addr = state.config.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DocConvError::ListenFailed { addr, source: e })?;
    let local_addr = listener.local_addr().unwrap_or(addr);

    info!(
        addr = %local_addr,
        uploads = %state.storage.uploads_dir().display(),
        converted = %state.storage.converted_dir().display(),
        "Server is running on http://{}",
        local_addr
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DocConvError::ListenFailed { addr, source: e })?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested, draining in-flight requests"),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C ({}), running until killed", e);
            std::future::pending::<()>().await;
        }
    }
}
