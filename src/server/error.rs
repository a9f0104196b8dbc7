//! HTTP-level errors.
//!
//! Every failure reaching the handler boundary becomes a short plain-text
//! body plus an `x-error-code` header. Conversion details are logged here
//! and never sent to the client.

use crate::config::Conversion;
use crate::error::DocConvError;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Response header carrying the machine-readable failure code.
pub const ERROR_CODE_HEADER: HeaderName = HeaderName::from_static("x-error-code");

/// Request failures with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No multipart part named `file` carrying a filename.
    #[error("No file uploaded for {conversion}")]
    MissingFile { conversion: Conversion },

    /// The upload's filename does not carry the expected extension.
    #[error("Expected a .{expected} upload for {conversion}, got '{filename}'")]
    UnsupportedExtension {
        conversion: Conversion,
        expected: &'static str,
        filename: String,
    },

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Upload exceeds the configured size limit")]
    PayloadTooLarge,

    /// Terminal failure inside the converter.
    #[error("{conversion} conversion failed: {source}")]
    Conversion {
        conversion: Conversion,
        #[source]
        source: DocConvError,
    },

    /// The converter reported success but the artifact cannot be opened.
    #[error("Artifact unavailable: {0}")]
    ArtifactUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile { .. }
            | ApiError::UnsupportedExtension { .. }
            | ApiError::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Conversion { .. }
            | ApiError::ArtifactUnavailable(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingFile { .. } => "MISSING_FILE",
            ApiError::UnsupportedExtension { .. } => "UNSUPPORTED_EXTENSION",
            ApiError::MalformedUpload(_) => "MALFORMED_UPLOAD",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::Conversion { source, .. } => source.code(),
            ApiError::ArtifactUnavailable(_) => "ARTIFACT_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    /// The client-facing message. Never includes internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::MissingFile {
                conversion: Conversion::PdfToDocx,
            }
            | ApiError::UnsupportedExtension {
                conversion: Conversion::PdfToDocx,
                ..
            } => "Please upload a valid PDF file.",
            ApiError::MissingFile {
                conversion: Conversion::DocxToPdf,
            } => "No file uploaded.",
            ApiError::UnsupportedExtension {
                conversion: Conversion::DocxToPdf,
                ..
            } => "Please upload a valid Word document.",
            ApiError::MalformedUpload(_) => "Malformed upload.",
            ApiError::PayloadTooLarge => "File too large.",
            ApiError::Conversion {
                conversion: Conversion::PdfToDocx,
                ..
            } => "Conversion failed. The PDF format may be unsupported.",
            ApiError::Conversion {
                conversion: Conversion::DocxToPdf,
                ..
            } => "Conversion failed.",
            ApiError::ArtifactUnavailable(_) | ApiError::Internal(_) => {
                "An internal error occurred."
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        } else {
            tracing::warn!(code, error = %self, "Request rejected");
        }

        let mut response = (status, self.public_message()).into_response();
        response
            .headers_mut()
            .insert(ERROR_CODE_HEADER, HeaderValue::from_static(code));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::config::DocumentFormat;

    #[test]
    fn client_errors_are_400() {
        let e = ApiError::MissingFile {
            conversion: Conversion::DocxToPdf,
        };
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.public_message(), "No file uploaded.");

        let e = ApiError::UnsupportedExtension {
            conversion: Conversion::PdfToDocx,
            expected: "pdf",
            filename: "notes.txt".into(),
        };
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.public_message(), "Please upload a valid PDF file.");
    }

    #[test]
    fn conversion_errors_hide_detail() {
        let e = ApiError::Conversion {
            conversion: Conversion::PdfToDocx,
            source: DocConvError::ExtractionFailed {
                format: DocumentFormat::Pdf,
                source: BackendError::new("pdf-extract", "secret internal path /srv/x"),
            },
        };
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.code(), "EXTRACTION_FAILED");
        assert!(!e.public_message().contains("/srv/x"));
    }

    #[test]
    fn response_carries_error_code_header() {
        let response = ApiError::PayloadTooLarge.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers().get(ERROR_CODE_HEADER).unwrap(),
            "PAYLOAD_TOO_LARGE"
        );
    }
}
