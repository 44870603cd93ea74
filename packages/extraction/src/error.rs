//! Typed errors for the resume extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Best-effort degradations
//! (a corrupt page, a failed OCR pass) are represented as empty values
//! at the extraction layer, not as errors; only conditions the caller
//! must act on surface here.

use thiserror::Error;

/// Errors that can occur while extracting text from a document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The filename extension maps to no known format.
    #[error("unsupported file type: {extension:?}")]
    UnsupportedFormat { extension: String },
}

/// Errors from the OCR toolchain.
///
/// These never escape the extraction layer: a page-level OCR failure is
/// logged and the page falls back to its embedded text.
#[derive(Debug, Error)]
pub enum OcrError {
    /// Temp-file or process I/O failed.
    #[error("OCR io error: {0}")]
    Io(#[from] std::io::Error),

    /// An external tool exited non-zero.
    #[error("{tool} failed with status {status}: {stderr}")]
    Command {
        tool: String,
        status: i32,
        stderr: String,
    },

    /// Image decoding or re-encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The rasterizer produced no page image.
    #[error("no page image produced for page {page}")]
    MissingPageImage { page: u32 },
}

/// Errors that can occur calling the external extraction service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Every credential stayed at capacity for the whole wait window.
    #[error("no API key available within the wait window")]
    NoKeyAvailable,

    /// The HTTP request itself failed (network, TLS, timeout).
    #[error("service request failed: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered with a non-success status.
    #[error("service returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body carried no completion text.
    #[error("service response contained no candidates")]
    EmptyResponse,
}

/// Result type alias for extraction operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for OCR operations.
pub type OcrResult<T> = std::result::Result<T, OcrError>;

/// Result type alias for service-call operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
