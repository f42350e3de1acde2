//! Error types for the jobfit library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`JobFitError`] — **Fatal**: the analysis cannot proceed at all
//!   (no resume, no job description, unreadable PDF, provider not
//!   configured). Returned as `Err(JobFitError)` from the top-level
//!   `analyze*` functions.
//!
//! * [`TabError`] — **Non-fatal**: one of the three analysis tabs failed
//!   (quota error, timeout) while the other two are fine. Stored inside
//!   [`crate::output::TabResult`] so a failing summary never hides the
//!   match score.
//!
//! Nothing in this crate retries: PDF rendering is deterministic and model
//! failures are surfaced to the user as-is.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the jobfit library.
#[derive(Debug, Error)]
pub enum JobFitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A required input (resume or job description) was not supplied.
    #[error("Missing input: {what}\nPlease upload your resume and paste the job description.")]
    MissingInput { what: String },

    /// Resume file was not found at the given path.
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Document errors ───────────────────────────────────────────────────
    /// The bytes are not a PDF, cannot be parsed, or contain no pages.
    #[error("Invalid resume document: {detail}")]
    InvalidDocument { detail: String },

    /// The first page could not be rasterised or re-encoded.
    #[error("Rendering the first page failed: {detail}")]
    RenderFailed { detail: String },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The model collaborator failed (network, quota, timeout).
    #[error("Model service error: {message}")]
    ExternalService { message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the binary.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JobFitError {
    pub(crate) fn missing(what: impl Into<String>) -> Self {
        JobFitError::MissingInput { what: what.into() }
    }

    pub(crate) fn invalid_document(detail: impl Into<String>) -> Self {
        JobFitError::InvalidDocument {
            detail: detail.into(),
        }
    }
}

/// A non-fatal error for a single analysis tab.
///
/// The other tabs of the same analysis are unaffected.
#[derive(Debug, Clone, Error, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TabError {
    /// The model call failed.
    #[error("{tab}: model call failed: {detail}")]
    ExternalService { tab: String, detail: String },

    /// The model call did not return in time.
    #[error("{tab}: model call timed out after {secs}s")]
    Timeout { tab: String, secs: u64 },
}
