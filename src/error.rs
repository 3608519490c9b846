//! Error types for the arabic-ocr library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`OcrError`] is **fatal**: the request cannot proceed at all (rejected
//!   upload, scratch directory unavailable, unreadable PDF, unknown engine
//!   selection). Returned as `Err(OcrError)` from the pipeline entry points.
//!
//! * [`EngineFailure`] is **non-fatal**: one engine could not read one page
//!   (missing API key, network fault, non-2xx response). It is stored inside
//!   [`crate::output::EngineResult`] and rendered inline into the page text,
//!   so the request still succeeds with a degraded result.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`OcrError`].
///
/// Request layers map this to a status code; the pipeline uses it to decide
/// how much of the error message is shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The upload was rejected before any resource was allocated.
    Validation,
    /// The per-request workspace or an output file could not be written.
    Resource,
    /// The document could not be decoded or rasterised.
    Decode,
    /// The engine selection token is not one of the supported values.
    InvalidSelection,
    /// The configuration is inconsistent.
    Config,
    /// Unexpected internal failure.
    Internal,
}

/// All fatal errors returned by the arabic-ocr library.
///
/// Per-engine failures use [`EngineFailure`] and are folded into the page
/// text rather than propagated here.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// The filename is empty or its extension is not pdf/png/jpg/jpeg.
    #[error("Invalid file type. Only PDF, PNG, JPG, and JPEG are allowed.")]
    UnsupportedFileType { filename: String },

    /// The declared upload size exceeds the configured maximum.
    #[error("File too large: {size} bytes exceeds the {max}-byte limit.")]
    FileTooLarge { size: u64, max: u64 },

    /// The input path given to the pipeline does not exist.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// A collaborator was asked to work on empty text.
    #[error("{what} is required")]
    MissingText { what: &'static str },

    // ── Selection errors ──────────────────────────────────────────────────
    /// The engine selection token is not one of `qari`, `mistral`, `both`.
    #[error("Invalid OCR engine selection: '{token}' (expected qari, mistral or both)")]
    InvalidSelection { token: String },

    // ── Resource errors ───────────────────────────────────────────────────
    /// The scratch directory for this request could not be created.
    #[error("Cannot create workspace '{path}': {source}")]
    WorkspaceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file inside the workspace could not be written.
    #[error("Cannot write '{path}' into the workspace: {detail}")]
    WorkspaceWrite { path: PathBuf, detail: String },

    /// The input file exists but could not be read.
    #[error("Cannot read input file '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an exported report.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The PDF is not a PDF, or pdfium refused to open it.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptDocument { path: PathBuf, detail: String },

    /// The PDF is encrypted and no password was given.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was given but pdfium rejected it.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The PDF opened but has no pages.
    #[error("PDF '{path}' has no pages")]
    EmptyDocument { path: PathBuf },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Install libpdfium system-wide or set PDFIUM_LIB_PATH to the library (or its directory)."
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OcrError::UnsupportedFileType { .. }
            | OcrError::FileTooLarge { .. }
            | OcrError::FileNotFound { .. }
            | OcrError::MissingText { .. } => ErrorKind::Validation,
            OcrError::InvalidSelection { .. } => ErrorKind::InvalidSelection,
            OcrError::WorkspaceUnavailable { .. }
            | OcrError::WorkspaceWrite { .. }
            | OcrError::InputUnreadable { .. }
            | OcrError::OutputWriteFailed { .. } => ErrorKind::Resource,
            OcrError::CorruptDocument { .. }
            | OcrError::PasswordRequired { .. }
            | OcrError::WrongPassword { .. }
            | OcrError::EmptyDocument { .. }
            | OcrError::RasterisationFailed { .. }
            | OcrError::PdfiumBindingFailed(_) => ErrorKind::Decode,
            OcrError::InvalidConfig(_) => ErrorKind::Config,
            OcrError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Was this request rejected because of what the caller sent?
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::InvalidSelection
        )
    }
}

/// A non-fatal failure of one engine on one page (or of one translation).
///
/// The `Display` text is what ends up inside the extracted text, so every
/// message is written for the person reading the document.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
pub enum EngineFailure {
    /// No API key is configured for a remote service.
    #[error("Error: {service} API key not found. Please set the {env_var} environment variable.")]
    MissingCredential {
        service: String,
        env_var: &'static str,
    },

    /// The remote service answered with a non-success status.
    #[error("{service} API error: {status} - {body}")]
    Api {
        service: String,
        status: u16,
        body: String,
    },

    /// The remote call did not finish within the configured timeout.
    #[error("Error processing with {service}: request timed out after {secs}s")]
    Timeout { service: String, secs: u64 },

    /// Connection, TLS or other transport-level fault.
    #[error("Error processing with {service}: {detail}")]
    Transport { service: String, detail: String },

    /// The remote service answered 2xx but the body was not usable.
    #[error("{service} returned an unreadable response: {detail}")]
    MalformedResponse { service: String, detail: String },

    /// The page image could not be read from the workspace.
    #[error("Could not read page image '{path}': {detail}")]
    ImageUnreadable { path: PathBuf, detail: String },

    /// A local recogniser failed.
    #[error("Error processing with {engine}: {detail}")]
    Recognition { engine: String, detail: String },
}
