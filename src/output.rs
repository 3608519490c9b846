//! Result types produced by the pipeline.

use crate::error::{EngineFailure, OcrError};
use serde::Serialize;

/// What one engine produced for one page.
#[derive(Debug, Clone, Serialize)]
pub struct EngineResult {
    /// Engine label, e.g. `"Qari OCR"`.
    pub engine: String,
    /// 1-based page number.
    pub ordinal: usize,
    pub outcome: Result<String, EngineFailure>,
}

impl EngineResult {
    /// The text shown for this result: the extracted text, or the failure
    /// message in its place.
    pub fn text(&self) -> String {
        match &self.outcome {
            Ok(text) => text.clone(),
            Err(failure) => failure.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// The merged text of one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    pub ordinal: usize,
    pub text: String,
    /// Per-engine results, in engine slot order.
    pub results: Vec<EngineResult>,
}

/// Timing and counting information for one request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OcrStats {
    pub total_pages: usize,
    pub engine_calls: usize,
    pub failed_engine_calls: usize,
    pub total_duration_ms: u64,
    pub render_duration_ms: u64,
    pub ocr_duration_ms: u64,
}

/// Successful pipeline output.
///
/// Serialises as `{"success": true, "text": ..., "upload_id": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedDocument {
    pub success: bool,
    pub text: String,
    /// Id of the (already released) request workspace.
    pub upload_id: String,
    #[serde(skip)]
    pub pages: Vec<PageText>,
    #[serde(skip)]
    pub stats: OcrStats,
}

/// Wire shape of a fatal failure: `{"success": false, "detail": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}

impl From<&OcrError> for ErrorResponse {
    fn from(err: &OcrError) -> Self {
        if err.is_caller_error() {
            Self::new(err.to_string())
        } else {
            Self::new(format!("OCR processing error: {err}"))
        }
    }
}
