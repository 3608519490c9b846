//! Upload validation: the first gate, before any resource is allocated.
//!
//! The checks are pure predicates over the declared filename and size so the
//! request layer can run them before it has even buffered the body.

use crate::error::OcrError;
use std::path::Path;

/// Extensions accepted for upload (lower-case, without the dot).
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

/// Default upload limit: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Lower-cased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

/// `true` when `filename` ends in one of [`ALLOWED_EXTENSIONS`] (any case).
pub fn validate_extension(filename: &str) -> bool {
    match extension_of(filename) {
        Some(ext) => ALLOWED_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// `true` when `size` does not exceed `max`.
pub fn validate_size(size: u64, max: u64) -> bool {
    size <= max
}

/// Both checks.
pub fn validate(filename: &str, size: u64, max: u64) -> bool {
    validate_extension(filename) && validate_size(size, max)
}

/// An uploaded document as received from the caller.
///
/// Immutable once created; the pipeline consumes it when it writes the bytes
/// into the request workspace.
#[derive(Debug, Clone)]
pub struct UploadArtifact {
    pub filename: String,
    /// Size as declared by the sender. May differ from `bytes.len()` for
    /// streamed uploads; the limit is enforced on the larger of the two.
    pub declared_size: u64,
    pub bytes: Vec<u8>,
}

impl UploadArtifact {
    pub fn new(filename: impl Into<String>, declared_size: u64, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            declared_size,
            bytes,
        }
    }

    /// Artifact whose declared size is the length of `bytes`.
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self::new(filename, size, bytes)
    }

    /// Lower-cased extension of the declared filename.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.filename)
    }

    /// The larger of the declared size and the bytes actually held.
    pub fn effective_size(&self) -> u64 {
        self.declared_size.max(self.bytes.len() as u64)
    }

    /// Reject the upload if its type or size is not acceptable.
    pub fn validate(&self, max_bytes: u64) -> Result<(), OcrError> {
        if !validate_extension(&self.filename) {
            return Err(OcrError::UnsupportedFileType {
                filename: self.filename.clone(),
            });
        }
        let size = self.effective_size();
        if !validate_size(size, max_bytes) {
            return Err(OcrError::FileTooLarge {
                size,
                max: max_bytes,
            });
        }
        Ok(())
    }
}
