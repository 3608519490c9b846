//! Image encoding: page file → base64 `data:` URL for the vision API.
//!
//! Vision chat APIs accept images inline in the JSON body. The bytes on disk
//! are sent untouched; rendered PDF pages are already lossless PNGs and
//! re-encoding an uploaded JPEG would only add artefacts.

use crate::error::EngineFailure;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// MIME type guessed from the file extension (`image/png`, `image/jpeg`, ...).
pub fn mime_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Convert binary data to a `data:` URL.
pub fn data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}

/// Read a page image and wrap it as a `data:` URL.
pub async fn encode_image_file(path: &Path) -> Result<String, EngineFailure> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| EngineFailure::ImageUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    let url = data_url(&mime_type_for(path), &bytes);
    debug!("Encoded {} → {} bytes data URL", path.display(), url.len());
    Ok(url)
}
