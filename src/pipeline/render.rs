//! Page rasterisation: turn an uploaded document into per-page PNG files.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks on CPU-heavy rendering. The whole render-and-save loop
//! runs on the blocking pool so Tokio worker threads never stall.
//!
//! ## Why cap pixels, not DPI?
//!
//! Scanned pages come in every physical size. `max_rendered_pixels` caps the
//! longest edge, keeping memory bounded and images within the size range
//! vision models handle well.

use crate::error::OcrError;
use crate::pipeline::workspace::Workspace;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// One rasterised page inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based page number.
    pub ordinal: usize,
    pub path: PathBuf,
}

/// Receives each rendered page (0-based index) in document order.
pub type PageSink<'a> = dyn FnMut(usize, DynamicImage) -> Result<(), OcrError> + 'a;

/// Something that can render every page of a PDF.
///
/// Called from a blocking thread. Returns the number of pages rendered.
pub trait PdfRenderer: Send + Sync {
    fn render_pages(&self, pdf_path: &Path, sink: &mut PageSink<'_>) -> Result<usize, OcrError>;
}

/// Production renderer backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRenderer {
    library_path: Option<PathBuf>,
    max_pixels: u32,
    password: Option<String>,
}

impl PdfiumRenderer {
    pub fn new(library_path: Option<PathBuf>, max_pixels: u32, password: Option<String>) -> Self {
        Self {
            library_path,
            max_pixels,
            password,
        }
    }

    fn bind(&self) -> Result<Pdfium, OcrError> {
        let bindings = match &self.library_path {
            Some(path) if path.is_file() => Pdfium::bind_to_library(path),
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| OcrError::PdfiumBindingFailed(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PdfRenderer for PdfiumRenderer {
    fn render_pages(&self, pdf_path: &Path, sink: &mut PageSink<'_>) -> Result<usize, OcrError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, self.password.as_deref())
            .map_err(|e| load_error(pdf_path, self.password.is_some(), format!("{:?}", e)))?;

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("PDF loaded: {} pages", total);
        if total == 0 {
            return Err(OcrError::EmptyDocument {
                path: pdf_path.to_path_buf(),
            });
        }

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                OcrError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;
            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            sink(idx, image)?;
        }

        Ok(total)
    }
}

/// Map a pdfium load failure to the matching error.
fn load_error(path: &Path, password_given: bool, detail: String) -> OcrError {
    if detail.contains("Password") || detail.contains("password") {
        if password_given {
            OcrError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            OcrError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        OcrError::CorruptDocument {
            path: path.to_path_buf(),
            detail,
        }
    }
}

/// pdfium accepts a header anywhere in the first 1024 bytes.
const PDF_HEADER_WINDOW: u64 = 1024;

/// Does `%PDF` appear within the header window?
fn has_pdf_signature(path: &Path) -> Result<bool, OcrError> {
    let file = std::fs::File::open(path).map_err(|e| OcrError::CorruptDocument {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let mut head = Vec::with_capacity(PDF_HEADER_WINDOW as usize);
    file.take(PDF_HEADER_WINDOW)
        .read_to_end(&mut head)
        .map_err(|e| OcrError::CorruptDocument {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    Ok(head.windows(4).any(|w| w == b"%PDF"))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Blocking half of [`rasterize`].
fn rasterize_blocking(
    artifact: &Path,
    workspace: &Workspace,
    renderer: &dyn PdfRenderer,
) -> Result<Vec<PageImage>, OcrError> {
    if !has_pdf_signature(artifact)? {
        return Err(OcrError::CorruptDocument {
            path: artifact.to_path_buf(),
            detail: "missing %PDF header".to_string(),
        });
    }

    let mut pages = Vec::new();
    let mut save = |idx: usize, image: DynamicImage| -> Result<(), OcrError> {
        let ordinal = idx + 1;
        let path = workspace.file(&format!("page_{ordinal}.png"));
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| OcrError::WorkspaceWrite {
                path: path.clone(),
                detail: e.to_string(),
            })?;
        pages.push(PageImage { ordinal, path });
        Ok(())
    };

    let total = renderer.render_pages(artifact, &mut save)?;
    if total == 0 || pages.is_empty() {
        return Err(OcrError::EmptyDocument {
            path: artifact.to_path_buf(),
        });
    }
    pages.sort_by_key(|p| p.ordinal);
    Ok(pages)
}

/// Turn the stored artifact into an ordered list of page images.
///
/// PDFs are rendered page by page into `page_<n>.png` inside the workspace.
/// Images are already a single page and are returned as-is.
pub async fn rasterize(
    artifact: &Path,
    workspace: &Workspace,
    renderer: Arc<dyn PdfRenderer>,
) -> Result<Vec<PageImage>, OcrError> {
    if !is_pdf(artifact) {
        return Ok(vec![PageImage {
            ordinal: 1,
            path: artifact.to_path_buf(),
        }]);
    }

    let path = artifact.to_path_buf();
    let ws = workspace.clone();
    tokio::task::spawn_blocking(move || rasterize_blocking(&path, &ws, renderer.as_ref()))
        .await
        .map_err(|e| OcrError::Internal(format!("Render task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::workspace::WorkspaceManager;
    use image::{Rgb, RgbImage};

    struct BlankPages(usize);

    impl PdfRenderer for BlankPages {
        fn render_pages(&self, _: &Path, sink: &mut PageSink<'_>) -> Result<usize, OcrError> {
            for i in 0..self.0 {
                sink(i, DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))))?;
            }
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn image_artifact_is_single_page() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = WorkspaceManager::new(tmp.path()).allocate().unwrap();
        let upload = ws.file("upload.png");
        std::fs::write(&upload, b"not really a png").unwrap();

        let pages = rasterize(&upload, &ws, Arc::new(BlankPages(0))).await.unwrap();
        assert_eq!(pages, vec![PageImage { ordinal: 1, path: upload }]);
    }

    #[tokio::test]
    async fn pdf_pages_are_written_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = WorkspaceManager::new(tmp.path()).allocate().unwrap();
        let upload = ws.file("upload.pdf");
        std::fs::write(&upload, b"%PDF-1.7\n").unwrap();

        let pages = rasterize(&upload, &ws, Arc::new(BlankPages(3))).await.unwrap();
        let ordinals: Vec<usize> = pages.iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        for p in &pages {
            assert!(p.path.is_file());
            assert_eq!(
                p.path.file_name().unwrap().to_str().unwrap(),
                format!("page_{}.png", p.ordinal)
            );
        }
    }

    #[tokio::test]
    async fn missing_signature_is_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = WorkspaceManager::new(tmp.path()).allocate().unwrap();
        let upload = ws.file("upload.PDF");
        std::fs::write(&upload, b"hello").unwrap();

        let err = rasterize(&upload, &ws, Arc::new(BlankPages(1))).await.unwrap_err();
        assert!(matches!(err, OcrError::CorruptDocument { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn header_after_leading_bytes_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = WorkspaceManager::new(tmp.path()).allocate().unwrap();
        let upload = ws.file("upload.pdf");
        std::fs::write(&upload, b"\r\n%PDF-1.4\n").unwrap();

        let pages = rasterize(&upload, &ws, Arc::new(BlankPages(1))).await.unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn header_past_window_is_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = WorkspaceManager::new(tmp.path()).allocate().unwrap();
        let upload = ws.file("upload.pdf");
        let mut bytes = vec![b' '; 2048];
        bytes.extend_from_slice(b"%PDF-1.4\n");
        std::fs::write(&upload, bytes).unwrap();

        let err = rasterize(&upload, &ws, Arc::new(BlankPages(1))).await.unwrap_err();
        assert!(matches!(err, OcrError::CorruptDocument { .. }), "got {err:?}");
    }

    #[test]
    fn password_errors_are_told_apart() {
        let path = Path::new("locked.pdf");
        assert!(matches!(
            load_error(path, false, "PdfiumLibraryInternalError(PasswordError)".into()),
            OcrError::PasswordRequired { .. }
        ));
        assert!(matches!(
            load_error(path, true, "PdfiumLibraryInternalError(PasswordError)".into()),
            OcrError::WrongPassword { .. }
        ));
        match load_error(path, true, "PdfiumLibraryInternalError(FormatError)".into()) {
            OcrError::CorruptDocument { detail, .. } => assert!(detail.contains("FormatError")),
            other => panic!("got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_pages_is_empty_document() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = WorkspaceManager::new(tmp.path()).allocate().unwrap();
        let upload = ws.file("upload.pdf");
        std::fs::write(&upload, b"%PDF-1.4").unwrap();

        let err = rasterize(&upload, &ws, Arc::new(BlankPages(0))).await.unwrap_err();
        assert!(matches!(err, OcrError::EmptyDocument { .. }));
    }
}
