//! Request-level entry points: one upload in, one combined text out.
//!
//! [`OcrPipeline`] wires the stages together and owns the cleanup guarantee:
//! the request workspace is gone by the time any of its methods return,
//! whether the request succeeded or failed. A cancelled request is cleaned
//! up by the workspace guard on the blocking pool.

use crate::config::OcrConfig;
use crate::engines::{EngineSelection, EngineSet};
use crate::error::OcrError;
use crate::output::{CombinedDocument, OcrStats, PageText};
use crate::pipeline::aggregate::aggregate;
use crate::pipeline::dispatch::dispatch;
use crate::pipeline::render::{rasterize, PdfRenderer, PdfiumRenderer};
use crate::pipeline::validate::{validate_extension, UploadArtifact};
use crate::pipeline::workspace::{Workspace, WorkspaceManager};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The OCR pipeline: validation, rasterisation, engine dispatch and
/// aggregation over a per-request workspace.
///
/// Cheap to share behind an `Arc`; it holds no per-request state.
///
/// # Example
/// ```rust,no_run
/// use arabic_ocr::{OcrConfig, OcrPipeline};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = OcrPipeline::new(OcrConfig::from_env()?)?;
/// let doc = pipeline.process_file("scan.pdf", "both").await?;
/// println!("{}", doc.text);
/// # Ok(())
/// # }
/// ```
pub struct OcrPipeline {
    config: OcrConfig,
    engines: EngineSet,
    renderer: Arc<dyn PdfRenderer>,
    workspaces: WorkspaceManager,
}

impl std::fmt::Debug for OcrPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrPipeline")
            .field("config", &self.config)
            .field("engines", &self.engines)
            .field("workspaces", &self.workspaces)
            .finish_non_exhaustive()
    }
}

impl OcrPipeline {
    /// Pipeline with the production engines and the pdfium renderer.
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        let engines = EngineSet::from_config(&config)?;
        let renderer = Arc::new(PdfiumRenderer::new(
            config.pdfium_library_path.clone(),
            config.max_rendered_pixels,
            config.password.clone(),
        ));
        let workspaces = WorkspaceManager::new(config.workspace_root.clone());
        Ok(Self {
            config,
            engines,
            renderer,
            workspaces,
        })
    }

    /// Replace the engines.
    pub fn with_engines(mut self, engines: EngineSet) -> Self {
        self.engines = engines;
        self
    }

    /// Replace the PDF renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn PdfRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// The workspace manager, for request layers that release by `upload_id`.
    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    /// Run OCR over one uploaded document.
    ///
    /// `engine` is the selection token (`qari`, `mistral` or `both`).
    ///
    /// # Errors
    /// Returns `Err(OcrError)` only for fatal failures: a rejected upload, an
    /// unknown selection, an unusable workspace or an undecodable document.
    /// Engine failures are reported inside the page text and the result
    /// still has `success: true`.
    pub async fn process_upload(
        &self,
        artifact: UploadArtifact,
        engine: &str,
    ) -> Result<CombinedDocument, OcrError> {
        let total_start = Instant::now();

        // ── Step 1: Validate, before anything touches the disk ──────────────
        artifact.validate(self.config.max_upload_bytes)?;
        let selection: EngineSelection = engine.parse()?;
        let ext = artifact
            .extension()
            .ok_or_else(|| OcrError::UnsupportedFileType {
                filename: artifact.filename.clone(),
            })?;
        info!(
            "Processing '{}' ({} bytes) with {}",
            artifact.filename, artifact.effective_size(), selection
        );

        // ── Step 2: Allocate workspace; the guard removes it on every path ──
        let workspace = self.workspaces.allocate()?;
        let upload_id = workspace.id_string();

        let outcome = self.recognise(artifact, &ext, selection, &workspace).await;

        // ── Step 7: Release, on success and failure alike ───────────────────
        workspace.release().await;
        debug!("Released workspace {}", upload_id);
        let recognised = outcome?;

        let engine_calls: usize = recognised.pages.iter().map(|p| p.results.len()).sum();
        let failed_engine_calls = recognised
            .pages
            .iter()
            .flat_map(|p| &p.results)
            .filter(|r| r.is_failure())
            .count();
        let stats = OcrStats {
            total_pages: recognised.pages.len(),
            engine_calls,
            failed_engine_calls,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            render_duration_ms: recognised.render_duration_ms,
            ocr_duration_ms: recognised.ocr_duration_ms,
        };
        info!(
            "OCR complete: {} page(s), {}/{} engine calls failed, {}ms total",
            stats.total_pages, failed_engine_calls, engine_calls, stats.total_duration_ms
        );

        Ok(CombinedDocument {
            success: true,
            text: recognised.text,
            upload_id,
            pages: recognised.pages,
            stats,
        })
    }

    /// Steps 3 to 6, all inside `workspace`.
    async fn recognise(
        &self,
        artifact: UploadArtifact,
        ext: &str,
        selection: EngineSelection,
        workspace: &Workspace,
    ) -> Result<Recognised, OcrError> {
        // ── Step 3: Persist the upload under a fixed name ───────────────────
        let stored = workspace.file(&format!("upload.{ext}"));
        tokio::fs::write(&stored, &artifact.bytes)
            .await
            .map_err(|e| OcrError::WorkspaceWrite {
                path: stored.clone(),
                detail: e.to_string(),
            })?;
        drop(artifact);

        // ── Step 4: Rasterise ───────────────────────────────────────────────
        let render_start = Instant::now();
        let pages = rasterize(&stored, workspace, Arc::clone(&self.renderer)).await?;
        let render_duration_ms = render_start.elapsed().as_millis() as u64;
        info!("Rasterised {} page(s) in {}ms", pages.len(), render_duration_ms);

        // ── Step 5: Run engines ─────────────────────────────────────────────
        let progress = self.config.progress_callback.as_ref();
        if let Some(cb) = progress {
            cb.on_ocr_start(pages.len());
        }
        let ocr_start = Instant::now();
        let page_texts = dispatch(
            &self.engines,
            &pages,
            selection,
            self.config.concurrency,
            progress,
        )
        .await;
        let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;
        if let Some(cb) = progress {
            let failed = page_texts
                .iter()
                .flat_map(|p| &p.results)
                .filter(|r| r.is_failure())
                .count();
            cb.on_ocr_complete(pages.len(), failed);
        }

        // ── Step 6: Aggregate ───────────────────────────────────────────────
        let text = aggregate(&page_texts);

        Ok(Recognised {
            pages: page_texts,
            text,
            render_duration_ms,
            ocr_duration_ms,
        })
    }

    /// Run OCR over a file on disk. The filename and size come from the path.
    pub async fn process_file(
        &self,
        path: impl AsRef<Path>,
        engine: &str,
    ) -> Result<CombinedDocument, OcrError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        // Reject on name, then size, before reading the whole file.
        if !validate_extension(&filename) {
            return Err(OcrError::UnsupportedFileType { filename });
        }
        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| input_error(path, e))?
            .len();
        UploadArtifact::new(filename.clone(), size, Vec::new())
            .validate(self.config.max_upload_bytes)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| input_error(path, e))?;
        self.process_upload(UploadArtifact::new(filename, size, bytes), engine)
            .await
    }

    /// Synchronous wrapper around [`OcrPipeline::process_file`].
    ///
    /// Creates a temporary tokio runtime internally.
    pub fn process_file_sync(
        &self,
        path: impl AsRef<Path>,
        engine: &str,
    ) -> Result<CombinedDocument, OcrError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| OcrError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.process_file(path, engine))
    }
}

/// What the stages inside a workspace produce.
struct Recognised {
    pages: Vec<PageText>,
    text: String,
    render_duration_ms: u64,
    ocr_duration_ms: u64,
}

fn input_error(path: &Path, e: std::io::Error) -> OcrError {
    if e.kind() == std::io::ErrorKind::NotFound {
        OcrError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        OcrError::InputUnreadable {
            path: path.to_path_buf(),
            source: e,
        }
    }
}
