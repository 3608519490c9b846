//! # arabic-ocr
//!
//! Extract text from scanned Arabic documents (PDF, PNG, JPEG) with one or
//! two OCR engines, then optionally translate, transliterate and export it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Validate   extension ∈ {pdf, png, jpg, jpeg}, size ≤ limit
//!  ├─ 2. Workspace  <root>/<uuid>/upload.<ext>, removed on every exit path
//!  ├─ 3. Render     PDF pages → page_<n>.png via pdfium (spawn_blocking)
//!  ├─ 4. Dispatch   Qari (offline) and/or Mistral (vision API) per page
//!  └─ 5. Aggregate  page texts joined with "--- Page Break ---"
//! ```
//!
//! A failing engine never fails the request: its message takes the place of
//! the text it would have produced, and the result still reports
//! `success: true`. Only an unusable upload, workspace or document is fatal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arabic_ocr::{OcrConfig, OcrPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // MISTRAL_API_KEY is read from the environment
//!     let pipeline = OcrPipeline::new(OcrConfig::from_env()?)?;
//!     let doc = pipeline.process_file("scan.pdf", "mistral").await?;
//!     println!("{}", doc.text);
//!     eprintln!("{} pages, {} failed engine calls",
//!         doc.stats.total_pages,
//!         doc.stats.failed_engine_calls);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `arabic-ocr` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! arabic-ocr = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chat;
pub mod config;
pub mod engines;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod prompts;
pub mod translate;
pub mod transliterate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{OcrConfig, OcrConfigBuilder, RemoteEngineConfig, TranslationConfig};
pub use engines::{EngineSelection, EngineSet, LocalEngine, MistralOcrEngine, OcrEngine};
pub use error::{EngineFailure, ErrorKind, OcrError};
pub use export::{export_report, render_docx, render_report, ExportFormat};
pub use output::{CombinedDocument, EngineResult, ErrorResponse, OcrStats, PageText};
pub use pipeline::aggregate::{aggregate, PAGE_BREAK};
pub use pipeline::render::{PageImage, PdfRenderer, PdfiumRenderer};
pub use pipeline::validate::{validate, validate_extension, validate_size, UploadArtifact};
pub use pipeline::workspace::{Workspace, WorkspaceGuard, WorkspaceManager};
pub use process::OcrPipeline;
pub use progress::{NoopProgressCallback, OcrProgressCallback, ProgressCallback};
pub use translate::Translator;
pub use transliterate::transliterate;
