//! End-to-end tests against a real pdfium library.
//!
//! These tests render real PDF files from `./test_cases/` and are gated
//! behind the `E2E_ENABLED` environment variable so they do not run in CI
//! unless explicitly requested. Remote engines are only exercised when
//! `MISTRAL_API_KEY` is set as well.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium cargo test --test e2e -- --nocapture

use arabic_ocr::{OcrConfig, OcrError, OcrPipeline};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn pipeline(root: &std::path::Path) -> OcrPipeline {
    let config = OcrConfig::builder()
        .with_env()
        .workspace_root(root)
        .build()
        .unwrap();
    OcrPipeline::new(config).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_render_multi_page_scan_with_qari() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("arabic_scan.pdf"));
    let tmp = tempfile::tempdir().unwrap();

    let doc = pipeline(tmp.path()).process_file(&pdf, "qari").await.unwrap();

    println!("{} pages in {}ms", doc.stats.total_pages, doc.stats.total_duration_ms);
    assert!(doc.stats.total_pages >= 1);
    assert_eq!(
        doc.text.matches("--- Page Break ---").count(),
        doc.stats.total_pages - 1
    );
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_mistral_reads_arabic() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("arabic_scan.pdf"));
    if std::env::var("MISTRAL_API_KEY").is_err() {
        println!("SKIP — MISTRAL_API_KEY not set");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();

    let doc = pipeline(tmp.path()).process_file(&pdf, "mistral").await.unwrap();

    assert_eq!(doc.stats.failed_engine_calls, 0, "{}", doc.text);
    let arabic = doc
        .text
        .chars()
        .filter(|c| ('\u{0600}'..='\u{06FF}').contains(c))
        .count();
    assert!(arabic > 0, "no Arabic characters in output:\n{}", doc.text);
}

#[tokio::test]
async fn test_truncated_pdf_is_corrupt() {
    let pdf = e2e_skip_unless_ready!(test_cases_dir().join("arabic_scan.pdf"));
    let tmp = tempfile::tempdir().unwrap();
    let bytes = std::fs::read(&pdf).unwrap();
    let truncated = tmp.path().join("truncated.pdf");
    std::fs::write(&truncated, &bytes[..bytes.len().min(64)]).unwrap();
    let root = tmp.path().join("ws");

    let err = pipeline(&root).process_file(&truncated, "qari").await.unwrap_err();

    assert!(
        matches!(err, OcrError::CorruptDocument { .. } | OcrError::EmptyDocument { .. }),
        "got {err:?}"
    );
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
}
