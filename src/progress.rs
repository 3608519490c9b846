//! Progress-callback trait for per-page, per-engine OCR events.
//!
//! Inject an [`Arc<dyn OcrProgressCallback>`] via
//! [`crate::config::OcrConfigBuilder::progress_callback`] to receive events as
//! the dispatcher finishes each engine call.
//!
//! Engine calls run concurrently, so events for different pages (and for the
//! two engines of one page) may arrive in any order. Implementations must be
//! `Send + Sync` and protect shared state themselves.
//!
//! # Example
//!
//! ```rust
//! use arabic_ocr::{OcrConfig, OcrProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl OcrProgressCallback for CountingCallback {
//!     fn on_engine_complete(&self, page: usize, total: usize, engine: &str, chars: usize) {
//!         let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("[{done}] page {page}/{total} via {engine}: {chars} chars");
//!     }
//! }
//!
//! let config = OcrConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the OCR pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait OcrProgressCallback: Send + Sync {
    /// Called once after rasterisation, before any engine is invoked.
    fn on_ocr_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when one engine returned text for one page.
    ///
    /// `chars` is the number of characters (not bytes) extracted.
    fn on_engine_complete(&self, page: usize, total_pages: usize, engine: &str, chars: usize) {
        let _ = (page, total_pages, engine, chars);
    }

    /// Called when one engine failed on one page. The failure is not fatal;
    /// `message` is the text that will appear inline in the output.
    fn on_engine_error(&self, page: usize, total_pages: usize, engine: &str, message: &str) {
        let _ = (page, total_pages, engine, message);
    }

    /// Called once after every engine call has finished.
    fn on_ocr_complete(&self, total_pages: usize, failed_calls: usize) {
        let _ = (total_pages, failed_calls);
    }
}

/// A no-op implementation, the default when no callback is configured.
pub struct NoopProgressCallback;

impl OcrProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::OcrConfig`].
pub type ProgressCallback = Arc<dyn OcrProgressCallback>;
