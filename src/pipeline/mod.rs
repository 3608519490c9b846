//! Pipeline stages for document OCR.
//!
//! Each submodule implements one step, so every stage is testable alone and
//! backends (renderer, engines) can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ workspace ──▶ render ──▶ dispatch ──▶ aggregate
//! (type/size)  (uuid dir)    (pdfium)   (engines)    (page breaks)
//! ```
//!
//! 1. [`validate`]  — reject bad uploads before anything touches the disk
//! 2. [`workspace`] — allocate the per-request directory, remove it on every
//!    exit path
//! 3. [`render`]    — rasterise PDF pages to PNG on the blocking pool;
//!    images pass through as a single page
//! 4. [`dispatch`]  — run the selected engines per page, concurrently, with
//!    [`encode`] and [`postprocess`] used by the remote engine
//! 5. [`aggregate`] — join page texts with page-break markers

pub mod aggregate;
pub mod dispatch;
pub mod encode;
pub mod postprocess;
pub mod render;
pub mod validate;
pub mod workspace;
